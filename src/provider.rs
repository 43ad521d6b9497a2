pub mod binance;
pub mod bitget;

use std::fmt;

use error_stack::Report;
use futures::future::BoxFuture;

use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::model::{Candle, MarketSymbol, TimeFrame};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Bitget,
    Binance,
}

impl ProviderKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "bitget" => Some(Self::Bitget),
            "binance" => Some(Self::Binance),
            _ => None,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bitget => write!(f, "bitget"),
            Self::Binance => write!(f, "binance"),
        }
    }
}

/// Parameters of one candle history request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandleRequest {
    pub symbol: MarketSymbol,
    pub timeframe: TimeFrame,
    pub limit: usize,
}

impl CandleRequest {
    pub fn granularity_seconds(&self) -> u64 {
        self.timeframe.seconds()
    }
}

/// Source of historical candles.
///
/// Uses `BoxFuture` (from `futures` crate) instead of `async fn` in trait
/// to keep the trait object-safe (`dyn MarketDataProvider`). Candle order
/// in the returned vector is unspecified.
pub trait MarketDataProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Fetch up to `request.limit` recent candles via REST API.
    fn fetch_candles(
        &self,
        request: &CandleRequest,
    ) -> BoxFuture<'_, Result<Vec<Candle>, Report<ProviderError>>>;
}

/// Build the provider selected by a validated `ProviderConfig`.
pub fn build_provider(config: &ProviderConfig) -> Option<Box<dyn MarketDataProvider>> {
    match ProviderKind::from_str(&config.name)? {
        ProviderKind::Bitget => Some(Box::new(bitget::BitgetProvider::new(config))),
        ProviderKind::Binance => Some(Box::new(binance::BinanceProvider::new(config))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_kind_round_trip() {
        for kind in [ProviderKind::Bitget, ProviderKind::Binance] {
            assert_eq!(ProviderKind::from_str(&kind.to_string()), Some(kind));
        }
        assert_eq!(ProviderKind::from_str("kraken"), None);
    }

    #[test]
    fn build_provider_follows_config_name() {
        let config = ProviderConfig {
            name: "binance".into(),
            ..ProviderConfig::default()
        };
        let provider = build_provider(&config).unwrap();
        assert_eq!(provider.name(), "binance");

        let config = ProviderConfig {
            name: "unknown".into(),
            ..ProviderConfig::default()
        };
        assert!(build_provider(&config).is_none());
    }

    #[test]
    fn request_exposes_granularity_in_seconds() {
        let request = CandleRequest {
            symbol: MarketSymbol::parse("SOLUSDT", "USDT").unwrap(),
            timeframe: TimeFrame::Min15,
            limit: 96,
        };
        assert_eq!(request.granularity_seconds(), 900);
    }
}
