use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Quote currencies recognised as a trailing suffix of a user-typed symbol.
///
/// Longer suffixes come first so `BTCUSDT` is not read as `BTCUSD` + `T`.
const KNOWN_QUOTES: &[&str] = &["USDT", "USDC", "BUSD", "USD"];

/// Candle timeframe supported by the application.
///
/// String representations match the config file format (e.g. `"15m"`, `"1h"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeFrame {
    Min1,
    Min3,
    Min5,
    Min15,
    Min30,
    Hour1,
    Hour4,
    Day1,
}

impl TimeFrame {
    /// Parse a config-format string into a `TimeFrame`.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "1m" => Some(Self::Min1),
            "3m" => Some(Self::Min3),
            "5m" => Some(Self::Min5),
            "15m" => Some(Self::Min15),
            "30m" => Some(Self::Min30),
            "1h" => Some(Self::Hour1),
            "4h" => Some(Self::Hour4),
            "1d" => Some(Self::Day1),
            _ => None,
        }
    }

    /// Return the config-format string representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Min1 => "1m",
            Self::Min3 => "3m",
            Self::Min5 => "5m",
            Self::Min15 => "15m",
            Self::Min30 => "30m",
            Self::Hour1 => "1h",
            Self::Hour4 => "4h",
            Self::Day1 => "1d",
        }
    }

    /// Length of one candle in seconds.
    pub fn seconds(self) -> u64 {
        match self {
            Self::Min1 => 60,
            Self::Min3 => 3 * 60,
            Self::Min5 => 5 * 60,
            Self::Min15 => 15 * 60,
            Self::Min30 => 30 * 60,
            Self::Hour1 => 60 * 60,
            Self::Hour4 => 4 * 60 * 60,
            Self::Day1 => 24 * 60 * 60,
        }
    }

    /// Return the Bitget v2 `granularity` value for this timeframe.
    pub fn bitget_granularity(self) -> &'static str {
        match self {
            Self::Min1 => "1m",
            Self::Min3 => "3m",
            Self::Min5 => "5m",
            Self::Min15 => "15m",
            Self::Min30 => "30m",
            Self::Hour1 => "1H",
            Self::Hour4 => "4H",
            Self::Day1 => "1D",
        }
    }

    /// Return the Binance kline interval string for this timeframe.
    pub fn binance_interval(self) -> &'static str {
        match self {
            Self::Min1 => "1m",
            Self::Min3 => "3m",
            Self::Min5 => "5m",
            Self::Min15 => "15m",
            Self::Min30 => "30m",
            Self::Hour1 => "1h",
            Self::Hour4 => "4h",
            Self::Day1 => "1d",
        }
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One OHLC price bar.
#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    pub open_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Candle {
    /// All prices finite and `high >= low`.
    pub fn is_well_formed(&self) -> bool {
        [self.open, self.high, self.low, self.close]
            .iter()
            .all(|v| v.is_finite())
            && self.high >= self.low
    }
}

/// A market identified by base and quote asset, e.g. `SOL` / `USDT`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MarketSymbol {
    pub base: String,
    pub quote: String,
}

impl MarketSymbol {
    /// Normalize user input into a market.
    ///
    /// Input is trimmed and uppercased. A known quote suffix is split off;
    /// a bare base asset is paired with `default_quote`.
    pub fn parse(input: &str, default_quote: &str) -> Option<Self> {
        let normalized = input.trim().to_uppercase();
        if normalized.is_empty() || !normalized.chars().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }

        for quote in KNOWN_QUOTES {
            if let Some(base) = normalized.strip_suffix(quote) {
                if base.is_empty() {
                    return None;
                }
                return Some(Self {
                    base: base.to_owned(),
                    quote: (*quote).to_owned(),
                });
            }
        }

        Some(Self {
            base: normalized,
            quote: default_quote.to_uppercase(),
        })
    }

    /// Concatenated pair as most venues spell it (`SOLUSDT`).
    pub fn pair(&self) -> String {
        format!("{}{}", self.base, self.quote)
    }
}

impl fmt::Display for MarketSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.base, self.quote)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Trend {
    Up,
    Down,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "UP"),
            Self::Down => write!(f, "DOWN"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Sell,
    Wait,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
            Self::Wait => write!(f, "WAIT"),
        }
    }
}

/// Indicator values computed for a single analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSet {
    pub atr: f64,
    pub ema_short: f64,
    pub ema_long: f64,
    pub rsi: f64,
}

/// Final output of one `analyze` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalResult {
    pub symbol: String,
    pub price: f64,
    pub entry: f64,
    pub take_profit: f64,
    pub stop_loss: f64,
    pub trend: Trend,
    pub strong_trend: bool,
    pub indicators: IndicatorSet,
    pub signal: Signal,
    pub confidence: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeframe_round_trip() {
        let frames = [
            ("1m", TimeFrame::Min1),
            ("3m", TimeFrame::Min3),
            ("5m", TimeFrame::Min5),
            ("15m", TimeFrame::Min15),
            ("30m", TimeFrame::Min30),
            ("1h", TimeFrame::Hour1),
            ("4h", TimeFrame::Hour4),
            ("1d", TimeFrame::Day1),
        ];
        for (s, tf) in frames {
            assert_eq!(TimeFrame::from_str(s), Some(tf));
            assert_eq!(tf.as_str(), s);
        }
    }

    #[test]
    fn timeframe_invalid_string_returns_none() {
        assert_eq!(TimeFrame::from_str("2m"), None);
        assert_eq!(TimeFrame::from_str(""), None);
    }

    #[test]
    fn fifteen_minute_candles_are_900_seconds() {
        assert_eq!(TimeFrame::Min15.seconds(), 900);
        assert_eq!(TimeFrame::Hour4.bitget_granularity(), "4H");
    }

    #[test]
    fn symbol_strips_known_quote_suffix() {
        let symbol = MarketSymbol::parse("  solusdt ", "USDT").unwrap();
        assert_eq!(symbol.base, "SOL");
        assert_eq!(symbol.quote, "USDT");
        assert_eq!(symbol.pair(), "SOLUSDT");
    }

    #[test]
    fn symbol_prefers_longest_quote() {
        let symbol = MarketSymbol::parse("BTCUSDC", "USDT").unwrap();
        assert_eq!(symbol.base, "BTC");
        assert_eq!(symbol.quote, "USDC");

        let symbol = MarketSymbol::parse("ETHUSD", "USDT").unwrap();
        assert_eq!(symbol.base, "ETH");
        assert_eq!(symbol.quote, "USD");
    }

    #[test]
    fn bare_base_uses_default_quote() {
        let symbol = MarketSymbol::parse("arb", "usdt").unwrap();
        assert_eq!(symbol.to_string(), "ARBUSDT");
    }

    #[test]
    fn symbol_rejects_garbage() {
        assert_eq!(MarketSymbol::parse("", "USDT"), None);
        assert_eq!(MarketSymbol::parse("   ", "USDT"), None);
        assert_eq!(MarketSymbol::parse("USDT", "USDT"), None);
        assert_eq!(MarketSymbol::parse("SOL/USDT", "USDT"), None);
        assert_eq!(MarketSymbol::parse("/start", "USDT"), None);
    }

    #[test]
    fn malformed_candle_detected() {
        let candle = Candle {
            open_time: Utc::now(),
            open: 1.0,
            high: 0.5,
            low: 1.0,
            close: 1.0,
        };
        assert!(!candle.is_well_formed());

        let candle = Candle {
            high: f64::NAN,
            ..candle
        };
        assert!(!candle.is_well_formed());
    }

    #[test]
    fn signal_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Signal::Buy).unwrap(), "\"BUY\"");
        assert_eq!(serde_json::to_string(&Trend::Down).unwrap(), "\"DOWN\"");
    }
}
