use std::sync::Arc;
use std::time::Duration;

use error_stack::{Report, ResultExt};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::{AnalysisError, IndicatorError, ProviderError};
use crate::indicator::Indicator;
use crate::indicator::atr::Atr;
use crate::indicator::ma::Ema;
use crate::indicator::rsi::Rsi;
use crate::model::{Candle, IndicatorSet, MarketSymbol, SignalResult, TimeFrame};
use crate::precision::{round_price, round_ratio};
use crate::provider::{CandleRequest, MarketDataProvider};
use crate::strategy::classify;

pub const EMA_SHORT_PERIOD: usize = 7;
pub const EMA_LONG_PERIOD: usize = 25;
pub const RSI_PERIOD: usize = 14;
/// Long EMA seed window plus one candle folded past it.
pub const MIN_CANDLES: usize = 26;

const MAX_BACKOFF: Duration = Duration::from_secs(10);

/// Everything the analyzer needs to know about where candles come from.
#[derive(Debug, Clone)]
pub struct AnalyzerSettings {
    pub timeframe: TimeFrame,
    pub lookback: usize,
    pub quote_currency: String,
    /// Upper bound on one provider attempt. Retries each get their own
    /// window, so a failing `analyze` can take up to
    /// `(max_retries + 1) * fetch_timeout` plus backoff.
    pub fetch_timeout: Duration,
    pub max_retries: u32,
    pub retry_backoff: Duration,
}

impl AnalyzerSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            timeframe: config.analysis.timeframe(),
            lookback: config.analysis.lookback,
            quote_currency: config.analysis.quote_currency.clone(),
            fetch_timeout: config.provider.timeout(),
            max_retries: config.provider.max_retries,
            ..Self::default()
        }
    }
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            timeframe: TimeFrame::Min15,
            lookback: 96,
            quote_currency: "USDT".into(),
            fetch_timeout: Duration::from_secs(10),
            max_retries: 0,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

/// Turns a symbol into a classified trading signal.
///
/// Holds no per-call state: one `Analyzer` can serve concurrent calls.
pub struct Analyzer {
    provider: Arc<dyn MarketDataProvider>,
    settings: AnalyzerSettings,
    atr: Atr,
    ema_short: Ema,
    ema_long: Ema,
    rsi: Rsi,
}

impl Analyzer {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        settings: AnalyzerSettings,
    ) -> Result<Self, Report<IndicatorError>> {
        Ok(Self {
            provider,
            settings,
            atr: Atr::new(),
            ema_short: Ema::new(EMA_SHORT_PERIOD)?,
            ema_long: Ema::new(EMA_LONG_PERIOD)?,
            rsi: Rsi::new(RSI_PERIOD)?,
        })
    }

    /// Fetch history for `input` and classify it.
    ///
    /// Every failure is returned as an `AnalysisError`; nothing panics past
    /// this point.
    pub async fn analyze(&self, input: &str) -> Result<SignalResult, Report<AnalysisError>> {
        let symbol = MarketSymbol::parse(input, &self.settings.quote_currency).ok_or_else(|| {
            Report::new(AnalysisError::InvalidSymbol {
                input: input.trim().to_owned(),
            })
        })?;

        let request = CandleRequest {
            symbol: symbol.clone(),
            timeframe: self.settings.timeframe,
            limit: self.settings.lookback,
        };

        info!(
            provider = self.provider.name(),
            symbol = %symbol,
            granularity_secs = request.granularity_seconds(),
            limit = request.limit,
            "fetching candles for analysis"
        );

        let mut candles = self
            .fetch_candles(&request)
            .await
            .change_context(AnalysisError::DataUnavailable {
                symbol: symbol.to_string(),
            })?;

        normalize_order(&mut candles);
        if candles.len() > request.limit {
            let surplus = candles.len() - request.limit;
            candles.drain(..surplus);
        }

        // Checked on the trimmed window: that is what the indicators see
        if candles.len() < MIN_CANDLES {
            warn!(
                symbol = %symbol,
                available = candles.len(),
                required = MIN_CANDLES,
                "insufficient candles for analysis"
            );
            return Err(Report::new(AnalysisError::InsufficientHistory {
                symbol: symbol.to_string(),
                required: MIN_CANDLES,
                available: candles.len(),
            }));
        }

        let result = self.evaluate(&symbol, &candles);

        info!(
            symbol = %symbol,
            signal = %result.signal,
            confidence = result.confidence,
            rsi = result.indicators.rsi,
            "analysis complete"
        );

        Ok(result)
    }

    /// Compute indicators and classify an oldest-first candle series.
    ///
    /// Pure: the same candles always produce the same result.
    pub fn evaluate(&self, symbol: &MarketSymbol, candles: &[Candle]) -> SignalResult {
        let indicators = self.compute_indicators(candles);
        let price = candles.last().map(|c| c.close).unwrap_or(0.0);
        let classification = classify(price, &indicators);

        SignalResult {
            symbol: symbol.to_string(),
            price: round_price(price),
            entry: classification.risk.entry,
            take_profit: classification.risk.take_profit,
            stop_loss: classification.risk.stop_loss,
            trend: classification.trend,
            strong_trend: classification.strong_trend,
            indicators: IndicatorSet {
                atr: round_price(indicators.atr),
                ema_short: round_price(indicators.ema_short),
                ema_long: round_price(indicators.ema_long),
                rsi: round_ratio(indicators.rsi),
            },
            signal: classification.signal,
            confidence: round_ratio(classification.confidence),
        }
    }

    fn compute_indicators(&self, candles: &[Candle]) -> IndicatorSet {
        IndicatorSet {
            atr: measure(&self.atr, candles),
            ema_short: measure(&self.ema_short, candles),
            ema_long: measure(&self.ema_long, candles),
            rsi: measure(&self.rsi, candles),
        }
    }

    /// Fetch with a per-attempt timeout and capped exponential backoff.
    ///
    /// The timeout is not shared across attempts; see
    /// [`AnalyzerSettings::fetch_timeout`].
    async fn fetch_candles(
        &self,
        request: &CandleRequest,
    ) -> Result<Vec<Candle>, Report<ProviderError>> {
        let mut backoff = self.settings.retry_backoff;
        let mut attempt = 0;

        loop {
            match self.fetch_once(request).await {
                Ok(candles) => return Ok(candles),
                Err(e) if attempt < self.settings.max_retries => {
                    attempt += 1;
                    warn!(
                        error = ?e,
                        symbol = %request.symbol,
                        attempt,
                        "candle fetch failed, retrying"
                    );
                    sleep(backoff).await;
                    backoff = (backoff * 2).min(MAX_BACKOFF);
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_once(
        &self,
        request: &CandleRequest,
    ) -> Result<Vec<Candle>, Report<ProviderError>> {
        tokio::time::timeout(
            self.settings.fetch_timeout,
            self.provider.fetch_candles(request),
        )
        .await
        .change_context(ProviderError::Timeout {
            provider: self.provider.name().to_owned(),
        })
        .attach_with(|| format!("timeout: {:?}", self.settings.fetch_timeout))?
    }
}

fn measure(indicator: &dyn Indicator, candles: &[Candle]) -> f64 {
    let value = indicator.calculate(candles);
    debug!(indicator = indicator.name(), value, "indicator computed");
    value
}

/// Sort candles oldest-first by open time.
///
/// Providers disagree on order (and some return newest-first), so this runs
/// on every fetched series.
pub fn normalize_order(candles: &mut [Candle]) {
    candles.sort_by_key(|c| c.open_time);
}
