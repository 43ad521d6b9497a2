pub mod risk;

use crate::model::{IndicatorSet, Signal, Trend};
use crate::strategy::risk::RiskLevels;

/// EMA separation must exceed this multiple of ATR to count as a strong trend.
pub const STRONG_TREND_ATR_FACTOR: f64 = 0.4;
pub const BUY_RSI_BELOW: f64 = 42.0;
pub const SELL_RSI_ABOVE: f64 = 58.0;
pub const BUY_BASE_CONFIDENCE: f64 = 78.0;
pub const SELL_BASE_CONFIDENCE: f64 = 75.0;
pub const WAIT_CONFIDENCE: f64 = 55.0;
pub const MIN_CONFIDENCE: f64 = 50.0;
pub const MAX_CONFIDENCE: f64 = 95.0;

/// Outcome of the decision policy for one set of indicator values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub trend: Trend,
    pub strong_trend: bool,
    pub signal: Signal,
    pub confidence: f64,
    pub risk: RiskLevels,
}

/// Apply the trend + RSI policy gated by ATR-normalized trend strength.
///
/// Rules are checked in order and the first match wins:
/// 1. up-trend, RSI below 42, strong trend: BUY
/// 2. down-trend, RSI above 58, strong trend: SELL
/// 3. otherwise WAIT at a fixed confidence
///
/// Equal EMAs count as a down-trend.
pub fn classify(price: f64, indicators: &IndicatorSet) -> Classification {
    let trend = if indicators.ema_short > indicators.ema_long {
        Trend::Up
    } else {
        Trend::Down
    };
    let strong_trend = (indicators.ema_short - indicators.ema_long).abs()
        > indicators.atr * STRONG_TREND_ATR_FACTOR;

    let rsi = indicators.rsi;
    let (signal, confidence) = match trend {
        Trend::Up if rsi < BUY_RSI_BELOW && strong_trend => {
            (Signal::Buy, BUY_BASE_CONFIDENCE + (BUY_RSI_BELOW - rsi))
        }
        Trend::Down if rsi > SELL_RSI_ABOVE && strong_trend => {
            (Signal::Sell, SELL_BASE_CONFIDENCE + (rsi - SELL_RSI_ABOVE))
        }
        _ => (Signal::Wait, WAIT_CONFIDENCE),
    };

    Classification {
        trend,
        strong_trend,
        signal,
        confidence: confidence.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE),
        risk: RiskLevels::from_price(price),
    }
}
