pub mod atr;
pub mod ma;
pub mod rsi;

use crate::model::Candle;

/// A technical analysis indicator reduced to a single value over a window.
///
/// Candles must be in ascending chronological order (oldest first). Short
/// windows never fail: each indicator defines a fallback value instead.
pub trait Indicator: Send + Sync {
    /// Unique name of this indicator (e.g., "rsi", "ema").
    fn name(&self) -> &str;

    /// Number of candles needed before the fallback value stops applying.
    fn required_candles(&self) -> usize;

    /// Calculate the indicator value for the whole window.
    fn calculate(&self, candles: &[Candle]) -> f64;
}

/// Extract close prices from a slice of candles.
pub fn close_prices(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}
