use crate::indicator::Indicator;
use crate::model::Candle;

/// Average True Range as a flat mean of every true range in the window.
///
/// No Wilder smoothing: each adjacent candle pair contributes equally.
#[derive(Debug, Clone, Copy, Default)]
pub struct Atr;

impl Atr {
    pub fn new() -> Self {
        Self
    }
}

impl Indicator for Atr {
    fn name(&self) -> &str {
        "atr"
    }

    fn required_candles(&self) -> usize {
        2
    }

    /// Returns 0 with fewer than two candles.
    fn calculate(&self, candles: &[Candle]) -> f64 {
        if candles.len() < self.required_candles() {
            return 0.0;
        }

        let ranges: Vec<f64> = candles
            .windows(2)
            .map(|w| true_range(w[0].close, &w[1]))
            .collect();

        ranges.iter().sum::<f64>() / ranges.len() as f64
    }
}

/// Largest of the bar's own range and its gaps from the previous close.
pub fn true_range(prev_close: f64, candle: &Candle) -> f64 {
    let hl = candle.high - candle.low;
    let hc = (candle.high - prev_close).abs();
    let lc = (candle.low - prev_close).abs();
    hl.max(hc).max(lc)
}
