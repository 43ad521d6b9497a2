use error_stack::{Report, bail};

use crate::error::IndicatorError;
use crate::indicator::{Indicator, close_prices};
use crate::model::Candle;

/// Exponential Moving Average.
#[derive(Debug, Clone, Copy)]
pub struct Ema {
    period: usize,
}

impl Ema {
    pub fn new(period: usize) -> Result<Self, Report<IndicatorError>> {
        if period == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "period must be > 0".into(),
            });
        }
        Ok(Self { period })
    }

    /// Final EMA value of a price slice.
    ///
    /// With fewer prices than `period` the last price is returned unsmoothed;
    /// an empty slice yields 0.
    pub fn calculate_prices(&self, prices: &[f64]) -> f64 {
        if prices.len() < self.period {
            return prices.last().copied().unwrap_or(0.0);
        }

        let k = 2.0 / (self.period as f64 + 1.0);
        // Seed with SMA of first `period` values
        let seed: f64 = prices[..self.period].iter().sum::<f64>() / self.period as f64;

        prices[self.period..]
            .iter()
            .fold(seed, |ema, &price| price * k + ema * (1.0 - k))
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        "ema"
    }

    fn required_candles(&self) -> usize {
        self.period
    }

    fn calculate(&self, candles: &[Candle]) -> f64 {
        self.calculate_prices(&close_prices(candles))
    }
}
