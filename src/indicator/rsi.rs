use error_stack::{Report, bail};

use crate::error::IndicatorError;
use crate::indicator::{Indicator, close_prices};
use crate::model::Candle;

/// Value returned when the window is too short to measure momentum.
pub const NEUTRAL_RSI: f64 = 50.0;

/// RSI over the trailing `period` close-to-close differences only.
///
/// A window without losses divides by 1 instead of 0, so it reports
/// `100 - 100 / (1 + avg_gain)` rather than 100.
#[derive(Debug, Clone, Copy)]
pub struct Rsi {
    period: usize,
}

impl Rsi {
    pub fn new(period: usize) -> Result<Self, Report<IndicatorError>> {
        if period == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "period must be > 0".into(),
            });
        }
        Ok(Self { period })
    }

    pub fn calculate_prices(&self, prices: &[f64]) -> f64 {
        if prices.len() < self.required_candles() {
            return NEUTRAL_RSI;
        }

        let window = &prices[prices.len() - self.required_candles()..];
        let (gains, losses) = window
            .windows(2)
            .map(|w| w[1] - w[0])
            .fold((0.0, 0.0), |(gains, losses), diff| {
                if diff > 0.0 {
                    (gains + diff, losses)
                } else {
                    (gains, losses + diff.abs())
                }
            });

        let period = self.period as f64;
        let avg_gain = gains / period;
        let avg_loss = if losses == 0.0 { 1.0 } else { losses / period };

        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        "rsi"
    }

    fn required_candles(&self) -> usize {
        self.period + 1
    }

    fn calculate(&self, candles: &[Candle]) -> f64 {
        self.calculate_prices(&close_prices(candles))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicator::test_support::candles_from_closes;

    #[test]
    fn rsi_period_zero_invalid() {
        assert!(Rsi::new(0).is_err());
    }

    #[test]
    fn rsi_insufficient_data_is_neutral() {
        let rsi = Rsi::new(14).unwrap();
        assert_eq!(rsi.calculate(&candles_from_closes(&[1.0; 14])), 50.0);
        assert_eq!(rsi.calculate_prices(&[]), 50.0);
    }

    #[test]
    fn rsi_all_losses_returns_0() {
        let rsi = Rsi::new(3).unwrap();
        let value = rsi.calculate(&candles_from_closes(&[4.0, 3.0, 2.0, 1.0]));
        assert!(value.abs() < 1e-9);
    }

    #[test]
    fn rsi_flat_window_reports_zero() {
        // No gains, losses substituted by 1 -> RS = 0
        let rsi = Rsi::new(14).unwrap();
        assert_eq!(rsi.calculate(&candles_from_closes(&[100.0; 26])), 0.0);
    }

    #[test]
    fn rsi_all_gains_is_biased_below_100() {
        let rsi = Rsi::new(14).unwrap();

        // +1 steps: avg_gain = 1, avg_loss substituted 1 -> RSI 50
        let unit_steps: Vec<f64> = (100..=125).map(|c| c as f64).collect();
        assert!((rsi.calculate_prices(&unit_steps) - 50.0).abs() < 1e-12);

        // +10 steps: avg_gain = 10 -> 100 - 100/11
        let big_steps: Vec<f64> = (0..20).map(|i| 100.0 + 10.0 * i as f64).collect();
        let value = rsi.calculate_prices(&big_steps);
        assert!((value - (100.0 - 100.0 / 11.0)).abs() < 1e-9);
        assert!(value < 100.0);
    }

    #[test]
    fn rsi_uses_trailing_window_only() {
        let rsi = Rsi::new(3).unwrap();
        // Early crash must not matter; last 3 diffs are +1, -1, +1
        let prices = [100.0, 10.0, 11.0, 12.0, 11.0, 12.0];
        // gains 2 -> 2/3, losses 1 -> 1/3, RS 2 -> 66.67
        let value = rsi.calculate_prices(&prices);
        assert!((value - (100.0 - 100.0 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn rsi_within_bounds() {
        let rsi = Rsi::new(14).unwrap();
        for seed in 1..50_u64 {
            let prices: Vec<f64> = (0..40)
                .map(|i| 100.0 + ((i as u64 * seed * 7919) % 23) as f64 - 11.0)
                .collect();
            let value = rsi.calculate_prices(&prices);
            assert!((0.0..=100.0).contains(&value), "RSI out of range: {value}");
        }
    }
}
