use crate::precision::round_price;

pub const ENTRY_FACTOR: f64 = 0.997;
pub const TAKE_PROFIT_FACTOR: f64 = 1.027;
pub const STOP_LOSS_FACTOR: f64 = 0.965;

/// Entry, take-profit and stop-loss prices for a long position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskLevels {
    pub entry: f64,
    pub take_profit: f64,
    pub stop_loss: f64,
}

impl RiskLevels {
    /// Levels derived from the latest price regardless of signal.
    ///
    /// Take-profit and stop-loss are taken from the already rounded entry.
    pub fn from_price(price: f64) -> Self {
        let entry = round_price(price * ENTRY_FACTOR);
        Self {
            entry,
            take_profit: round_price(entry * TAKE_PROFIT_FACTOR),
            stop_loss: round_price(entry * STOP_LOSS_FACTOR),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_for_round_price() {
        let levels = RiskLevels::from_price(100.0);
        assert_eq!(levels.entry, 99.7);
        assert_eq!(levels.take_profit, 102.3919);
        assert_eq!(levels.stop_loss, 96.2105);
    }

    #[test]
    fn stop_below_entry_below_target() {
        for price in [0.000_123, 0.5, 1.0, 17.25, 2_450.0, 98_765.4321] {
            let levels = RiskLevels::from_price(price);
            assert!(levels.stop_loss < levels.entry, "price {price}");
            assert!(levels.entry < levels.take_profit, "price {price}");
        }
    }

    #[test]
    fn levels_collapse_below_rounding_precision() {
        // Band widths fall under one 6 dp step
        let collapsed = RiskLevels::from_price(0.000_01);
        assert_eq!(collapsed.stop_loss, collapsed.entry);
        assert_eq!(collapsed.entry, collapsed.take_profit);

        let ordered = RiskLevels::from_price(0.000_04);
        assert_eq!(ordered.stop_loss, 0.000_039);
        assert_eq!(ordered.entry, 0.000_04);
        assert_eq!(ordered.take_profit, 0.000_041);
    }
}
