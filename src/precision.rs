/// Decimal places for prices and ATR/EMA values.
pub const PRICE_DECIMALS: i32 = 6;
/// Decimal places for RSI and confidence.
pub const RATIO_DECIMALS: i32 = 2;

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

pub fn round_price(value: f64) -> f64 {
    round_to(value, PRICE_DECIMALS)
}

pub fn round_ratio(value: f64) -> f64 {
    round_to(value, RATIO_DECIMALS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_requested_places() {
        assert_eq!(round_ratio(42.456), 42.46);
        assert_eq!(round_ratio(-1.234), -1.23);
        assert_eq!(round_price(0.123_456_78), 0.123_457);
        assert_eq!(round_price(150.0), 150.0);
    }
}
