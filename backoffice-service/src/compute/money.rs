//! Rounding-safe money arithmetic.

/// Sweep non-finite values to 0 before they can poison a sum.
pub fn sanitize(x: f64) -> f64 {
    if x.is_finite() {
        x
    } else {
        0.0
    }
}

/// Round to 2 decimal places, half away from zero. Every displayed or
/// stored monetary value passes through here.
pub fn round_currency(x: f64) -> f64 {
    (sanitize(x) * 100.0).round() / 100.0
}

/// `base * pct / 100`.
pub fn apply_percentage(base: f64, pct: f64) -> f64 {
    sanitize(base) * sanitize(pct) / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_two_decimals() {
        assert_eq!(round_currency(10.005), 10.01);
        assert_eq!(round_currency(10.004), 10.0);
        assert_eq!(round_currency(-2.345), -2.35);
        assert_eq!(round_currency(0.0), 0.0);
    }

    #[test]
    fn non_finite_coerces_to_zero() {
        assert_eq!(round_currency(f64::NAN), 0.0);
        assert_eq!(round_currency(f64::INFINITY), 0.0);
        assert_eq!(apply_percentage(f64::NAN, 15.0), 0.0);
        assert_eq!(apply_percentage(100.0, f64::NEG_INFINITY), 0.0);
    }

    #[test]
    fn percentage_application() {
        assert_eq!(apply_percentage(200.0, 10.0), 20.0);
        assert_eq!(apply_percentage(180.0, 15.0), 27.0);
        assert_eq!(apply_percentage(0.0, 15.0), 0.0);
    }
}
