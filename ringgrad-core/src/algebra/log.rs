//! Log-space arithmetic helpers.
//!
//! A value `v >= 0` is represented as `ln v`, so `zero()` is `-inf` and
//! `one()` is `0.0`. Addition of represented values is the classic
//! log-add-exp; subtraction is its partial inverse and goes NaN when the true
//! result would be negative.

/// `ln(e^a + e^b)` without overflow for large inputs or underflow for small
/// ones. Always evaluates `ln_1p` on the smaller-magnitude exponent.
pub fn log_add_exp(a: f64, b: f64) -> f64 {
    let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
    if lo == f64::NEG_INFINITY {
        // also covers (-inf) + (-inf) and keeps +inf + finite exact
        return hi;
    }
    if hi == f64::INFINITY {
        return f64::INFINITY;
    }
    hi + (lo - hi).exp().ln_1p()
}

/// `ln(e^a - e^b)`. NaN when `b > a` (the difference would be negative) and
/// `-inf` when `a == b` (the difference is zero).
pub fn log_subtract_exp(a: f64, b: f64) -> f64 {
    if b == f64::NEG_INFINITY {
        // subtracting zero
        return a;
    }
    a + (-((b - a).exp())).ln_1p()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_log_add_exp_matches_real_sum() {
        let a: f64 = 0.3;
        let b: f64 = 1.7;
        assert_relative_eq!(
            log_add_exp(a.ln(), b.ln()).exp(),
            a + b,
            max_relative = 1e-13
        );
    }

    #[test]
    fn test_log_add_exp_avoids_underflow() {
        // direct exponentiation of either operand underflows to 0.0
        let a = -1000.0;
        let b = -1001.0;
        let sum = log_add_exp(a, b);
        assert_relative_eq!(sum, a + (1.0 + (-1.0f64).exp()).ln(), max_relative = 1e-12);
        assert!(sum.is_finite());
    }

    #[test]
    fn test_log_add_exp_identities() {
        assert_eq!(log_add_exp(f64::NEG_INFINITY, f64::NEG_INFINITY), f64::NEG_INFINITY);
        assert_eq!(log_add_exp(0.5, f64::NEG_INFINITY), 0.5);
        assert_eq!(log_add_exp(f64::INFINITY, 0.5), f64::INFINITY);
    }

    #[test]
    fn test_log_subtract_exp() {
        let a: f64 = 5.0;
        let b: f64 = 2.0;
        assert_relative_eq!(
            log_subtract_exp(a.ln(), b.ln()).exp(),
            3.0,
            max_relative = 1e-13
        );
        // exact cancellation collapses to log-space zero
        assert_eq!(log_subtract_exp(1.25, 1.25), f64::NEG_INFINITY);
        // negative results are unrepresentable
        assert!(log_subtract_exp(b.ln(), a.ln()).is_nan());
    }
}
