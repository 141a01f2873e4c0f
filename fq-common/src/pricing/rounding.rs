//! Output rounding
//!
//! Only final outputs are rounded; intermediate values keep full precision.
//! `f64::round` rounds half away from zero, which is the required mode.

/// Round a currency amount to cents
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round a discount fraction to four decimal places
pub fn round_fraction(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
