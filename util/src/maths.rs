//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
/// 
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()`, violating the mathematical definition, if
/// `self` is much smaller than `rhs.abs()` in magnitude and `self < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float
{
    let r = lhs % rhs;
    if r < T::zero() { r + rhs.abs() } else { r }
}

/// Truncate the whole number of `period`s out of `value`, keeping its sign.
///
/// The result lies in `(-period, period)`.
pub fn strip_periods<T>(value: T, period: T) -> T
where
    T: Float
{
    value - (value / period).trunc() * period
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_rem_euclid() {
        assert_eq!(rem_euclid(7f64, 4f64), 3f64);
        assert_eq!(rem_euclid(-1f64, 4f64), 3f64);
        assert_eq!(rem_euclid(-8f64, 4f64), 0f64);
    }

    #[test]
    fn test_strip_periods() {
        assert_eq!(strip_periods(7f64, 4f64), 3f64);
        assert_eq!(strip_periods(-7f64, 4f64), -3f64);
        assert_eq!(strip_periods(2f64, 4f64), 2f64);
    }
}
