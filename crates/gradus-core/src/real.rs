//! Fixed-point real numbers.
//!
//! Edge weights and breakpoints are reals, but propagation arithmetic must
//! be exact: whether a weighted sum lands on or just past a breakpoint
//! cannot depend on floating-point summation order, and retracting a
//! contribution must restore the previous bound bit-for-bit. `Real` stores
//! milli-units in an `i64`, so sums and `Real × level` products stay in
//! integer arithmetic.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};
use std::str::FromStr;

use num_traits::Zero;

use crate::error::CoreError;

/// Number of fixed-point units per whole unit.
pub const SCALE: i64 = 1000;

/// A real number with three decimal digits of precision.
///
/// # Example
///
/// ```
/// use gradus_core::Real;
///
/// let w: Real = "-1.25".parse().unwrap();
/// assert_eq!(w.scaled(), -1250);
/// assert_eq!(w.to_string(), "-1.25");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Real(i64);

impl Real {
    /// Zero.
    pub const ZERO: Real = Real(0);

    /// Builds a real from raw fixed-point units.
    pub const fn from_scaled(units: i64) -> Self {
        Real(units)
    }

    /// Builds a real from a whole number.
    pub const fn from_int(value: i64) -> Self {
        Real(value * SCALE)
    }

    /// Builds a real from a float, rounding to the nearest milli-unit.
    pub fn from_f64(value: f64) -> Self {
        Real((value * SCALE as f64).round() as i64)
    }

    /// Raw fixed-point units.
    pub const fn scaled(self) -> i64 {
        self.0
    }

    /// Multiplies by an integer factor, e.g. a truth degree.
    pub const fn scale_by(self, factor: i64) -> Real {
        Real(self.0 * factor)
    }

    /// True if strictly negative.
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }
}

impl Add for Real {
    type Output = Real;
    fn add(self, rhs: Real) -> Real {
        Real(self.0 + rhs.0)
    }
}

impl AddAssign for Real {
    fn add_assign(&mut self, rhs: Real) {
        self.0 += rhs.0;
    }
}

impl Sub for Real {
    type Output = Real;
    fn sub(self, rhs: Real) -> Real {
        Real(self.0 - rhs.0)
    }
}

impl Neg for Real {
    type Output = Real;
    fn neg(self) -> Real {
        Real(-self.0)
    }
}

impl Mul<i64> for Real {
    type Output = Real;
    fn mul(self, rhs: i64) -> Real {
        Real(self.0 * rhs)
    }
}

impl Sum for Real {
    fn sum<I: Iterator<Item = Real>>(iter: I) -> Real {
        iter.fold(Real::ZERO, |acc, x| acc + x)
    }
}

impl Zero for Real {
    fn zero() -> Self {
        Real::ZERO
    }

    fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl FromStr for Real {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidReal { text: s.to_string() };
        let text = s.trim();
        let (negative, rest) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };
        let (int_part, frac_part) = match rest.split_once('.') {
            Some((i, f)) => (i, f),
            None => (rest, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if frac_part.len() > 3 {
            // Sub-milli precision would be silently lost; reject it instead.
            return Err(invalid());
        }
        let mut units: i64 = 0;
        if !int_part.is_empty() {
            let whole: i64 = int_part.parse().map_err(|_| invalid())?;
            units = whole.checked_mul(SCALE).ok_or_else(invalid)?;
        }
        if !frac_part.is_empty() {
            let frac: i64 = frac_part.parse().map_err(|_| invalid())?;
            let shift = 10_i64.pow(3 - frac_part.len() as u32);
            units = units.checked_add(frac * shift).ok_or_else(invalid)?;
        }
        Ok(Real(if negative { -units } else { units }))
    }
}

impl fmt::Display for Real {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let whole = abs / SCALE as u64;
        let frac = abs % SCALE as u64;
        if frac == 0 {
            write!(f, "{sign}{whole}")
        } else {
            let text = format!("{frac:03}");
            write!(f, "{sign}{whole}.{}", text.trim_end_matches('0'))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_integers_and_fractions() {
        assert_eq!("42".parse::<Real>().unwrap(), Real::from_int(42));
        assert_eq!("-10987".parse::<Real>().unwrap(), Real::from_int(-10987));
        assert_eq!("0.5".parse::<Real>().unwrap(), Real::from_scaled(500));
        assert_eq!("-1.25".parse::<Real>().unwrap(), Real::from_scaled(-1250));
        assert_eq!("+.75".parse::<Real>().unwrap(), Real::from_scaled(750));
    }

    #[test]
    fn rejects_garbage() {
        assert!("".parse::<Real>().is_err());
        assert!("abc".parse::<Real>().is_err());
        assert!("1.2345".parse::<Real>().is_err());
        assert!("1..2".parse::<Real>().is_err());
    }

    #[test]
    fn displays_without_trailing_zeros() {
        assert_eq!(Real::from_scaled(-1250).to_string(), "-1.25");
        assert_eq!(Real::from_int(7).to_string(), "7");
        assert_eq!(Real::from_scaled(20).to_string(), "0.02");
    }

    #[test]
    fn arithmetic_is_exact() {
        let a = Real::from_scaled(1);
        let b = Real::from_int(1_000_000);
        assert_eq!(b + a - b, a);
        assert_eq!(Real::from_scaled(333).scale_by(3), Real::from_scaled(999));
    }
}
