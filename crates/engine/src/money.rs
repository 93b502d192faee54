use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
};

use crate::{EngineError, ResultEngine};

/// Largest magnitude, in cents, that survives a round trip through `f64`.
const MAX_SAFE_CENTS: f64 = 9_007_199_254_740_991.0;

/// Signed money amount represented as **integer cents**.
///
/// Use this type for **all** monetary values in the engine (balances, budget
/// ceilings, transaction amounts) to avoid floating-point drift. The HTTP
/// layer speaks decimal major units; conversion happens once at the edge via
/// [`Money::from_major`] and [`Money::to_major`].
///
/// The value is signed:
/// - positive = income / increase
/// - negative = expense / decrease
///
/// # Examples
///
/// ```rust
/// use engine::Money;
///
/// let amount = Money::from_major(12.34).unwrap();
/// assert_eq!(amount.cents(), 1234);
/// assert_eq!(amount.to_string(), "12.34");
/// assert_eq!(amount.to_major(), 12.34);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Converts a decimal major-unit value, rounding half away from zero to
    /// the nearest cent.
    pub fn from_major(value: f64) -> ResultEngine<Self> {
        if !value.is_finite() {
            return Err(EngineError::validation("amount must be a finite number"));
        }
        let cents = (value * 100.0).round();
        if cents.abs() > MAX_SAFE_CENTS {
            return Err(EngineError::validation("amount out of range"));
        }
        Ok(Self(cents as i64))
    }

    /// Returns the amount in decimal major units.
    #[must_use]
    pub fn to_major(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Returns `true` if the amount is 0.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the amount is positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns `true` if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let units = abs / 100;
        let cents = abs % 100;
        write!(f, "{sign}{units}.{cents:02}")
    }
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Money> for i64 {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Self::Output {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Self::Output {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_two_decimals() {
        assert_eq!(Money::new(0).to_string(), "0.00");
        assert_eq!(Money::new(1).to_string(), "0.01");
        assert_eq!(Money::new(10).to_string(), "0.10");
        assert_eq!(Money::new(1050).to_string(), "10.50");
        assert_eq!(Money::new(-1050).to_string(), "-10.50");
    }

    #[test]
    fn from_major_rounds_to_cents() {
        assert_eq!(Money::from_major(100.0).unwrap().cents(), 10_000);
        assert_eq!(Money::from_major(-50.0).unwrap().cents(), -5_000);
        assert_eq!(Money::from_major(0.1).unwrap().cents(), 10);
        assert_eq!(Money::from_major(19.999).unwrap().cents(), 2_000);
    }

    #[test]
    fn from_major_rejects_non_finite() {
        assert!(Money::from_major(f64::NAN).is_err());
        assert!(Money::from_major(f64::INFINITY).is_err());
        assert!(Money::from_major(1e300).is_err());
    }

    #[test]
    fn to_major_is_exact_for_cents() {
        assert_eq!(Money::new(7_000).to_major(), 70.0);
        assert_eq!(Money::new(-1_234).to_major(), -12.34);
    }

    #[test]
    fn sums_amounts() {
        let total: Money = [Money::new(150), Money::new(-50), Money::new(25)]
            .into_iter()
            .sum();
        assert_eq!(total, Money::new(125));
    }
}
