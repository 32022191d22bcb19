use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Monetary amount stored as a whole number of cents.
///
/// Prices never go through floating point: text is parsed with
/// `rust_decimal`, rounded half away from zero to two decimals and
/// kept as an `i64` count of cents.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyParseError {
    #[error("not a decimal number: {0:?}")]
    Invalid(String),

    #[error("amount out of range: {0}")]
    OutOfRange(String),
}

impl Money {
    pub const ZERO: Money = Money(0);
    pub const CENTS_PER_UNIT: i64 = 100;

    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub const fn from_units(units: i64) -> Self {
        Self(units * Self::CENTS_PER_UNIT)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Round a decimal to the nearest cent, half away from zero.
    pub fn from_decimal(value: Decimal) -> Option<Self> {
        let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        rounded
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|cents| cents.to_i64())
            .map(Self)
    }

    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl FromStr for Money {
    type Err = MoneyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim())
            .map_err(|_| MoneyParseError::Invalid(s.to_string()))?;
        Self::from_decimal(value).ok_or_else(|| MoneyParseError::OutOfRange(s.to_string()))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
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

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_two_decimals() {
        let m: Money = "10.00".parse().unwrap();
        assert_eq!(m.cents(), 1000);
        assert_eq!(m.to_string(), "10.00");
    }

    #[test]
    fn test_parse_whole_units() {
        let m: Money = "10".parse().unwrap();
        assert_eq!(m, Money::from_units(10));
        assert_eq!(m.to_string(), "10.00");
    }

    #[test]
    fn test_rounds_half_away_from_zero() {
        assert_eq!("9.995".parse::<Money>().unwrap().cents(), 1000);
        assert_eq!("9.994".parse::<Money>().unwrap().cents(), 999);
        assert_eq!("-0.005".parse::<Money>().unwrap().cents(), -1);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            "ten".parse::<Money>(),
            Err(MoneyParseError::Invalid(_))
        ));
    }

    #[test]
    fn test_out_of_range_amounts_are_rejected() {
        assert!(matches!(
            "79228162514264337593543950335".parse::<Money>(),
            Err(MoneyParseError::OutOfRange(_))
        ));
        assert!(matches!(
            "100000000000000000000".parse::<Money>(),
            Err(MoneyParseError::OutOfRange(_))
        ));
        assert_eq!(Money::from_decimal(Decimal::MIN), None);
    }

    #[test]
    fn test_from_decimal() {
        assert_eq!(Money::from_decimal(dec!(0.1)), Some(Money::from_cents(10)));
    }

    #[test]
    fn test_serializes_as_cents() {
        let json = serde_json::to_string(&Money::from_cents(1234)).unwrap();
        assert_eq!(json, "1234");
    }
}
