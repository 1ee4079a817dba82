use std::fmt;

use serde::{Deserialize, Serialize};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Overflow error while applying {0} operation on {1} and {2}")]
    Overflow(&'static str, Money, Money),

    #[error("Money parse error: {0}, {1:?}")]
    Parse(&'static str, String),
}

/// Non-negative amount of money, stored as hundredths so arithmetic stays exact.
///
/// The only accepted text form is `<digits>.<two digits>`, e.g. `"15.00"`. It is
/// serialized the same way, never as a float.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[serde(try_from = "String", into = "String")]
pub struct Money(pub u64);

impl Money {
    pub const ZERO: Self = Self(0);
    pub const MAX: Self = Self(u64::MAX);

    const SCALE: u64 = 100;

    pub fn parse(raw: &str) -> Result<Self, MoneyError> {
        let (units, cents) = raw
            .split_once('.')
            .ok_or_else(|| MoneyError::Parse("Missing decimal point", raw.to_string()))?;

        if units.is_empty() || !units.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MoneyError::Parse("Whole part must be one or more digits", raw.to_string()));
        }

        if cents.len() != 2 || !cents.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MoneyError::Parse("Exactly two decimal places are required", raw.to_string()));
        }

        let out_of_range = || MoneyError::Parse("Amount out of range", raw.to_string());

        let units: u64 = units.parse().map_err(|_| out_of_range())?;
        let cents: u64 = cents.parse().map_err(|_| out_of_range())?;

        return units
            .checked_mul(Self::SCALE)
            .and_then(|units| units.checked_add(cents))
            .map(Money)
            .ok_or_else(out_of_range);
    }

    pub fn is_zero(&self) -> bool {
        return self.0 == 0;
    }

    pub fn checked_add(&self, other: &Self) -> Option<Self> {
        return self.0.checked_add(other.0).map(Money);
    }

    /// Adds in place. On overflow the value is left untouched.
    pub fn add(&mut self, other: &Self) -> Result<(), MoneyError> {
        *self = self
            .checked_add(other)
            .ok_or(MoneyError::Overflow("add", *self, *other))?;

        return Ok(());
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        return write!(f, "{}.{:02}", self.0 / Self::SCALE, self.0 % Self::SCALE);
    }
}

impl TryFrom<String> for Money {
    type Error = MoneyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        return Self::parse(&value);
    }
}

impl From<Money> for String {
    fn from(money: Money) -> Self {
        return money.to_string();
    }
}
