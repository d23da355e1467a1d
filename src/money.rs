//! Exact monetary values.
//!
//! Amounts are stored in SQLite as canonical decimal strings (e.g. "1075.50")
//! so that balances never pass through binary floating point.

use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
    str::FromStr,
};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::Error;

/// The smallest amount a transaction or budget may have.
pub const MIN_AMOUNT: Decimal = dec!(0.01);
/// The largest magnitude of any stored amount.
pub const MAX_AMOUNT: Decimal = dec!(99999999.99);

const DECIMAL_PLACES: u32 = 2;

/// A signed amount of money with exactly two decimal places.
///
/// Every way of building one, deserialization included, goes through
/// [Money::new], so the scale is always two.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    /// Zero dollars.
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Create an amount of money without checking its range.
    ///
    /// The value is rounded to two decimal places.
    pub fn new(value: Decimal) -> Self {
        let mut value = value.round_dp(DECIMAL_PLACES);
        value.rescale(DECIMAL_PLACES);
        Self(value)
    }

    /// Validate the amount of a transaction or budget.
    ///
    /// # Errors
    ///
    /// Returns [Error::TooManyDecimalPlaces] for fractions of a cent and
    /// [Error::AmountOutOfRange] outside of `[0.01, 99999999.99]`.
    pub fn positive_amount(value: Decimal) -> Result<Self, Error> {
        let value = Self::checked_scale(value)?;

        if !(MIN_AMOUNT..=MAX_AMOUNT).contains(&value.0) {
            return Err(Error::AmountOutOfRange);
        }

        Ok(value)
    }

    /// Validate the opening balance of a wallet.
    ///
    /// # Errors
    ///
    /// Returns [Error::TooManyDecimalPlaces] for fractions of a cent and
    /// [Error::BalanceOutOfRange] outside of `[-99999999.99, 99999999.99]`.
    pub fn opening_balance(value: Decimal) -> Result<Self, Error> {
        let value = Self::checked_scale(value)?;

        if value.0.abs() > MAX_AMOUNT {
            return Err(Error::BalanceOutOfRange);
        }

        Ok(value)
    }

    fn checked_scale(value: Decimal) -> Result<Self, Error> {
        if value.normalize().scale() > DECIMAL_PLACES {
            return Err(Error::TooManyDecimalPlaces);
        }

        Ok(Self::new(value))
    }

    /// The underlying decimal value.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is less than zero.
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Whether the amount is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// The magnitude of the amount.
    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Self::new(value)
    }
}

impl From<Money> for Decimal {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim()).map(Self::new)
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl ToSql for Money {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0.to_string()))
    }
}

impl FromSql for Money {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Text(_) => {
                let text = value.as_str()?;
                text.parse()
                    .map_err(|error| FromSqlError::Other(Box::new(error)))
            }
            ValueRef::Integer(integer) => Ok(Self::new(Decimal::from(integer))),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}
