// src/money.rs

//! Monetary amounts
//!
//! Prices, totals and discounts are held as integer cents so that sale
//! totals add up exactly. Amounts display in the Brazilian Real style used
//! at the till (`R$ 12.34`) and parse from what a cashier types: `12.34`,
//! `12,34`, `12` or `R$ 12.34`.

use rusqlite::ToSql;
use rusqlite::types::{FromSql, FromSqlResult, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

/// An amount of money in cents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Multiply a unit price by a quantity; `None` on overflow
    pub fn times(self, quantity: i64) -> Option<Money> {
        self.0.checked_mul(quantity).map(Money)
    }

    /// `None` on overflow
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "R$ {}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl FromStr for Money {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        let trimmed = trimmed.strip_prefix("R$").unwrap_or(trimmed).trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest.trim()),
            None => (false, trimmed),
        };

        if digits.is_empty() {
            return Err(format!("Invalid amount: '{s}'"));
        }

        let normalized = digits.replace(',', ".");
        let (whole, frac) = match normalized.split_once('.') {
            Some((w, f)) => (w, f),
            None => (normalized.as_str(), ""),
        };

        if frac.len() > 2 {
            return Err(format!("Amount has more than two decimal places: '{s}'"));
        }
        if whole.is_empty() && frac.is_empty() {
            return Err(format!("Invalid amount: '{s}'"));
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(format!("Invalid amount: '{s}'"));
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| format!("Amount out of range: '{s}'"))?
        };
        let frac: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|e| e.to_string())? * 10,
            _ => frac.parse().map_err(|e: std::num::ParseIntError| e.to_string())?,
        };

        let cents = whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(frac))
            .ok_or_else(|| format!("Amount out of range: '{s}'"))?;

        Ok(Money(if negative { -cents } else { cents }))
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

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl ToSql for Money {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0))
    }
}

impl FromSql for Money {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(Money)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1234).to_string(), "R$ 12.34");
        assert_eq!(Money::from_cents(5).to_string(), "R$ 0.05");
        assert_eq!(Money::from_cents(-250).to_string(), "R$ -2.50");
        assert_eq!(Money::ZERO.to_string(), "R$ 0.00");
    }

    #[test]
    fn test_parse_accepts_till_formats() {
        assert_eq!("12.34".parse::<Money>().unwrap(), Money::from_cents(1234));
        assert_eq!("12,34".parse::<Money>().unwrap(), Money::from_cents(1234));
        assert_eq!("12".parse::<Money>().unwrap(), Money::from_cents(1200));
        assert_eq!("12.5".parse::<Money>().unwrap(), Money::from_cents(1250));
        assert_eq!("R$ 7.90".parse::<Money>().unwrap(), Money::from_cents(790));
        assert_eq!(".99".parse::<Money>().unwrap(), Money::from_cents(99));
        assert_eq!("-3".parse::<Money>().unwrap(), Money::from_cents(-300));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<Money>().is_err());
        assert!("R$".parse::<Money>().is_err());
        assert!("1.234".parse::<Money>().is_err());
        assert!("12a".parse::<Money>().is_err());
        assert!("1.2.3".parse::<Money>().is_err());
        assert!(".".parse::<Money>().is_err());
    }

    #[test]
    fn test_arithmetic() {
        let price = Money::from_cents(1999);
        assert_eq!(price.times(3), Some(Money::from_cents(5997)));
        assert_eq!(
            Money::from_cents(3998) - Money::from_cents(998),
            Money::from_cents(3000)
        );

        let total: Money = [Money::from_cents(100), Money::from_cents(250)]
            .into_iter()
            .sum();
        assert_eq!(total, Money::from_cents(350));
    }

    #[test]
    fn test_overflow_is_reported() {
        assert_eq!(Money::from_cents(300).times(i64::MAX / 2), None);
        assert_eq!(Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)), None);
        assert_eq!(
            Money::from_cents(1).checked_add(Money::from_cents(2)),
            Some(Money::from_cents(3))
        );
    }
}
