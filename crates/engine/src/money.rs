use std::{
    fmt,
    ops::{Add, Sub},
    str::FromStr,
};

use crate::EngineError;

/// Signed money amount represented as **integer paise** (1/100 of a rupee).
///
/// Use this type when doing arithmetic over stored amounts (order totals,
/// expenses, transfers) to avoid floating-point drift. Storage and the API
/// carry the raw `i64` as `*_minor` fields.
///
/// # Examples
///
/// ```rust
/// use engine::Money;
///
/// let amount = Money::new(12_34);
/// assert_eq!(amount.minor(), 1234);
/// assert_eq!(amount.to_string(), "₹12.34");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Creates a new amount from integer paise.
    #[must_use]
    pub const fn new(minor: i64) -> Self {
        Self(minor)
    }

    /// Returns the raw value in paise.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
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

    /// Parses a rupee amount such as `1500`, `1,500.5` or `₹-12.34` into
    /// paise. At most two decimal places are accepted.
    pub fn parse_major(raw: &str) -> Result<Self, EngineError> {
        let invalid = || EngineError::Validation(format!("invalid amount: {raw}"));

        let trimmed = raw.trim();
        let trimmed = trimmed.strip_prefix('₹').unwrap_or(trimmed).trim_start();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let digits = digits.strip_prefix('₹').unwrap_or(digits).replace(',', "");

        let (whole, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), ""));
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if fraction.len() > 2
            || !whole.bytes().all(|b| b.is_ascii_digit())
            || !fraction.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let rupees: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let paise: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => fraction.parse().map_err(|_| invalid())?,
        };

        let minor = rupees
            .checked_mul(100)
            .and_then(|v| v.checked_add(paise))
            .ok_or_else(invalid)?;
        Ok(Self(if negative { -minor } else { minor }))
    }
}

impl FromStr for Money {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_major(s)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let rupees = abs / 100;
        let paise = abs % 100;
        write!(f, "{sign}₹{rupees}.{paise:02}")
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

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Self::Output {
        Money(self.0 - rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_inr() {
        assert_eq!(Money::new(0).to_string(), "₹0.00");
        assert_eq!(Money::new(1).to_string(), "₹0.01");
        assert_eq!(Money::new(10).to_string(), "₹0.10");
        assert_eq!(Money::new(150_000).to_string(), "₹1500.00");
        assert_eq!(Money::new(-1050).to_string(), "-₹10.50");
    }

    #[test]
    fn parse_major_reads_rupees_into_paise() {
        assert_eq!(Money::parse_major("1500").unwrap(), Money::new(150_000));
        assert_eq!(Money::parse_major("1,500.5").unwrap(), Money::new(150_050));
        assert_eq!(Money::parse_major(" ₹4500.50 ").unwrap(), Money::new(450_050));
        assert_eq!(Money::parse_major("-12.34").unwrap(), Money::new(-1_234));
        assert_eq!(Money::parse_major(".75").unwrap(), Money::new(75));
        assert_eq!("0.01".parse::<Money>().unwrap(), Money::new(1));
    }

    #[test]
    fn parse_major_rejects_garbage() {
        for raw in ["", "₹", "12.345", "12a", "1.2.3", "--5"] {
            assert_eq!(
                Money::parse_major(raw),
                Err(EngineError::Validation(format!("invalid amount: {raw}"))),
                "{raw}"
            );
        }
    }

    #[test]
    fn arithmetic_keeps_sign() {
        let revenue = Money::new(10_000);
        let expenses = Money::new(12_500);
        let profit = revenue - expenses;
        assert!(profit.is_negative());
        assert_eq!(profit.minor(), -2_500);
        assert!((profit + Money::new(5_000)).is_positive());
    }
}
