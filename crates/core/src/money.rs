use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

/// A rupee amount held at paise precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(Decimal);

impl Money {
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, 2))
    }

    /// Whole paise, saturating at the `i64` bounds. [`Money::parse`] never
    /// produces a value outside them.
    pub fn to_cents(self) -> i64 {
        checked_cents(self.0).unwrap_or(if self.0.is_sign_negative() {
            i64::MIN
        } else {
            i64::MAX
        })
    }

    pub fn from_decimal(decimal: Decimal) -> Self {
        Money(decimal.round_dp(2))
    }

    pub fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn amount(self) -> Decimal {
        self.0
    }

    /// Parse an amount as printed in a bank message: `1,23,456.50`, `500`, `2500.0`.
    /// Grouping commas are dropped; anything else non-numeric is rejected, as
    /// is any figure too large to store as `i64` paise.
    pub fn parse(raw: &str) -> Option<Self> {
        let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
        if cleaned.is_empty() {
            return None;
        }
        let money = Money::from_decimal(Decimal::from_str(&cleaned).ok()?);
        checked_cents(money.0)?;
        Some(money)
    }
}

fn checked_cents(value: Decimal) -> Option<i64> {
    value.round_dp(2).checked_mul(Decimal::ONE_HUNDRED)?.to_i64()
}

impl fmt::Display for Money {
    /// Rupee symbol, Indian digit grouping (`₹1,23,456`), paise only when non-zero.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.0.round_dp(2);
        let sign = if value.is_sign_negative() && !value.is_zero() { "-" } else { "" };
        let abs = value.abs();
        let whole = abs.trunc();
        let paise = ((abs - whole) * Decimal::from(100)).to_i64().unwrap_or_default();
        let grouped = group_indian(&whole.to_i64().unwrap_or_default().to_string());
        if paise == 0 {
            write!(f, "{sign}₹{grouped}")
        } else {
            write!(f, "{sign}₹{grouped}.{paise:02}")
        }
    }
}

/// Lakh/crore grouping: the last three digits, then pairs.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Money(self.0 - rhs.0)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |a, b| a + b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cents_round_trip() {
        assert_eq!(Money::from_cents(12_345).to_cents(), 12_345);
        assert_eq!(Money::from_cents(0), Money::zero());
    }

    #[test]
    fn parse_strips_grouping() {
        assert_eq!(Money::parse("1,23,456.50").unwrap().to_cents(), 12_345_650);
        assert_eq!(Money::parse("2500.0").unwrap().to_cents(), 250_000);
        assert_eq!(Money::parse(" 500 ").unwrap().to_cents(), 50_000);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(Money::parse("").is_none());
        assert!(Money::parse(",").is_none());
        assert!(Money::parse("12a").is_none());
    }

    #[test]
    fn parse_rejects_amounts_beyond_paise_range() {
        assert!(Money::parse("99,99,99,99,99,99,99,99,999").is_none());
        assert!(Money::parse("92233720368547758.08").is_none());
        let max = Money::parse("92233720368547758.07").unwrap();
        assert_eq!(max.to_cents(), i64::MAX);
        assert_eq!(Money::from_decimal(Decimal::from(i64::MAX)).to_cents(), i64::MAX);
    }

    #[test]
    fn display_uses_indian_grouping() {
        assert_eq!(Money::from_cents(12_345_600).to_string(), "₹1,23,456");
        assert_eq!(Money::from_cents(1_000_000_000).to_string(), "₹1,00,00,000");
        assert_eq!(Money::from_cents(99_900).to_string(), "₹999");
        assert_eq!(Money::from_cents(150_050).to_string(), "₹1,500.50");
    }

    #[test]
    fn display_negative() {
        assert_eq!(Money::from_cents(-250_000).to_string(), "-₹2,500");
    }

    #[test]
    fn sum_of_amounts() {
        let total: Money = [100, 250, 650].into_iter().map(Money::from_cents).sum();
        assert_eq!(total, Money::from_cents(1_000));
    }
}
