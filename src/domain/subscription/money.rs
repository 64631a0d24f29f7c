//! Monetary amounts in minor currency units.
//!
//! The commerce platform reports prices as decimal strings (`"29.99"`) and
//! occasionally as JSON numbers. Both are normalised into integer minor units
//! on the way in so that sums such as lifetime value never accumulate
//! floating point error.

use std::fmt;
use std::iter::Sum;
use std::ops::Add;

use serde::{Deserialize, Deserializer, Serialize};

/// An amount in the currency's minor unit (cents for USD).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct MinorUnits(i64);

impl MinorUnits {
    pub const ZERO: Self = Self(0);

    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    /// Parses a decimal amount such as `"29.99"`, `"30"` or `".5"`.
    ///
    /// Digits past the second decimal place are rounded half-up.
    pub fn parse_decimal(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
        if whole.is_empty() && fraction.is_empty() {
            return None;
        }
        if !whole.bytes().all(|b| b.is_ascii_digit())
            || !fraction.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }

        let whole_value: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
        let mut cents: String = fraction.chars().take(2).collect();
        while cents.len() < 2 {
            cents.push('0');
        }

        let mut minor = whole_value
            .checked_mul(100)?
            .checked_add(cents.parse::<i64>().ok()?)?;
        if fraction.as_bytes().get(2).is_some_and(|digit| *digit >= b'5') {
            minor = minor.checked_add(1)?;
        }

        Some(Self(if negative { -minor } else { minor }))
    }

    /// Converts a major-unit float (`29.99`) into minor units.
    pub fn from_major(amount: f64) -> Option<Self> {
        if !amount.is_finite() {
            return None;
        }
        let minor = (amount * 100.0).round();
        if minor.abs() > i64::MAX as f64 {
            return None;
        }
        Some(Self(minor as i64))
    }

    /// Renders the amount as a major-unit decimal string (`"29.99"`).
    pub fn to_major_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        format!("{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl fmt::Display for MinorUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_major_string())
    }
}

impl Add for MinorUnits {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for MinorUnits {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'de> Deserialize<'de> for MinorUnits {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawAmount {
            Text(String),
            Number(f64),
        }

        match RawAmount::deserialize(deserializer)? {
            RawAmount::Text(text) => Self::parse_decimal(&text).ok_or_else(|| {
                serde::de::Error::custom(format!("invalid decimal amount: {text:?}"))
            }),
            RawAmount::Number(number) => Self::from_major(number)
                .ok_or_else(|| serde::de::Error::custom("amount out of range")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_two_decimal_places() {
        assert_eq!(MinorUnits::parse_decimal("29.99"), Some(MinorUnits::new(2999)));
    }

    #[test]
    fn parses_whole_and_short_fraction() {
        assert_eq!(MinorUnits::parse_decimal("30"), Some(MinorUnits::new(3000)));
        assert_eq!(MinorUnits::parse_decimal("4.5"), Some(MinorUnits::new(450)));
        assert_eq!(MinorUnits::parse_decimal(".5"), Some(MinorUnits::new(50)));
    }

    #[test]
    fn rounds_third_decimal_half_up() {
        assert_eq!(MinorUnits::parse_decimal("1.005"), Some(MinorUnits::new(101)));
        assert_eq!(MinorUnits::parse_decimal("1.004"), Some(MinorUnits::new(100)));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(MinorUnits::parse_decimal(""), None);
        assert_eq!(MinorUnits::parse_decimal("."), None);
        assert_eq!(MinorUnits::parse_decimal("12a"), None);
        assert_eq!(MinorUnits::parse_decimal("1.2.3"), None);
    }

    #[test]
    fn negative_amounts_keep_sign() {
        let refund = MinorUnits::parse_decimal("-3.10").unwrap();
        assert_eq!(refund.value(), -310);
        assert_eq!(refund.to_major_string(), "-3.10");
    }

    #[test]
    fn deserializes_from_string_or_number() {
        let from_text: MinorUnits = serde_json::from_str("\"19.95\"").unwrap();
        let from_float: MinorUnits = serde_json::from_str("19.95").unwrap();
        let from_int: MinorUnits = serde_json::from_str("20").unwrap();

        assert_eq!(from_text, MinorUnits::new(1995));
        assert_eq!(from_float, MinorUnits::new(1995));
        assert_eq!(from_int, MinorUnits::new(2000));
    }

    #[test]
    fn sums_without_float_drift() {
        let total: MinorUnits = ["0.10", "0.20", "0.30"]
            .iter()
            .filter_map(|s| MinorUnits::parse_decimal(s))
            .sum();
        assert_eq!(total.to_major_string(), "0.60");
    }
}
