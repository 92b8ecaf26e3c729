//! Amount type for monetary values that travel as text.
//!
//! Transactions carry their amount as the text the user typed (e.g. `"5000"` or `"1,200.50"`).
//! The `Amount` type keeps that text verbatim for storage and the wire, and holds the parsed
//! `Decimal` for arithmetic.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// The currency symbol used when displaying totals.
pub const CURRENCY: &str = "₹";

/// Represents a transaction amount.
///
/// Equality and hashing consider the original text, so `"5000"` and `"5,000.00"` are different
/// amounts even though they have the same value. Use `value()` for numeric comparisons.
///
/// # Examples
///
/// ```
/// # use budget_sync::model::Amount;
/// # use std::str::FromStr;
/// let a = Amount::from_str("5000").unwrap();
/// let b = Amount::from_str("₹5,000.00").unwrap();
/// assert_ne!(a, b);
/// assert_eq!(a.value(), b.value());
/// assert_eq!(a.to_string(), "5000");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Amount {
    /// The text as it was entered, trimmed.
    text: String,
    /// The parsed numerical value.
    value: Decimal,
}

impl Amount {
    /// Creates an `Amount` from a `Decimal`, using the decimal's own formatting as the text.
    pub fn new(value: Decimal) -> Self {
        Self {
            text: value.to_string(),
            value,
        }
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// Returns the text of the amount as it was entered.
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// An error that can occur when parsing strings into `Amount` values.
pub struct AmountError {
    text: String,
    source: Option<rust_decimal::Error>,
}

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(e) => write!(f, "'{}' is not a valid amount: {e}", self.text),
            None => write!(f, "An amount is required"),
        }
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn Error + 'static))
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AmountError {
                text: String::new(),
                source: None,
            });
        }

        // Tolerate a leading currency symbol and thousands separators
        let without_symbol = trimmed.strip_prefix(CURRENCY).unwrap_or(trimmed).trim_start();
        let without_commas = without_symbol.replace(',', "");

        let value = Decimal::from_str(&without_commas).map_err(|e| AmountError {
            text: trimmed.to_string(),
            source: Some(e),
        })?;
        Ok(Amount {
            text: trimmed.to_string(),
            value,
        })
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // A remote service may send the amount as a JSON number rather than text.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(serde_json::Number),
        }

        let text = match Raw::deserialize(deserializer)? {
            Raw::Text(s) => s,
            Raw::Number(n) => n.to_string(),
        };
        Amount::from_str(&text).map_err(serde::de::Error::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

/// Displays a total as currency with exactly two decimal places, e.g. `₹3800.00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Money(pub Decimal);

impl Display for Money {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let rounded = self
            .0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        write!(f, "{sign}{CURRENCY}{:.2}", rounded.abs())
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
