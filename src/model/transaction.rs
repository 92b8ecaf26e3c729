use crate::model::Amount;
use crate::Result;
use anyhow::{bail, Context};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Categories offered for income transactions.
pub const INCOME_CATEGORIES: &[&str] = &[
    "Salary",
    "Freelance",
    "Business",
    "Investment",
    "Gift",
    "Other Income",
];

/// Categories offered for expense transactions.
pub const EXPENSE_CATEGORIES: &[&str] = &[
    "Food",
    "Transport",
    "Rent",
    "Bills & Utilities",
    "Shopping",
    "Entertainment",
    "Healthcare",
    "Education",
    "Travel",
    "Miscellaneous",
];

/// Whether money came in or went out.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
pub enum TransactionType {
    Income,
    Expense,
}

serde_plain::derive_display_from_serialize!(TransactionType);
serde_plain::derive_fromstr_from_deserialize!(TransactionType);

impl TransactionType {
    /// The categories suggested for this type of transaction.
    pub fn categories(&self) -> &'static [&'static str] {
        match self {
            TransactionType::Income => INCOME_CATEGORIES,
            TransactionType::Expense => EXPENSE_CATEGORIES,
        }
    }
}

/// A single income or expense entry. Transactions are immutable once created; the list they live
/// in is append-only and kept in entry order, not date order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "type")]
    transaction_type: TransactionType,
    amount: Amount,
    category: String,
    /// ISO date, `YYYY-MM-DD`, kept as text.
    date: String,
}

impl Transaction {
    /// Validates the raw form fields and builds a `Transaction`.
    ///
    /// All four fields are required. The amount must parse as a decimal and the date must be an
    /// ISO calendar date.
    pub fn new(
        transaction_type: TransactionType,
        amount: &str,
        category: &str,
        date: &str,
    ) -> Result<Self> {
        let category = category.trim();
        let date = date.trim();
        if amount.trim().is_empty() || category.is_empty() || date.is_empty() {
            bail!("Please fill all fields.");
        }
        let amount = Amount::from_str(amount)?;
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .with_context(|| format!("'{date}' is not a date in the form YYYY-MM-DD"))?;
        Ok(Self {
            transaction_type,
            amount,
            category: category.to_string(),
            date: date.to_string(),
        })
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    pub fn amount(&self) -> &Amount {
        &self.amount
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    /// Whether the transaction's date falls in `month`, given as `YYYY-MM`.
    pub fn in_month(&self, month: &str) -> bool {
        self.date.starts_with(month)
    }
}

impl std::fmt::Display for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}: {} {}{}",
            self.date,
            self.transaction_type,
            self.category,
            crate::model::amount::CURRENCY,
            self.amount
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_new_valid() {
        let t = Transaction::new(TransactionType::Income, "5000", "Salary", "2024-01-05").unwrap();
        assert_eq!(t.transaction_type(), TransactionType::Income);
        assert_eq!(t.amount().value(), Decimal::from(5000));
        assert_eq!(t.category(), "Salary");
        assert_eq!(t.date(), "2024-01-05");
    }

    #[test]
    fn test_new_missing_field() {
        let e = Transaction::new(TransactionType::Expense, "12", " ", "2024-01-05").unwrap_err();
        assert_eq!(e.to_string(), "Please fill all fields.");
    }

    #[test]
    fn test_new_bad_date() {
        let e = Transaction::new(TransactionType::Expense, "12", "Food", "2024-13-40").unwrap_err();
        assert!(e.to_string().contains("YYYY-MM-DD"));
    }

    #[test]
    fn test_new_bad_amount() {
        assert!(Transaction::new(TransactionType::Expense, "abc", "Food", "2024-01-05").is_err());
    }

    #[test]
    fn test_json_shape() {
        let t = Transaction::new(TransactionType::Expense, "1200", "Food", "2024-01-06").unwrap();
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "Expense",
                "amount": "1200",
                "category": "Food",
                "date": "2024-01-06"
            })
        );
    }

    #[test]
    fn test_in_month() {
        let t = Transaction::new(TransactionType::Expense, "1", "Food", "2024-02-29").unwrap();
        assert!(t.in_month("2024-02"));
        assert!(!t.in_month("2024-03"));
    }

    #[test]
    fn test_display() {
        let t = Transaction::new(TransactionType::Income, "50", "Gift", "2024-01-01").unwrap();
        assert_eq!(t.to_string(), "2024-01-01 Income: Gift ₹50");
    }

    #[test]
    fn test_type_from_str() {
        assert_eq!(
            TransactionType::from_str("Expense").unwrap(),
            TransactionType::Expense
        );
        assert_eq!(TransactionType::Income.categories()[0], "Salary");
    }
}
