//! Totals and groupings computed over a list of transactions for the dashboard and reports.

use crate::model::{Money, Transaction, TransactionType};
use crate::Result;
use anyhow::{anyhow, Context};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// How many transactions the dashboard lists.
pub const RECENT_COUNT: usize = 5;

/// Income, expense and balance totals.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub income: Money,
    pub expense: Money,
    pub balance: Money,
}

impl Summary {
    /// Adds up `transactions`. Fails when a total does not fit in a `Decimal`.
    pub fn of<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Result<Self> {
        let mut income = Decimal::ZERO;
        let mut expense = Decimal::ZERO;
        for t in transactions {
            match t.transaction_type() {
                TransactionType::Income => income = add(income, t)?,
                TransactionType::Expense => expense = add(expense, t)?,
            }
        }
        let balance = income
            .checked_sub(expense)
            .ok_or_else(|| anyhow!("The balance is too large to compute"))?;
        Ok(Self {
            income: Money(income),
            expense: Money(expense),
            balance: Money(balance),
        })
    }
}

fn add(total: Decimal, transaction: &Transaction) -> Result<Decimal> {
    total
        .checked_add(transaction.amount().value())
        .ok_or_else(|| anyhow!("The total for {transaction} is too large to compute"))
}

/// What the dashboard shows: the totals and the most recent entries, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub summary: Summary,
    pub recent: Vec<Transaction>,
}

impl Dashboard {
    pub fn new(transactions: &[Transaction]) -> Result<Self> {
        let recent = transactions
            .iter()
            .rev()
            .take(RECENT_COUNT)
            .cloned()
            .collect();
        Ok(Self {
            summary: Summary::of(transactions)?,
            recent,
        })
    }
}

/// The total amount recorded against one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Money,
}

/// A report over all transactions, or over one month of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub month: Option<String>,
    pub summary: Summary,
    /// Per-category totals in the order each category first appears.
    pub by_category: Vec<CategoryTotal>,
}

impl Report {
    /// Builds a report. `month` is `YYYY-MM`; transactions whose date does not start with it are
    /// left out.
    pub fn new(transactions: &[Transaction], month: Option<&str>) -> Result<Self> {
        let month = month.map(str::trim).filter(|m| !m.is_empty());
        if let Some(m) = month {
            NaiveDate::parse_from_str(&format!("{m}-01"), "%Y-%m-%d")
                .with_context(|| format!("'{m}' is not a month in the form YYYY-MM"))?;
        }

        let filtered: Vec<&Transaction> = transactions
            .iter()
            .filter(|t| month.map_or(true, |m| t.in_month(m)))
            .collect();

        let mut by_category: Vec<(String, Decimal)> = Vec::new();
        for t in &filtered {
            match by_category.iter_mut().find(|(c, _)| c == t.category()) {
                Some((_, total)) => *total = add(*total, t)?,
                None => by_category.push((t.category().to_string(), t.amount().value())),
            }
        }

        Ok(Self {
            month: month.map(String::from),
            summary: Summary::of(filtered.iter().copied())?,
            by_category: by_category
                .into_iter()
                .map(|(category, total)| CategoryTotal {
                    category,
                    total: Money(total),
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(kind: TransactionType, amount: &str, category: &str, date: &str) -> Transaction {
        Transaction::new(kind, amount, category, date).unwrap()
    }

    fn sample() -> Vec<Transaction> {
        vec![
            t(TransactionType::Income, "5000", "Salary", "2024-01-05"),
            t(TransactionType::Expense, "1200", "Food", "2024-01-06"),
            t(TransactionType::Expense, "300.50", "Food", "2024-02-01"),
            t(TransactionType::Expense, "99.50", "Transport", "2024-02-03"),
        ]
    }

    #[test]
    fn test_summary_totals() {
        let s = Summary::of(&sample()[..2]).unwrap();
        assert_eq!(s.income.to_string(), "₹5000.00");
        assert_eq!(s.expense.to_string(), "₹1200.00");
        assert_eq!(s.balance.to_string(), "₹3800.00");
    }

    #[test]
    fn test_summary_empty() {
        let s = Summary::of(&Vec::<Transaction>::new()).unwrap();
        assert_eq!(s.balance.to_string(), "₹0.00");
    }

    #[test]
    fn test_dashboard_recent_newest_first() {
        let mut transactions = sample();
        transactions.extend(sample());
        let d = Dashboard::new(&transactions).unwrap();
        assert_eq!(d.recent.len(), RECENT_COUNT);
        assert_eq!(d.recent[0].category(), "Transport");
        assert_eq!(d.recent[1].date(), "2024-02-01");
    }

    #[test]
    fn test_report_month_filter() {
        let r = Report::new(&sample(), Some("2024-02")).unwrap();
        assert_eq!(r.summary.income.to_string(), "₹0.00");
        assert_eq!(r.summary.expense.to_string(), "₹400.00");
        assert_eq!(r.by_category.len(), 2);
        assert_eq!(r.by_category[0].category, "Food");
        assert_eq!(r.by_category[0].total.to_string(), "₹300.50");
    }

    #[test]
    fn test_report_groups_in_first_seen_order() {
        let r = Report::new(&sample(), None).unwrap();
        let names: Vec<&str> = r.by_category.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(names, vec!["Salary", "Food", "Transport"]);
        assert_eq!(r.by_category[1].total.to_string(), "₹1500.50");
        assert_eq!(r.month, None);
    }

    #[test]
    fn test_report_bad_month() {
        assert!(Report::new(&sample(), Some("January")).is_err());
        assert!(Report::new(&sample(), Some("2024-13")).is_err());
    }

    #[test]
    fn test_report_blank_month_means_all() {
        let r = Report::new(&sample(), Some("  ")).unwrap();
        assert_eq!(r.month, None);
        assert_eq!(r.summary.expense.to_string(), "₹1600.00");
    }

    #[test]
    fn test_totals_too_large_are_errors() {
        let max = "79228162514264337593543950335";
        let incomes = vec![
            t(TransactionType::Income, max, "Salary", "2024-01-05"),
            t(TransactionType::Income, max, "Salary", "2024-01-06"),
        ];
        assert!(Summary::of(&incomes).is_err());
        assert!(Dashboard::new(&incomes).is_err());
        assert!(Report::new(&incomes, None).is_err());

        let mixed = vec![
            t(TransactionType::Income, max, "Salary", "2024-01-05"),
            t(TransactionType::Expense, &format!("-{max}"), "Food", "2024-01-06"),
        ];
        assert!(Summary::of(&mixed).is_err());
    }
}
