use crate::commands::{App, Out};
use crate::error::{ErrorType, IntoResult};
use crate::gateway::Appended;
use crate::model::{
    Dashboard, Report, Summary, Transaction, TransactionType, EXPENSE_CATEGORIES,
    INCOME_CATEGORIES,
};
use crate::notify::{notify_if_enabled, Notification};
use crate::Result;
use serde::Serialize;
use tracing::warn;

/// Validates and appends a transaction, then notifies if the user allows it.
pub async fn add(
    app: &App,
    transaction_type: TransactionType,
    amount: &str,
    category: &str,
    date: &str,
) -> Result<Out<Appended>> {
    app.require_session().await?;
    let transaction = Transaction::new(transaction_type, amount, category, date)
        .pub_result(ErrorType::Validation)?;
    let appended = app
        .gateway()
        .append_transaction(transaction.clone())
        .await
        .pub_result(ErrorType::Storage)?;
    notify(app, &Notification::transaction_added(&transaction)).await?;

    let message = if appended.is_local() {
        "Transaction added! The remote service is unavailable, so it was saved on this device only."
    } else {
        "Transaction added!"
    };
    Ok(Out::new(message, appended))
}

/// Totals and the most recent transactions, newest first.
pub async fn dashboard(app: &App) -> Result<Out<Dashboard>> {
    app.require_session().await?;
    let transactions = app
        .gateway()
        .read_transactions()
        .await
        .pub_result(ErrorType::Storage)?;
    let dashboard = Dashboard::new(&transactions).pub_result(ErrorType::Validation)?;

    let mut message = totals(&dashboard.summary);
    if dashboard.recent.is_empty() {
        message.push_str("\nNo recent transactions found.");
    } else {
        message.push_str("\nRecent transactions:");
        for t in &dashboard.recent {
            message.push_str(&format!("\n  {t}"));
        }
    }
    Ok(Out::new(message, dashboard))
}

/// Totals and per-category totals for `month` (`YYYY-MM`), or for everything.
pub async fn report(app: &App, month: Option<&str>) -> Result<Out<Report>> {
    app.require_session().await?;
    let transactions = app
        .gateway()
        .read_transactions()
        .await
        .pub_result(ErrorType::Storage)?;
    let report = Report::new(&transactions, month).pub_result(ErrorType::Validation)?;

    let mut message = match &report.month {
        Some(m) => format!("Report for {m}\n"),
        None => "Report for all transactions\n".to_string(),
    };
    message.push_str(&totals(&report.summary));
    if !report.by_category.is_empty() {
        message.push_str("\nBy category:");
        for c in &report.by_category {
            message.push_str(&format!("\n  {}: {}", c.category, c.total));
        }
    }
    notify(app, &Notification::report_generated()).await?;
    Ok(Out::new(message, report))
}

/// The categories offered for each transaction type.
#[derive(Debug, Clone, Serialize)]
pub struct Categories {
    pub income: &'static [&'static str],
    pub expense: &'static [&'static str],
}

pub fn categories() -> Out<Categories> {
    let message = format!(
        "Income: {}\nExpense: {}",
        INCOME_CATEGORIES.join(", "),
        EXPENSE_CATEGORIES.join(", ")
    );
    Out::new(
        message,
        Categories {
            income: INCOME_CATEGORIES,
            expense: EXPENSE_CATEGORIES,
        },
    )
}

fn totals(summary: &Summary) -> String {
    format!(
        "Income: {}\nExpenses: {}\nBalance: {}",
        summary.income, summary.expense, summary.balance
    )
}

/// Notification failures never fail the command that triggered them.
async fn notify(app: &App, notification: &Notification) -> Result<()> {
    let settings = app
        .gateway()
        .load_settings()
        .await
        .pub_result(ErrorType::Storage)?;
    if let Err(e) = notify_if_enabled(app.notifier(), &settings, notification).await {
        warn!("Unable to show a notification: {e:#}");
    }
    Ok(())
}
