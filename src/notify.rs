//! Desktop notifications after writes.
//!
//! A notification is shown only when the user enabled notifications in their settings *and* the
//! platform permission is granted. Permission is requested at most once, from `Default`. A denial
//! is final and only reported, never an error.

use crate::model::{Settings, Transaction, TransactionType, CURRENCY};
use crate::{Config, Result};
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

/// When this environment variable is `deny`, `LogNotifier::request_permission` denies.
pub const NOTIFICATIONS_ENV: &str = "BUDGET_NOTIFICATIONS";

/// Shown when the user enables notifications but the permission is denied.
pub const BLOCKED_MESSAGE: &str = "Browser notifications blocked.";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// Not asked yet.
    #[default]
    Default,
    Granted,
    Denied,
}

serde_plain::derive_display_from_serialize!(Permission);
serde_plain::derive_fromstr_from_deserialize!(Permission);

/// Whether a notification should be shown.
pub fn should_notify(settings: &Settings, permission: Permission) -> bool {
    settings.notifications && permission == Permission::Granted
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

impl Notification {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    pub fn transaction_added(transaction: &Transaction) -> Self {
        let kind = match transaction.transaction_type() {
            TransactionType::Income => "Income",
            TransactionType::Expense => "Expense",
        };
        Self::new(
            format!("New {kind} Added"),
            format!(
                "{}: {CURRENCY}{}",
                transaction.category(),
                transaction.amount()
            ),
        )
    }

    pub fn report_generated() -> Self {
        Self::new("Report Generated", "Your report is ready!")
    }

    pub fn enabled() -> Self {
        Self::new("Notifications Enabled", "You’ll now get alerts!")
    }
}

/// The platform's notification capability.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn permission(&self) -> Result<Permission>;

    /// Asks the user for permission and returns the answer.
    async fn request_permission(&self) -> Result<Permission>;

    async fn notify(&self, notification: &Notification) -> Result<()>;
}

#[async_trait::async_trait]
impl<T> Notifier for Arc<T>
where
    T: Notifier + ?Sized,
{
    async fn permission(&self) -> Result<Permission> {
        (**self).permission().await
    }

    async fn request_permission(&self) -> Result<Permission> {
        (**self).request_permission().await
    }

    async fn notify(&self, notification: &Notification) -> Result<()> {
        (**self).notify(notification).await
    }
}

/// Requests permission if it has never been asked for. Otherwise returns the current state, so a
/// denial is never re-prompted.
pub async fn ensure_permission<N>(notifier: &N) -> Result<Permission>
where
    N: Notifier + ?Sized,
{
    match notifier.permission().await? {
        Permission::Default => {
            let permission = notifier.request_permission().await?;
            debug!("Notification permission is now {permission}");
            Ok(permission)
        }
        permission => Ok(permission),
    }
}

/// Shows `notification` if `settings` and the current permission allow it. Returns whether it
/// was shown.
pub async fn notify_if_enabled<N>(
    notifier: &N,
    settings: &Settings,
    notification: &Notification,
) -> Result<bool>
where
    N: Notifier + ?Sized,
{
    if !should_notify(settings, notifier.permission().await?) {
        return Ok(false);
    }
    notifier.notify(notification).await?;
    Ok(true)
}

/// Shows notifications in the log. The permission state is kept in `config.json`.
#[derive(Debug)]
pub struct LogNotifier {
    config: tokio::sync::Mutex<Config>,
}

impl LogNotifier {
    pub fn new(config: Config) -> Self {
        Self {
            config: tokio::sync::Mutex::new(config),
        }
    }
}

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    async fn permission(&self) -> Result<Permission> {
        Ok(self.config.lock().await.notification_permission())
    }

    async fn request_permission(&self) -> Result<Permission> {
        let permission = answer(std::env::var(NOTIFICATIONS_ENV).ok().as_deref());
        self.config
            .lock()
            .await
            .set_notification_permission(permission)
            .await?;
        Ok(permission)
    }

    async fn notify(&self, notification: &Notification) -> Result<()> {
        info!("🔔 {}: {}", notification.title, notification.body);
        Ok(())
    }
}

/// The answer to a permission request given the value of `NOTIFICATIONS_ENV`.
fn answer(value: Option<&str>) -> Permission {
    match value {
        Some(v) if v.trim().eq_ignore_ascii_case("deny") => Permission::Denied,
        _ => Permission::Granted,
    }
}

/// Records notifications in memory. Requests are answered with a preset permission.
#[derive(Debug)]
pub struct RecordingNotifier {
    state: Mutex<RecordingState>,
}

#[derive(Debug)]
struct RecordingState {
    permission: Permission,
    answer: Permission,
    requests: usize,
    sent: Vec<Notification>,
}

impl RecordingNotifier {
    /// A notifier in `permission` state that answers requests with `answer`.
    pub fn new(permission: Permission, answer: Permission) -> Self {
        Self {
            state: Mutex::new(RecordingState {
                permission,
                answer,
                requests: 0,
                sent: Vec::new(),
            }),
        }
    }

    pub fn requests(&self) -> Result<usize> {
        Ok(self.lock()?.requests)
    }

    pub fn sent(&self) -> Result<Vec<Notification>> {
        Ok(self.lock()?.sent.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, RecordingState>> {
        self.state.lock().map_err(|e| anyhow!("Lock poisoned: {e}"))
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn permission(&self) -> Result<Permission> {
        Ok(self.lock()?.permission)
    }

    async fn request_permission(&self) -> Result<Permission> {
        let mut state = self.lock()?;
        state.requests += 1;
        state.permission = state.answer;
        Ok(state.permission)
    }

    async fn notify(&self, notification: &Notification) -> Result<()> {
        self.lock()?.sent.push(notification.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Theme;

    #[test]
    fn test_should_notify() {
        let on = Settings::new(Theme::Default, true);
        let off = Settings::new(Theme::Default, false);
        assert!(should_notify(&on, Permission::Granted));
        assert!(!should_notify(&on, Permission::Denied));
        assert!(!should_notify(&on, Permission::Default));
        assert!(!should_notify(&off, Permission::Granted));
        assert!(!should_notify(&off, Permission::Denied));
    }

    #[test]
    fn test_transaction_added_message() {
        let t = Transaction::new(TransactionType::Expense, "1200", "Food", "2024-01-06").unwrap();
        let n = Notification::transaction_added(&t);
        assert_eq!(n.title, "New Expense Added");
        assert_eq!(n.body, "Food: ₹1200");
    }

    #[tokio::test]
    async fn test_permission_requested_once_from_default() {
        let notifier = RecordingNotifier::new(Permission::Default, Permission::Denied);
        assert_eq!(
            ensure_permission(&notifier).await.unwrap(),
            Permission::Denied
        );
        assert_eq!(
            ensure_permission(&notifier).await.unwrap(),
            Permission::Denied
        );
        assert_eq!(notifier.requests().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_granted_is_not_requested() {
        let notifier = RecordingNotifier::new(Permission::Granted, Permission::Denied);
        assert_eq!(
            ensure_permission(&notifier).await.unwrap(),
            Permission::Granted
        );
        assert_eq!(notifier.requests().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_notify_if_enabled() {
        let notifier = RecordingNotifier::new(Permission::Granted, Permission::Granted);
        let on = Settings::new(Theme::Dark, true);
        let off = Settings::new(Theme::Dark, false);
        let n = Notification::report_generated();
        assert!(notify_if_enabled(&notifier, &on, &n).await.unwrap());
        assert!(!notify_if_enabled(&notifier, &off, &n).await.unwrap());
        assert_eq!(notifier.sent().unwrap(), vec![n]);
    }

    #[test]
    fn test_permission_text() {
        assert_eq!(Permission::Granted.to_string(), "granted");
        assert_eq!("denied".parse::<Permission>().unwrap(), Permission::Denied);
    }

    #[test]
    fn test_answer_from_env_value() {
        assert_eq!(answer(None), Permission::Granted);
        assert_eq!(answer(Some("allow")), Permission::Granted);
        assert_eq!(answer(Some("deny")), Permission::Denied);
        assert_eq!(answer(Some(" DENY ")), Permission::Denied);
    }

    #[tokio::test]
    async fn test_log_notifier_saves_answer_in_config() {
        let dir = tempfile::TempDir::new().unwrap();
        let root = dir.path().join("budget");
        let origin = url::Url::parse("http://localhost:3000").unwrap();
        let config = Config::create(&root, None, origin).await.unwrap();
        let notifier = LogNotifier::new(config);
        let expected = answer(std::env::var(NOTIFICATIONS_ENV).ok().as_deref());

        assert_eq!(notifier.permission().await.unwrap(), Permission::Default);
        assert_eq!(ensure_permission(&notifier).await.unwrap(), expected);
        assert_eq!(notifier.permission().await.unwrap(), expected);

        let reloaded = Config::load(&root).await.unwrap();
        assert_eq!(reloaded.notification_permission(), expected);

        // A second notifier over the saved config does not ask again.
        let notifier = LogNotifier::new(reloaded);
        assert_eq!(ensure_permission(&notifier).await.unwrap(), expected);
    }
}
