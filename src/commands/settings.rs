use crate::commands::{App, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::{Settings, Theme};
use crate::notify::{ensure_permission, Notification, Permission, BLOCKED_MESSAGE};
use crate::Result;
use tracing::warn;

/// Shows the settings, or replaces them when `theme` or `notifications` is given.
///
/// Turning notifications on asks for permission the first time. A denial does not undo the
/// change; it is only reported.
pub async fn settings(
    app: &App,
    theme: Option<Theme>,
    notifications: Option<bool>,
) -> Result<Out<Settings>> {
    app.require_session().await?;
    let gateway = app.gateway();
    let current = gateway.load_settings().await.pub_result(ErrorType::Storage)?;
    if theme.is_none() && notifications.is_none() {
        let message = format!(
            "Theme: {}\nNotifications: {}",
            current.theme,
            if current.notifications { "on" } else { "off" }
        );
        return Ok(Out::new(message, current));
    }

    let updated = Settings::new(
        theme.unwrap_or(current.theme),
        notifications.unwrap_or(current.notifications),
    );
    gateway
        .save_settings(&updated)
        .await
        .pub_result(ErrorType::Storage)?;

    let mut message = String::from("Settings saved successfully!");
    if updated.notifications {
        match enable_notifications(app).await {
            Ok(Permission::Denied) => {
                message.push('\n');
                message.push_str(BLOCKED_MESSAGE);
            }
            Ok(_) => {}
            Err(e) => warn!("Unable to enable notifications: {e:#}"),
        }
    }
    Ok(Out::new(message, updated))
}

async fn enable_notifications(app: &App) -> Result<Permission> {
    let notifier = app.notifier();
    let permission = ensure_permission(notifier).await?;
    if permission == Permission::Granted {
        notifier.notify(&Notification::enabled()).await?;
    }
    Ok(permission)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_show_defaults() {
        let env = TestEnv::logged_in().await;
        let out = settings(env.app(), None, None).await.unwrap();
        assert_eq!(out.structure(), Some(&Settings::default()));
        assert!(out.message().contains("Notifications: off"));
    }

    #[tokio::test]
    async fn test_change_theme_keeps_notifications() {
        let env = TestEnv::logged_in().await;
        settings(env.app(), None, Some(false)).await.unwrap();
        let out = settings(env.app(), Some(Theme::Cool), None).await.unwrap();
        assert_eq!(out.structure(), Some(&Settings::new(Theme::Cool, false)));
        assert_eq!(
            env.app().gateway().load_settings().await.unwrap(),
            Settings::new(Theme::Cool, false)
        );
        assert_eq!(env.notifier().requests().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_enable_notifications_granted() {
        let env = TestEnv::logged_in().await;
        let out = settings(env.app(), None, Some(true)).await.unwrap();
        assert_eq!(out.message(), "Settings saved successfully!");
        assert_eq!(env.notifier().requests().unwrap(), 1);
        assert_eq!(env.notifier().sent().unwrap(), vec![Notification::enabled()]);
    }

    #[tokio::test]
    async fn test_enable_notifications_denied() {
        let env = TestEnv::with_permission(Permission::Default, Permission::Denied).await;
        env.login().await;
        let out = settings(env.app(), Some(Theme::Dark), Some(true))
            .await
            .unwrap();
        assert!(out.message().ends_with(BLOCKED_MESSAGE));
        // Saved anyway
        assert!(env.app().gateway().load_settings().await.unwrap().notifications);

        // Never asked again
        settings(env.app(), None, Some(true)).await.unwrap();
        assert_eq!(env.notifier().requests().unwrap(), 1);
        assert!(env.notifier().sent().unwrap().is_empty());
    }
}
