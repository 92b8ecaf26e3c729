use crate::commands::{App, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::User;
use crate::Result;
use anyhow::anyhow;
use tracing::debug;

/// Creates the user of this device, replacing any existing one.
pub async fn register(app: &App, name: &str, email: &str, password: &str) -> Result<Out<()>> {
    let user = User::register(name, email, password).pub_result(ErrorType::Validation)?;
    app.gateway()
        .save_user(&user)
        .await
        .pub_result(ErrorType::Storage)?;
    debug!("Registered {}", user.email());
    Ok("Registration successful! You can now log in.".into())
}

/// Starts a session if `email` and `password` match the registered user.
pub async fn login(app: &App, email: &str, password: &str) -> Result<Out<()>> {
    if email.trim().is_empty() || password.trim().is_empty() {
        return Err(anyhow!("Please enter both username and password."))
            .pub_result(ErrorType::Validation);
    }
    let gateway = app.gateway();
    let user = gateway.load_user().await.pub_result(ErrorType::Storage)?;
    match user {
        Some(user) if user.verify(email, password) => {
            gateway
                .set_session(user.email())
                .await
                .pub_result(ErrorType::Storage)?;
            Ok(format!("Login successful! Welcome, {}.", user.name()).into())
        }
        _ => Err(anyhow!("Invalid username or password.")).pub_result(ErrorType::Validation),
    }
}

/// Ends the session. Everything in the local store is wiped, not just the session.
pub async fn logout(app: &App) -> Result<Out<()>> {
    app.gateway()
        .clear_all()
        .await
        .pub_result(ErrorType::Storage)?;
    Ok("Logged out successfully!".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::error_type;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_register_and_login() {
        let env = TestEnv::new().await;
        let app = env.app();
        register(app, " Asha ", "asha@example.com", "secret")
            .await
            .unwrap();

        let e = login(app, "asha@example.com", "wrong").await.unwrap_err();
        assert_eq!(e.root_cause().to_string(), "Invalid username or password.");
        assert_eq!(error_type(&e), Some(ErrorType::Validation));
        assert_eq!(app.gateway().session().await.unwrap(), None);

        let out = login(app, "asha@example.com", "secret").await.unwrap();
        assert!(out.message().contains("Asha"));
        assert_eq!(
            app.gateway().session().await.unwrap().as_deref(),
            Some("asha@example.com")
        );
    }

    #[tokio::test]
    async fn test_register_requires_all_fields() {
        let env = TestEnv::new().await;
        let e = register(env.app(), "Asha", "  ", "secret")
            .await
            .unwrap_err();
        assert_eq!(error_type(&e), Some(ErrorType::Validation));
        assert!(env.app().gateway().load_user().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_login_without_user() {
        let env = TestEnv::new().await;
        assert!(login(env.app(), "a@example.com", "x").await.is_err());
        let e = login(env.app(), "", "x").await.unwrap_err();
        assert_eq!(
            e.root_cause().to_string(),
            "Please enter both username and password."
        );
    }

    #[tokio::test]
    async fn test_logout_wipes_everything() {
        let env = TestEnv::logged_in().await;
        logout(env.app()).await.unwrap();
        let gateway = env.app().gateway();
        assert_eq!(gateway.session().await.unwrap(), None);
        assert!(gateway.load_user().await.unwrap().is_none());
    }
}
