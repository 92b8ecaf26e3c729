use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;
use url::Url;

/// Creates the home directory and an initial `config.json`.
///
/// # Arguments
/// - `budget_home` - The directory that will be the home directory, e.g. `$HOME/budget`
/// - `api_url` - The base URL of the remote transaction service, if there is one.
/// - `origin` - The origin the application assets are served from.
///
/// # Errors
/// - Returns an error if the config already exists or any file operation fails.
pub async fn init(budget_home: &Path, api_url: Option<&Url>, origin: &Url) -> Result<Out<()>> {
    let config = Config::create(budget_home, api_url.cloned(), origin.clone())
        .await
        .context("Unable to create the budget home directory and config")
        .pub_result(ErrorType::Config)?;
    let message = match config.api_url() {
        Some(url) => format!(
            "Created {}, transactions will be sent to {url}",
            config.root().display()
        ),
        None => format!(
            "Created {}, transactions will be kept on this device",
            config.root().display()
        ),
    };
    Ok(message.into())
}

#[tokio::test]
async fn test_init() {
    let dir = tempfile::TempDir::new().unwrap();
    let home = dir.path().join("budget");
    let origin = Url::parse("https://budget.example.com").unwrap();
    let out = init(&home, None, &origin).await.unwrap();
    assert!(out.message().contains("kept on this device"));
    assert!(home.join("config.json").is_file());

    let e = init(&home, None, &origin).await.unwrap_err();
    assert_eq!(crate::error::error_type(&e), Some(ErrorType::Config));
}
