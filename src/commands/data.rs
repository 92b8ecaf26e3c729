use crate::commands::{App, Out};
use crate::error::{ErrorType, IntoResult};
use crate::Result;

/// Wipes the whole local store: account, session, settings and transactions. Transactions held by
/// the remote service are not touched.
pub async fn clear(app: &App) -> Result<Out<()>> {
    app.require_session().await?;
    app.gateway()
        .clear_all()
        .await
        .pub_result(ErrorType::Storage)?;
    Ok("All data cleared!".into())
}

/// Wipes the locally stored transactions only.
pub async fn reset(app: &App) -> Result<Out<()>> {
    app.require_session().await?;
    app.gateway()
        .reset_transactions()
        .await
        .pub_result(ErrorType::Storage)?;
    Ok("Local transactions deleted.".into())
}
