//! The durable store: a small key-value store that survives restarts and acts as the local mirror
//! of the user's data.
//!
//! Values are JSON text. Consumers must tolerate missing keys on first run, so typed reads return
//! `Option`.

mod file;
mod memory;

use crate::Result;
use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Key of the registered user record.
pub const USER: &str = "user";
/// Key of the settings record.
pub const SETTINGS: &str = "settings";
/// Key of the ordered transaction list.
pub const TRANSACTIONS: &str = "transactions";
/// Key of the session marker. Its presence means someone is logged in.
pub const LOGGED_IN_USER: &str = "loggedInUser";

/// A durable key-value store. There is no locking across processes; concurrent writers clobber
/// each other and the last write wins.
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    /// Returns the value stored under `key`, or `None` if the key is absent.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: String) -> Result<()>;

    /// Removes `key`. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Removes every key.
    async fn clear(&self) -> Result<()>;
}

/// Reads and decodes the JSON value stored under `key`.
pub async fn get_json<T, S>(store: &S, key: &str) -> Result<Option<T>>
where
    T: DeserializeOwned,
    S: Store + ?Sized,
{
    match store.get(key).await? {
        None => Ok(None),
        Some(json) => serde_json::from_str(&json)
            .map(Some)
            .with_context(|| format!("The stored value for '{key}' is not valid")),
    }
}

/// Encodes `value` as JSON and stores it under `key`.
pub async fn set_json<T, S>(store: &S, key: &str, value: &T) -> Result<()>
where
    T: Serialize + ?Sized + Sync,
    S: Store + ?Sized,
{
    let json = serde_json::to_string(value)
        .with_context(|| format!("Unable to serialize the value for '{key}'"))?;
    store.set(key, json).await
}
