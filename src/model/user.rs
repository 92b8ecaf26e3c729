use crate::Result;
use anyhow::bail;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// The single registered user of this device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    name: String,
    email: String,
    password_hash: String,
}

impl User {
    /// Validates the registration form and builds a `User` with a hashed password. All fields are
    /// trimmed and required.
    pub fn register(name: &str, email: &str, password: &str) -> Result<Self> {
        let name = name.trim();
        let email = email.trim();
        let password = password.trim();
        if name.is_empty() || email.is_empty() || password.is_empty() {
            bail!("All fields are required.");
        }
        Ok(Self {
            name: name.to_string(),
            email: email.to_string(),
            password_hash: hash_password(password),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Whether `email` and `password` identify this user.
    pub fn verify(&self, email: &str, password: &str) -> bool {
        self.email == email.trim() && self.password_hash == hash_password(password.trim())
    }
}

/// Lowercase hex SHA-256 of the password.
fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}
