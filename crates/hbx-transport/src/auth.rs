//! Basic Auth credential material.
//!
//! The password is zeroized on drop and redacted from `Debug` output;
//! only the username ever appears in logs and error messages.

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Default username/password shipped by the Hummingbot API.
pub const DEFAULT_USERNAME: &str = "admin";
pub const DEFAULT_PASSWORD: &str = "admin";

/// Environment variables consulted by [`Credentials::from_env`].
pub const ENV_USERNAME: &str = "HUMMINGBOT_USERNAME";
pub const ENV_PASSWORD: &str = "HUMMINGBOT_PASSWORD";

/// Zeroized password wrapper.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
struct Password(String);

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// HTTP Basic Auth credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
    username: String,
    password: Password,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Password(password.into()),
        }
    }

    /// Read credentials from `HUMMINGBOT_USERNAME` / `HUMMINGBOT_PASSWORD`,
    /// falling back to the API's shipped defaults.
    pub fn from_env() -> Self {
        Self::new(
            std::env::var(ENV_USERNAME).unwrap_or_else(|_| DEFAULT_USERNAME.to_string()),
            std::env::var(ENV_PASSWORD).unwrap_or_else(|_| DEFAULT_PASSWORD.to_string()),
        )
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Password in the clear, for request signing only. Never log this.
    pub fn password(&self) -> &str {
        &self.password.0
    }

    /// Identity string safe for logs: username with the password masked.
    pub fn masked(&self) -> String {
        format!("{}:***", self.username)
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::new(DEFAULT_USERNAME, DEFAULT_PASSWORD)
    }
}
