//! Process-environment configuration.

use crate::error::{BotError, Result};

/// Runtime configuration loaded from the process environment.
///
/// The Discord token itself is read in `main` when the client is built.
#[derive(Clone)]
pub struct BotConfig {
    /// Base URL of the WordPress backend (no trailing slash needed).
    pub backend_base_url: String,

    /// Shared secret sent with every backend request.
    pub backend_token: String,

    /// Optional invite link shown in /help.
    pub support_invite: Option<String>,
}

impl BotConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            backend_base_url: require("BACKEND_BASE_URL")?,
            backend_token: require("BACKEND_API_TOKEN")?,
            support_invite: std::env::var("SUPPORT_INVITE_URL").ok(),
        })
    }
}

fn require(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| BotError::ConfigMissing {
        name: name.to_string(),
    })
}
