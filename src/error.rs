use thiserror::Error;

use crate::api::ApiError;
use crate::charts::ChartError;

#[derive(Error, Debug)]
pub enum BotError {
    // User input errors; shown to the user, never logged as errors
    #[error("`{input}` is not a book ID or a fiction URL")]
    InvalidBook { input: String },

    #[error("`{token}` is not a numeric ID")]
    InvalidId { token: String },

    #[error("No valid IDs found in `{input}`")]
    EmptyIdList { input: String },

    #[error("Too many books: {given} given, the limit is {limit}")]
    BatchTooLarge { given: usize, limit: usize },

    #[error("Unknown tag: `{input}`")]
    UnknownTag { input: String },

    // Configuration errors
    #[error("Missing environment variable: {name}")]
    ConfigMissing { name: String },

    // Backend errors
    #[error("Backend API error: {0}")]
    Api(#[from] ApiError),

    // Rendering errors
    #[error("Chart rendering failed: {0}")]
    Chart(#[from] ChartError),

    // Discord errors
    #[error("Discord API error: {message}")]
    Discord { message: String },
}

impl BotError {
    /// User input errors are reported back verbatim and not logged as errors.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            BotError::InvalidBook { .. }
                | BotError::InvalidId { .. }
                | BotError::EmptyIdList { .. }
                | BotError::BatchTooLarge { .. }
                | BotError::UnknownTag { .. }
        )
    }
}

impl From<serenity::Error> for BotError {
    fn from(err: serenity::Error) -> Self {
        BotError::Discord {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BotError>;

use poise::serenity_prelude as serenity;
