pub mod claims;
pub mod essence;
pub mod general;
pub mod moderation;
pub mod rising_stars;
pub mod shoutout;
pub mod stats;

pub use claims::{claim, claim_multiple, pending_claims, process_claim, unclaim};
pub use essence::essence;
pub use general::{help, ping};
pub use moderation::{addmod, removemod, verifyserver};
pub use rising_stars::{ptw, rising_stars};
pub use shoutout::shoutout;
pub use stats::bookstats;

use poise::serenity_prelude as serenity;

use crate::api::{ApiError, Rejection};
use crate::Data;

/// Attach the next promotional footer line, if any are configured.
pub(crate) fn with_promo(data: &Data, embed: serenity::CreateEmbed) -> serenity::CreateEmbed {
    match data.promo.next() {
        Some(promo) => embed.footer(serenity::CreateEmbedFooter::new(promo)),
        None => embed,
    }
}

/// Map a structured backend rejection to the message the user sees.
///
/// Codes the bot knows get a specific message; anything else falls back to
/// the backend's own text, then to the raw code.
pub(crate) fn rejection_text(rejection: &Rejection) -> String {
    match rejection.code.as_str() {
        "already_claimed" => format!(
            "This book is already claimed by **{}**.",
            rejection.owner_name.as_deref().unwrap_or("another user")
        ),
        "pending_exists" => "You already have a pending claim for this book.".to_string(),
        "not_found" => "This book is not tracked. Check the ID or URL.".to_string(),
        "not_your_claim" => "That claim does not belong to you.".to_string(),
        "already_processed" => "That claim has already been processed.".to_string(),
        "insufficient_permission" => {
            "You are not a verified moderator on this server.".to_string()
        }
        "server_not_verified" => {
            "This server is not verified. A supermod must run /verifyserver first.".to_string()
        }
        _ => rejection.message.clone().unwrap_or_else(|| {
            format!("The backend declined the request ({}).", rejection.code)
        }),
    }
}

/// User-facing text for any backend call outcome that is not a success.
/// Timeouts get their own wording; everything else is a generic retry-later.
pub(crate) fn api_error_text(err: &ApiError) -> String {
    match err {
        ApiError::Rejected(rejection) => rejection_text(rejection),
        ApiError::Timeout => {
            "The backend took too long to respond. Please try again later.".to_string()
        }
        _ => "Something went wrong talking to the backend. Please try again later.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_claimed_names_the_owner() {
        let rejection = Rejection {
            code: "already_claimed".to_string(),
            message: None,
            owner_name: Some("Alice".to_string()),
        };
        let text = rejection_text(&rejection);
        assert!(text.contains("Alice"));
    }

    #[test]
    fn test_already_claimed_without_owner_still_reads() {
        let rejection = Rejection {
            code: "already_claimed".to_string(),
            message: None,
            owner_name: None,
        };
        assert!(rejection_text(&rejection).contains("another user"));
    }

    #[test]
    fn test_unknown_code_falls_back_to_backend_message() {
        let rejection = Rejection {
            code: "quota_exceeded".to_string(),
            message: Some("Daily limit reached".to_string()),
            owner_name: None,
        };
        assert_eq!(rejection_text(&rejection), "Daily limit reached");
    }

    #[test]
    fn test_timeout_text_is_distinct_from_generic() {
        let timeout = api_error_text(&ApiError::Timeout);
        let generic = api_error_text(&ApiError::Status(reqwest::StatusCode::BAD_GATEWAY));
        assert_ne!(timeout, generic);
        assert!(timeout.contains("too long"));
    }
}
