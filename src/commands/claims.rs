//! Claim commands: submission, cancellation and moderator processing.
//!
//! Batch operations report per-item outcomes; one book or claim failing
//! never aborts the rest of the batch.

use futures::future::join_all;
use poise::serenity_prelude as serenity;
use tracing::{debug, error, info};

use crate::api::{ApiError, Claim};
use crate::commands::{api_error_text, rejection_text, with_promo};
use crate::parse::{parse_book_batch, parse_book_identifier, parse_id_list};
use crate::{Context, Error};

/// Claim a book as yours
#[poise::command(slash_command)]
pub async fn claim(
    ctx: Context<'_>,
    #[description = "Book ID or fiction URL"] book: String,
) -> Result<(), Error> {
    // Acknowledge before any I/O so the interaction cannot expire.
    ctx.defer().await?;
    info!("claim called by {} for '{}'", ctx.author().name, book);

    let book = match parse_book_identifier(&book) {
        Ok(book) => book,
        Err(e) => {
            ctx.say(e.to_string()).await?;
            return Ok(());
        }
    };

    let server_id = ctx.guild_id().map(|g| g.get());
    let result = ctx
        .data()
        .api
        .submit_claim(ctx.author().id.get(), book.id, &book.url, server_id)
        .await;

    match result {
        Ok(claim) => {
            info!(
                "Claim #{} submitted by {} for book {}",
                claim.id,
                ctx.author().name,
                claim.book_id
            );
            let embed = serenity::CreateEmbed::new()
                .title("Claim submitted")
                .description(format!(
                    "Your claim for [book {}]({}) is **{}**.\nA moderator will review it.",
                    claim.book_id,
                    claim.book_url,
                    claim.status.as_str()
                ))
                .field("Claim ID", claim.id.to_string(), true)
                .color(0x2ecc71);
            let embed = with_promo(ctx.data(), embed);
            ctx.send(poise::CreateReply::default().embed(embed)).await?;
        }
        Err(e) => {
            if !matches!(e, ApiError::Rejected(_)) {
                error!("Claim submit failed for book {}: {}", book.id, e);
            }
            ctx.say(api_error_text(&e)).await?;
        }
    }

    Ok(())
}

/// Claim several books at once (up to 5)
#[poise::command(slash_command, rename = "claimmultiple")]
pub async fn claim_multiple(
    ctx: Context<'_>,
    #[description = "Up to 5 book IDs or URLs, separated by commas or spaces"] books: String,
) -> Result<(), Error> {
    ctx.defer().await?;
    info!("claimmultiple called by {} with '{}'", ctx.author().name, books);

    // Oversized batches are rejected here, before any submission goes out.
    let books = match parse_book_batch(&books) {
        Ok(books) => books,
        Err(e) => {
            ctx.say(e.to_string()).await?;
            return Ok(());
        }
    };

    let discord_id = ctx.author().id.get();
    let server_id = ctx.guild_id().map(|g| g.get());
    let api = &ctx.data().api;

    let submissions = books
        .iter()
        .map(|book| api.submit_claim(discord_id, book.id, &book.url, server_id));
    let results = join_all(submissions).await;

    let items: Vec<(u64, Result<Claim, ApiError>)> = books
        .iter()
        .map(|book| book.id)
        .zip(results)
        .collect();

    for (book_id, outcome) in &items {
        if let Err(e) = outcome {
            if !matches!(e, ApiError::Rejected(_)) {
                error!("Batch claim for book {} failed: {}", book_id, e);
            }
        }
    }

    let embed = serenity::CreateEmbed::new()
        .title("Claim submissions")
        .description(batch_submit_report(&items))
        .color(0x3498db);
    let embed = with_promo(ctx.data(), embed);
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}

/// Cancel one of your pending claims
#[poise::command(slash_command)]
pub async fn unclaim(
    ctx: Context<'_>,
    #[description = "Claim ID to cancel"] claim_id: u64,
) -> Result<(), Error> {
    ctx.defer().await?;
    info!("unclaim called by {} for claim {}", ctx.author().name, claim_id);

    match ctx
        .data()
        .api
        .cancel_claim(claim_id, ctx.author().id.get())
        .await
    {
        Ok(claim) => {
            ctx.say(format!(
                "Claim #{} for book {} is now **{}**.",
                claim.id,
                claim.book_id,
                claim.status.as_str()
            ))
            .await?;
        }
        Err(e) => {
            if !matches!(e, ApiError::Rejected(_)) {
                error!("Cancel of claim {} failed: {}", claim_id, e);
            }
            ctx.say(api_error_text(&e)).await?;
        }
    }

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, poise::ChoiceParameter)]
pub enum ClaimAction {
    #[name = "approve"]
    Approve,
    #[name = "decline"]
    Decline,
}

impl ClaimAction {
    pub fn as_str(self) -> &'static str {
        match self {
            ClaimAction::Approve => "approve",
            ClaimAction::Decline => "decline",
        }
    }
}

/// Approve or decline claims (moderators)
#[poise::command(slash_command, rename = "processclaim", guild_only)]
pub async fn process_claim(
    ctx: Context<'_>,
    #[description = "Claim IDs, comma or space separated"] ids: String,
    #[description = "What to do with them"] action: ClaimAction,
) -> Result<(), Error> {
    ctx.defer().await?;
    info!(
        "processclaim called by {} ({}) on '{}'",
        ctx.author().name,
        action.as_str(),
        ids
    );

    let ids = match parse_id_list(&ids) {
        Ok(ids) => ids,
        Err(e) => {
            ctx.say(e.to_string()).await?;
            return Ok(());
        }
    };

    let moderator_id = ctx.author().id.get();
    let server_id = ctx.guild_id().map(|g| g.get());
    let api = &ctx.data().api;

    // Each id is processed independently; one failure must not stop the rest.
    let transitions = ids
        .iter()
        .map(|&id| api.process_claim(id, action.as_str(), moderator_id, server_id));
    let results = join_all(transitions).await;

    let items: Vec<(u64, Result<Claim, ApiError>)> =
        ids.iter().copied().zip(results).collect();

    for (claim_id, outcome) in &items {
        match outcome {
            Ok(claim) if action == ClaimAction::Approve => {
                notify_claimant(&ctx, claim);
                info!("Claim {} approved by {}", claim_id, ctx.author().name);
            }
            Ok(_) => info!("Claim {} declined by {}", claim_id, ctx.author().name),
            Err(e) => {
                if !matches!(e, ApiError::Rejected(_)) {
                    error!("Processing claim {} failed: {}", claim_id, e);
                }
            }
        }
    }

    let embed = serenity::CreateEmbed::new()
        .title(match action {
            ClaimAction::Approve => "Claim approvals",
            ClaimAction::Decline => "Claim declines",
        })
        .description(batch_process_report(&items, action))
        .color(0x3498db);
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}

/// List this server's pending claims (moderators)
#[poise::command(slash_command, rename = "pendingclaims", guild_only)]
pub async fn pending_claims(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer().await?;
    info!("pendingclaims called by {}", ctx.author().name);

    let server_id = ctx.guild_id().map(|g| g.get());
    match ctx.data().api.list_claims(None, server_id, Some("pending")).await {
        Ok(claims) if claims.is_empty() => {
            ctx.say("No pending claims for this server.").await?;
        }
        Ok(claims) => {
            let lines: Vec<String> = claims
                .iter()
                .take(20)
                .map(|c| {
                    format!(
                        "**#{}** <@{}> claims [book {}]({})",
                        c.id, c.discord_id, c.book_id, c.book_url
                    )
                })
                .collect();
            let embed = serenity::CreateEmbed::new()
                .title(format!("Pending claims ({})", claims.len()))
                .description(lines.join("\n"))
                .color(0xf1c40f);
            ctx.send(poise::CreateReply::default().embed(embed)).await?;
        }
        Err(e) => {
            if !matches!(e, ApiError::Rejected(_)) {
                error!("Listing pending claims failed: {}", e);
            }
            ctx.say(api_error_text(&e)).await?;
        }
    }

    Ok(())
}

/// Best-effort DM to the claimant after an approval.
///
/// Detached on purpose: DMs can be closed and the moderator's reply must
/// not wait on (or fail with) the notification.
fn notify_claimant(ctx: &Context<'_>, claim: &Claim) {
    let Ok(user_id) = claim.discord_id.parse::<u64>() else {
        debug!("Claim {} has a non-numeric discord_id, skipping DM", claim.id);
        return;
    };

    let http = ctx.serenity_context().http.clone();
    let message = format!(
        "Your claim for <{}> was approved. Welcome aboard!",
        claim.book_url
    );

    tokio::spawn(async move {
        match serenity::UserId::new(user_id).create_dm_channel(&http).await {
            Ok(channel) => {
                if let Err(e) = channel
                    .send_message(&http, serenity::CreateMessage::new().content(message))
                    .await
                {
                    debug!("Could not DM user {}: {}", user_id, e);
                }
            }
            Err(e) => debug!("Could not open DM channel for user {}: {}", user_id, e),
        }
    });
}

fn batch_submit_report(items: &[(u64, Result<Claim, ApiError>)]) -> String {
    items
        .iter()
        .map(|(book_id, outcome)| match outcome {
            Ok(claim) => format!("✅ Book {}: claim #{} submitted", book_id, claim.id),
            Err(ApiError::Timeout) => format!(
                "⏱️ Book {}: request timed out, the claim may not have been submitted",
                book_id
            ),
            Err(ApiError::Rejected(rejection)) => {
                format!("❌ Book {}: {}", book_id, rejection_text(rejection))
            }
            Err(_) => format!("❌ Book {}: backend request failed, try again later", book_id),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn batch_process_report(items: &[(u64, Result<Claim, ApiError>)], action: ClaimAction) -> String {
    let verb = match action {
        ClaimAction::Approve => "approved",
        ClaimAction::Decline => "declined",
    };
    items
        .iter()
        .map(|(claim_id, outcome)| match outcome {
            Ok(claim) => format!("✅ Claim {}: {} (book {})", claim_id, verb, claim.book_id),
            Err(ApiError::Timeout) => {
                format!("⏱️ Claim {}: request timed out, state unknown", claim_id)
            }
            Err(ApiError::Rejected(rejection)) => {
                format!("❌ Claim {}: {}", claim_id, rejection_text(rejection))
            }
            Err(_) => format!("❌ Claim {}: backend request failed", claim_id),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ClaimStatus, Rejection};

    fn pending_claim(id: u64, book_id: u64) -> Claim {
        Claim {
            id,
            discord_id: "111".to_string(),
            book_id,
            book_url: format!("https://www.royalroad.com/fiction/{}", book_id),
            status: ClaimStatus::Pending,
            title: None,
            server_id: None,
            moderator: None,
        }
    }

    #[test]
    fn test_batch_report_partial_timeout() {
        let items = vec![
            (1_u64, Ok(pending_claim(10, 1))),
            (2_u64, Err(ApiError::Timeout)),
            (3_u64, Ok(pending_claim(11, 3))),
        ];
        let report = batch_submit_report(&items);

        assert_eq!(report.matches('✅').count(), 2);
        assert!(report.contains("Book 2: request timed out"));
        // The timeout line must not read like a generic failure
        assert!(!report.contains("Book 2: backend request failed"));
    }

    #[test]
    fn test_batch_report_rejection_is_itemized() {
        let items = vec![
            (1_u64, Ok(pending_claim(10, 1))),
            (
                2_u64,
                Err(ApiError::Rejected(Rejection {
                    code: "already_claimed".to_string(),
                    message: None,
                    owner_name: Some("Alice".to_string()),
                })),
            ),
        ];
        let report = batch_submit_report(&items);
        assert!(report.contains("claim #10 submitted"));
        assert!(report.contains("Alice"));
    }

    #[test]
    fn test_process_report_uses_action_verb() {
        let items = vec![(7_u64, Ok(pending_claim(7, 42)))];
        assert!(batch_process_report(&items, ClaimAction::Approve).contains("approved"));
        assert!(batch_process_report(&items, ClaimAction::Decline).contains("declined"));
    }
}
