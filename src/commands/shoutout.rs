//! Shoutout campaigns: cross-promotion slots between authors.

use poise::serenity_prelude as serenity;
use tracing::{error, info};

use crate::api::ApiError;
use crate::commands::{api_error_text, with_promo};
use crate::parse::parse_book_identifier;
use crate::{Context, Error};

const DEFAULT_SLOTS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, poise::ChoiceParameter)]
pub enum ShoutoutAction {
    #[name = "create"]
    Create,
    #[name = "list"]
    List,
}

/// Create or browse shoutout campaigns
#[poise::command(slash_command)]
pub async fn shoutout(
    ctx: Context<'_>,
    #[description = "What to do"] action: ShoutoutAction,
    #[description = "Your book (required for create)"] book: Option<String>,
    #[description = "Number of promotional slots (default: 3)"]
    #[min = 1]
    #[max = 10]
    slots: Option<u32>,
    #[description = "Short pitch shown to other authors"] description: Option<String>,
) -> Result<(), Error> {
    ctx.defer().await?;
    info!("shoutout called by {} ({:?})", ctx.author().name, action);

    match action {
        ShoutoutAction::Create => {
            let Some(book) = book else {
                ctx.say("The create action needs a book ID or fiction URL.")
                    .await?;
                return Ok(());
            };
            let book = match parse_book_identifier(&book) {
                Ok(book) => book,
                Err(e) => {
                    ctx.say(e.to_string()).await?;
                    return Ok(());
                }
            };

            let result = ctx
                .data()
                .api
                .create_shoutout(
                    ctx.author().id.get(),
                    book.id,
                    slots.unwrap_or(DEFAULT_SLOTS),
                    description.as_deref(),
                )
                .await;

            match result {
                Ok(campaign) => {
                    let embed = serenity::CreateEmbed::new()
                        .title("Shoutout campaign created")
                        .description(format!(
                            "**{}** is offering **{}** promotional slots.",
                            campaign.title, campaign.slots_total
                        ))
                        .field("Campaign ID", campaign.id.to_string(), true)
                        .color(0x2ecc71);
                    let embed = with_promo(ctx.data(), embed);
                    ctx.send(poise::CreateReply::default().embed(embed)).await?;
                }
                Err(e) => {
                    if !matches!(e, ApiError::Rejected(_)) {
                        error!("Shoutout create for book {} failed: {}", book.id, e);
                    }
                    ctx.say(api_error_text(&e)).await?;
                }
            }
        }

        ShoutoutAction::List => match ctx.data().api.list_shoutouts().await {
            Ok(campaigns) if campaigns.is_empty() => {
                ctx.say("No open shoutout campaigns right now.").await?;
            }
            Ok(campaigns) => {
                let lines: Vec<String> = campaigns
                    .iter()
                    .take(10)
                    .map(|c| {
                        let mut line = format!(
                            "**#{}** {}: {}/{} slots open",
                            c.id, c.title, c.slots_open, c.slots_total
                        );
                        if let Some(owner) = &c.owner_name {
                            line.push_str(&format!(" (by {})", owner));
                        }
                        if let Some(description) = &c.description {
                            line.push_str(&format!("\n> {}", description));
                        }
                        line
                    })
                    .collect();

                let embed = serenity::CreateEmbed::new()
                    .title("Open shoutout campaigns")
                    .description(lines.join("\n"))
                    .color(0x9b59b6);
                let embed = with_promo(ctx.data(), embed);
                ctx.send(poise::CreateReply::default().embed(embed)).await?;
            }
            Err(e) => {
                if !matches!(e, ApiError::Rejected(_)) {
                    error!("Shoutout list failed: {}", e);
                }
                ctx.say(api_error_text(&e)).await?;
            }
        },
    }

    Ok(())
}
