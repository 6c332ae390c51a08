//! Rising Stars predictions and the Popular This Week list.

use poise::serenity_prelude as serenity;
use tracing::{error, info};

use crate::api::ApiError;
use crate::commands::{api_error_text, with_promo};
use crate::parse::parse_book_identifier;
use crate::{Context, Error};

/// Rising Stars outlook for a book
#[poise::command(slash_command, rename = "risingstars")]
pub async fn rising_stars(
    ctx: Context<'_>,
    #[description = "Book ID or fiction URL"] book: String,
) -> Result<(), Error> {
    ctx.defer().await?;
    info!("risingstars called by {} for '{}'", ctx.author().name, book);

    let book = match parse_book_identifier(&book) {
        Ok(book) => book,
        Err(e) => {
            ctx.say(e.to_string()).await?;
            return Ok(());
        }
    };

    match ctx.data().api.rising_stars_prediction(book.id).await {
        Ok(prediction) => {
            let percent = (prediction.probability * 100.0).clamp(0.0, 100.0);
            let mut embed = serenity::CreateEmbed::new()
                .title(format!("Rising Stars outlook: {}", prediction.title))
                .url(book.url.clone())
                .description(format!(
                    "Estimated chance of reaching Rising Stars: **{:.1}%**",
                    percent
                ))
                .color(if percent >= 50.0 { 0x2ecc71 } else { 0x95a5a6 });

            if let Some(days) = prediction.observed_days {
                embed = embed.field("Based on", format!("{} days of data", days), true);
            }
            if let Some(rank) = prediction.projected_rank {
                embed = embed.field("Projected peak", format!("#{}", rank), true);
            }
            if let Some(note) = &prediction.note {
                embed = embed.field("Note", note.as_str(), false);
            }

            let embed = with_promo(ctx.data(), embed);
            ctx.send(poise::CreateReply::default().embed(embed)).await?;
        }
        Err(e) => {
            if !matches!(e, ApiError::Rejected(_)) {
                error!("RS prediction for book {} failed: {}", book.id, e);
            }
            ctx.say(api_error_text(&e)).await?;
        }
    }

    Ok(())
}

/// Popular This Week
#[poise::command(slash_command)]
pub async fn ptw(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer().await?;
    info!("ptw called by {}", ctx.author().name);

    match ctx.data().api.popular_this_week().await {
        Ok(entries) if entries.is_empty() => {
            ctx.say("The Popular This Week list is empty right now.")
                .await?;
        }
        Ok(entries) => {
            let lines: Vec<String> = entries
                .iter()
                .take(10)
                .map(|entry| {
                    let title = match &entry.url {
                        Some(url) => format!("[{}]({})", entry.title, url),
                        None => entry.title.clone(),
                    };
                    format!(
                        "**#{}** {}: {} views this week",
                        entry.rank,
                        title,
                        format_count(entry.weekly_views)
                    )
                })
                .collect();

            let embed = serenity::CreateEmbed::new()
                .title("Popular This Week")
                .description(lines.join("\n"))
                .color(0xe67e22);
            let embed = with_promo(ctx.data(), embed);
            ctx.send(poise::CreateReply::default().embed(embed)).await?;
        }
        Err(e) => {
            if !matches!(e, ApiError::Rejected(_)) {
                error!("PTW fetch failed: {}", e);
            }
            ctx.say(api_error_text(&e)).await?;
        }
    }

    Ok(())
}

/// Thousands-separated count for list lines.
fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1234567), "1,234,567");
    }
}
