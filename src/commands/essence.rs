//! Essence combinations: combine two tags and see what comes out.

use futures::Stream;
use poise::serenity_prelude as serenity;
use tracing::{error, info};

use crate::api::{ApiError, Rarity};
use crate::commands::{api_error_text, with_promo};
use crate::error::BotError;
use crate::tags;
use crate::{Context, Error};

async fn autocomplete_tag<'a>(
    _ctx: Context<'_>,
    partial: &'a str,
) -> impl Stream<Item = String> + 'a {
    futures::stream::iter(tags::suggestions(partial).into_iter().map(String::from))
}

/// Combine two tags into an essence
#[poise::command(slash_command)]
pub async fn essence(
    ctx: Context<'_>,
    #[description = "First tag"]
    #[autocomplete = "autocomplete_tag"]
    first: String,
    #[description = "Second tag"]
    #[autocomplete = "autocomplete_tag"]
    second: String,
) -> Result<(), Error> {
    ctx.defer().await?;
    info!(
        "essence called by {} with '{}' + '{}'",
        ctx.author().name,
        first,
        second
    );

    let Some(first) = tags::normalize(&first) else {
        ctx.say(unknown_tag_message(&first)).await?;
        return Ok(());
    };
    let Some(second) = tags::normalize(&second) else {
        ctx.say(unknown_tag_message(&second)).await?;
        return Ok(());
    };
    if first == second {
        ctx.say("Pick two different tags.").await?;
        return Ok(());
    }

    // The backend sorts the pair before lookup, so argument order is free.
    let result = ctx
        .data()
        .api
        .essence_combine(first, second, ctx.author().id.get())
        .await;

    match result {
        Ok(combo) => {
            let mut embed = serenity::CreateEmbed::new()
                .title(combo.combination_name.clone())
                .description(format!(
                    "**{}** + **{}** = **{}**",
                    combo.first_tag, combo.second_tag, combo.combination_name
                ))
                .field("Rarity", combo.rarity.as_str(), true)
                .field("Books", combo.book_count.to_string(), true)
                .color(rarity_color(combo.rarity));

            if let Some(discovered_by) = &combo.discovered_by {
                embed = embed.field("First discovered by", discovered_by.as_str(), true);
            }
            if !combo.example_books.is_empty() {
                let lines: Vec<String> = combo
                    .example_books
                    .iter()
                    .take(5)
                    .map(|b| match &b.url {
                        Some(url) => format!("[{}]({})", b.title, url),
                        None => b.title.clone(),
                    })
                    .collect();
                embed = embed.field("Examples", lines.join("\n"), false);
            }

            let embed = with_promo(ctx.data(), embed);
            ctx.send(poise::CreateReply::default().embed(embed)).await?;
        }
        Err(e) => {
            if !matches!(e, ApiError::Rejected(_)) {
                error!("Essence combine '{}'+'{}' failed: {}", first, second, e);
            }
            ctx.say(api_error_text(&e)).await?;
        }
    }

    Ok(())
}

fn unknown_tag_message(input: &str) -> String {
    let mut message = BotError::UnknownTag {
        input: input.trim().to_string(),
    }
    .to_string();
    message.push('.');
    let close = tags::suggestions(input);
    if !close.is_empty() {
        let listed: Vec<String> = close.iter().take(3).map(|t| format!("`{}`", t)).collect();
        message.push_str(&format!(" Did you mean: {}?", listed.join(", ")));
    }
    message
}

fn rarity_color(rarity: Rarity) -> u32 {
    match rarity {
        Rarity::Common => 0x95a5a6,
        Rarity::Uncommon => 0x2ecc71,
        Rarity::Rare => 0x3498db,
        Rarity::Epic => 0x9b59b6,
        Rarity::Legendary => 0xf1c40f,
        Rarity::Mythic => 0xe74c3c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_tag_message_suggests_close_tags() {
        let message = unknown_tag_message("fanta");
        assert!(message.contains("Unknown tag"));
        assert!(message.contains("Fantasy"));
    }

    #[test]
    fn test_unknown_tag_message_without_suggestions() {
        let message = unknown_tag_message("zzzzzz");
        assert!(message.contains("Unknown tag"));
        assert!(!message.contains("Did you mean"));
    }

    #[test]
    fn test_rarity_colors_are_distinct() {
        let colors = [
            rarity_color(Rarity::Common),
            rarity_color(Rarity::Uncommon),
            rarity_color(Rarity::Rare),
            rarity_color(Rarity::Epic),
            rarity_color(Rarity::Legendary),
            rarity_color(Rarity::Mythic),
        ];
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
