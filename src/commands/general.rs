use poise::serenity_prelude as serenity;
use tracing::info;

use crate::commands::with_promo;
use crate::{Context, Error};

/// Check if the bot is running
#[poise::command(slash_command)]
pub async fn ping(ctx: Context<'_>) -> Result<(), Error> {
    info!("Ping command called by {}", ctx.author().name);
    ctx.send(
        poise::CreateReply::default()
            .content("Pong! Bot is working!")
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

/// Show help information
#[poise::command(slash_command)]
pub async fn help(ctx: Context<'_>) -> Result<(), Error> {
    let mut embed = serenity::CreateEmbed::new()
        .title("Bot Commands")
        .description("Available commands:")
        .field("/claim", "Claim a book as yours (ID or fiction URL)", false)
        .field("/claimmultiple", "Claim up to 5 books at once", false)
        .field("/unclaim", "Cancel one of your pending claims", false)
        .field("/processclaim", "Approve or decline claims (moderators)", false)
        .field("/pendingclaims", "List this server's pending claims (moderators)", false)
        .field("/bookstats", "Chart a book's followers, views or rating", false)
        .field("/essence", "Combine two tags and see what you get", false)
        .field("/risingstars", "Rising Stars outlook for a book", false)
        .field("/ptw", "Popular This Week", false)
        .field("/shoutout", "Create or browse shoutout campaigns", false)
        .color(0x3498db);

    if let Some(invite) = &ctx.data().config.support_invite {
        embed = embed.field("Support", invite.as_str(), false);
    }
    let embed = with_promo(ctx.data(), embed);

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}
