//! Moderator and server-verification commands.
//!
//! Permission decisions are the backend's; these handlers only relay the
//! request and translate rejections.

use poise::serenity_prelude as serenity;
use tracing::{error, info};

use crate::api::{ApiError, ModRole};
use crate::commands::api_error_text;
use crate::{Context, Error};

fn role_name(role: ModRole) -> &'static str {
    match role {
        ModRole::Moderator => "moderator",
        ModRole::Supermod => "supermod",
    }
}

/// Add a claim moderator for this server
#[poise::command(slash_command, guild_only)]
pub async fn addmod(
    ctx: Context<'_>,
    #[description = "User to make a moderator"] user: serenity::User,
    #[description = "Grant supermod instead of regular moderator"] supermod: Option<bool>,
) -> Result<(), Error> {
    ctx.defer().await?;
    info!(
        "addmod called by {} for {} (supermod: {:?})",
        ctx.author().name,
        user.name,
        supermod
    );

    let Some(guild_id) = ctx.guild_id() else {
        ctx.say("This command only works in a server.").await?;
        return Ok(());
    };

    let result = ctx
        .data()
        .api
        .add_moderator(
            guild_id.get(),
            user.id.get(),
            ctx.author().id.get(),
            supermod.unwrap_or(false),
        )
        .await;

    match result {
        Ok(record) => {
            ctx.say(format!(
                "<@{}> is now a **{}** on this server.",
                record.discord_id,
                role_name(record.role)
            ))
            .await?;
        }
        Err(e) => {
            if !matches!(e, ApiError::Rejected(_)) {
                error!("addmod for {} failed: {}", user.id, e);
            }
            ctx.say(api_error_text(&e)).await?;
        }
    }

    Ok(())
}

/// Remove a claim moderator from this server
#[poise::command(slash_command, guild_only)]
pub async fn removemod(
    ctx: Context<'_>,
    #[description = "Moderator to remove"] user: serenity::User,
) -> Result<(), Error> {
    ctx.defer().await?;
    info!("removemod called by {} for {}", ctx.author().name, user.name);

    let Some(guild_id) = ctx.guild_id() else {
        ctx.say("This command only works in a server.").await?;
        return Ok(());
    };

    let result = ctx
        .data()
        .api
        .remove_moderator(guild_id.get(), user.id.get(), ctx.author().id.get())
        .await;

    match result {
        Ok(record) => {
            ctx.say(format!(
                "<@{}> is no longer a moderator on this server.",
                record.discord_id
            ))
            .await?;
        }
        Err(e) => {
            if !matches!(e, ApiError::Rejected(_)) {
                error!("removemod for {} failed: {}", user.id, e);
            }
            ctx.say(api_error_text(&e)).await?;
        }
    }

    Ok(())
}

/// Register this server for claim moderation
#[poise::command(slash_command, guild_only)]
pub async fn verifyserver(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer().await?;
    info!("verifyserver called by {}", ctx.author().name);

    let Some(guild_id) = ctx.guild_id() else {
        ctx.say("This command only works in a server.").await?;
        return Ok(());
    };

    match ctx
        .data()
        .api
        .verify_server(guild_id.get(), ctx.author().id.get())
        .await
    {
        Ok(record) if record.verified => {
            ctx.say(format!(
                "Server verified. <@{}> is registered as **{}**.",
                record.discord_id,
                role_name(record.role)
            ))
            .await?;
        }
        Ok(_) => {
            ctx.say("Verification request recorded; it is awaiting review.")
                .await?;
        }
        Err(e) => {
            if !matches!(e, ApiError::Rejected(_)) {
                error!("verifyserver for guild {} failed: {}", guild_id, e);
            }
            ctx.say(api_error_text(&e)).await?;
        }
    }

    Ok(())
}
