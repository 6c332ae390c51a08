use anyhow::Result;
use clap::Parser;
use dotenv::dotenv;
use poise::serenity_prelude as serenity;
use tracing::{error, info, warn};

/// Discord bot for the fiction analytics and claims platform
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Force re-sync of slash commands to all guilds (use when commands aren't showing up)
    #[arg(long, short = 's')]
    sync_commands: bool,

    /// Register commands per-guild instead of globally (faster for testing)
    #[arg(long)]
    guild_commands: bool,

    /// Specific guild ID to sync commands to (for testing)
    #[arg(long)]
    guild_id: Option<u64>,
}

mod api;
mod charts;
mod commands;
mod config;
mod error;
mod logging;
mod parse;
mod promo;
mod tags;

use api::ApiClient;
use commands::{
    addmod, bookstats, claim, claim_multiple, essence, help, pending_claims, ping, process_claim,
    ptw, removemod, rising_stars, shoutout, unclaim, verifyserver,
};
use config::BotConfig;
use promo::PromoRotator;

type Error = Box<dyn std::error::Error + Send + Sync>;
type Context<'a> = poise::Context<'a, Data, Error>;

/// Shared application state
pub struct Data {
    pub config: BotConfig,
    pub api: ApiClient,
    pub promo: PromoRotator,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let args = Args::parse();
    logging::init_tracing();

    let token = std::env::var("DISCORD_TOKEN").expect("Missing DISCORD_TOKEN environment variable");
    let config = BotConfig::from_env()?;
    info!("Backend: {}", config.backend_base_url);

    let api = ApiClient::new(config.backend_base_url.clone(), config.backend_token.clone());

    // Extract CLI flags for use in setup
    let sync_commands = args.sync_commands;
    let guild_commands = args.guild_commands;
    let target_guild_id = args.guild_id;

    if sync_commands {
        info!("--sync-commands: Will force re-register slash commands");
    }
    if guild_commands {
        info!("--guild-commands: Will register commands per-guild (faster for testing)");
    } else {
        info!("Registering commands globally by default (takes up to 1 hour to propagate)");
    }
    if let Some(gid) = target_guild_id {
        info!("--guild-id: Targeting specific guild {}", gid);
    }

    // Build framework
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                ping(),
                help(),
                claim(),
                claim_multiple(),
                unclaim(),
                process_claim(),
                pending_claims(),
                bookstats(),
                essence(),
                rising_stars(),
                ptw(),
                addmod(),
                removemod(),
                verifyserver(),
                shoutout(),
            ],
            pre_command: |ctx| {
                Box::pin(async move {
                    info!(
                        "Command '{}' invoked by {} (ID: {}) in {}",
                        ctx.command().qualified_name,
                        ctx.author().name,
                        ctx.author().id,
                        ctx.guild_id()
                            .map(|g| g.to_string())
                            .unwrap_or_else(|| "DM".to_string())
                    );
                })
            },
            post_command: |ctx| {
                Box::pin(async move {
                    info!(
                        "Command '{}' completed for {}",
                        ctx.command().qualified_name,
                        ctx.author().name
                    );
                })
            },
            on_error: |err| {
                Box::pin(async move {
                    match err {
                        poise::FrameworkError::Command { error, ctx, .. } => {
                            // Handlers resolve their own failures; anything
                            // landing here still must reach the user.
                            let user_error = error
                                .downcast_ref::<error::BotError>()
                                .map(|e| e.is_user_error())
                                .unwrap_or(false);
                            if user_error {
                                let _ = ctx.say(error.to_string()).await;
                            } else {
                                error!(
                                    "Error in command '{}': {}",
                                    ctx.command().qualified_name,
                                    error
                                );
                                let _ = ctx
                                    .say("Something went wrong. Please try again later.")
                                    .await;
                            }
                        }
                        poise::FrameworkError::ArgumentParse {
                            error, input, ctx, ..
                        } => {
                            error!(
                                "Argument parse error in '{}': {} (input: {:?})",
                                ctx.command().qualified_name,
                                error,
                                input
                            );
                            let _ = ctx.say("Could not understand that argument.").await;
                        }
                        poise::FrameworkError::GuildOnly { ctx, .. } => {
                            let _ = ctx.say("This command only works in a server.").await;
                        }
                        other => {
                            error!("Other framework error: {}", other);
                        }
                    }
                })
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Bot logged in as: {}", ready.user.name);

                // Determine which guilds to register commands for
                let guilds_to_register: Vec<serenity::GuildId> = if let Some(gid) = target_guild_id
                {
                    vec![serenity::GuildId::new(gid)]
                } else {
                    ready.guilds.iter().map(|g| g.id).collect()
                };

                if guild_commands || sync_commands {
                    for guild_id in &guilds_to_register {
                        info!("Registering commands to guild: {}", guild_id);
                        if let Err(e) = poise::builtins::register_in_guild(
                            ctx,
                            &framework.options().commands,
                            *guild_id,
                        )
                        .await
                        {
                            error!("Failed to register commands for guild {}: {}", guild_id, e);
                        } else {
                            info!(
                                "Successfully registered {} commands for guild {}",
                                framework.options().commands.len(),
                                guild_id
                            );
                        }
                    }
                } else {
                    info!("Registering commands globally...");
                    if let Err(e) =
                        poise::builtins::register_globally(ctx, &framework.options().commands).await
                    {
                        error!("Failed to register commands globally: {}", e);
                    } else {
                        info!(
                            "Successfully registered {} commands globally (may take up to 1 hour to propagate)",
                            framework.options().commands.len()
                        );
                    }
                }

                Ok(Data {
                    config,
                    api,
                    promo: PromoRotator::with_defaults(),
                })
            })
        })
        .build();

    // Slash commands only; no privileged intents needed.
    let intents = serenity::GatewayIntents::non_privileged();

    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await?;

    info!("Starting bot...");
    client.start().await?;
    warn!("Bot ended.");

    Ok(())
}
