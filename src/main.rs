use anyhow::Result;
use clap::Parser;
use dotenv::dotenv;
use poise::serenity_prelude as serenity;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::filter::LevelFilter;

use bulwark::commands::builtin_commands;
use bulwark::config::{BotConfig, CommandDescriptor};
use bulwark::events::handle_message;
use bulwark::logging::{self, LogFile};
use bulwark::session::SerenitySession;
use bulwark::store::Store;
use bulwark::BotContext;

/// Discord bot with persisted config and permission checks
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding cfg/ and logs/
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Minimum log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
}

type Error = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
pub struct Data {
    ctx: BotContext,
    commands: Vec<CommandDescriptor>,
}

async fn event_handler(
    _ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    if let serenity::FullEvent::Message { new_message } = event {
        handle_message(&data.ctx, new_message, &data.commands).await;
    }
    Ok(())
}

/// Log the application ID encoded in the first segment of a bot token.
fn log_bot_id(token: &str) {
    use base64::Engine;

    let Some(bot_id_b64) = token.split('.').next() else {
        return;
    };
    let decoded = base64::engine::general_purpose::STANDARD_NO_PAD
        .decode(bot_id_b64)
        .or_else(|_| base64::engine::general_purpose::URL_SAFE_NO_PAD.decode(bot_id_b64));
    match decoded.ok().and_then(|bytes| String::from_utf8(bytes).ok()) {
        Some(id_str) => info!("Bot ID: {}", id_str),
        None => warn!("Could not decode bot ID from token"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let args = Args::parse();

    let log_file = LogFile::create(&args.root, chrono::Local::now())?;
    logging::init(&log_file, args.log_level)?;
    info!("Logging to {}", log_file.path().display());

    let store = Store::new(&args.root);
    let mut config = BotConfig::load_or_init(&store).await?;

    if let Ok(token) = std::env::var("DISCORD_TOKEN") {
        info!("Using token from DISCORD_TOKEN");
        config.token = token;
    }
    if config.token.is_empty() {
        error!("No bot token: set \"token\" in cfg/foundation/config.json or DISCORD_TOKEN");
        return Err(anyhow::anyhow!("Missing bot token"));
    }
    log_bot_id(&config.token);

    let token = config.token.clone();
    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_MEMBERS;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, _framework| {
            Box::pin(async move {
                info!("Bot logged in as: {}", ready.user.name);

                let session = Arc::new(SerenitySession::new(ctx.http.clone()));
                let bot_ctx = BotContext::new(store, config, session);
                let commands = builtin_commands(&bot_ctx);
                info!(
                    "Loaded {} commands with prefix {:?}",
                    commands.len(),
                    bot_ctx.config.prefix
                );

                Ok(Data {
                    ctx: bot_ctx,
                    commands,
                })
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await?;

    info!("Starting bot...");
    let outcome = client.start().await;
    warn!("Bot ended.");

    if let Err(e) = log_file.close() {
        eprintln!("Failed to flush log file: {}", e);
    }
    outcome?;
    Ok(())
}
