use poise::serenity_prelude::Permissions;
use tracing::{error, info};

use crate::alert::alert_user;
use crate::config::CommandDescriptor;
use crate::context::BotContext;
use crate::permissions::PUBLIC;
use crate::session::{MessageRef, SharedSession};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Commands the bot ships with
pub fn builtin_commands(ctx: &BotContext) -> Vec<CommandDescriptor> {
    vec![ping(), save_config(ctx)]
}

/// Check the bot is responding
pub fn ping() -> CommandDescriptor {
    CommandDescriptor::new("ping", "Check if the bot is running", PUBLIC, VERSION).with_action(
        |session: SharedSession, message: MessageRef| async move {
            if let Err(e) = session.send_message(message.channel_id, "Pong!").await {
                error!("Failed to answer ping: {}", e);
            }
        },
    )
}

/// Write the running config back to the store
pub fn save_config(ctx: &BotContext) -> CommandDescriptor {
    let store = ctx.store.clone();
    let config = ctx.config.clone();

    CommandDescriptor::new(
        "saveconfig",
        "Persist the running bot configuration (Admin)",
        Permissions::ADMINISTRATOR.bits() as i64,
        VERSION,
    )
    .with_action(move |session: SharedSession, message: MessageRef| {
        let store = store.clone();
        let config = config.clone();
        async move {
            // Store already logged the failure.
            if let Err(e) = config.save(&store).await {
                alert_user(session.as_ref(), &message, &e).await;
                return;
            }
            info!("Bot config saved on request of {}", message.author_id);
            if let Err(e) = session
                .send_message(message.channel_id, "Configuration saved.")
                .await
            {
                error!("Failed to confirm config save: {}", e);
            }
        }
    })
}
