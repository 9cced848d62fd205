use poise::serenity_prelude as serenity;
use poise::serenity_prelude::GuildId;
use tracing::{debug, error, info};

use crate::alert::alert_user;
use crate::config::CommandDescriptor;
use crate::context::BotContext;
use crate::directory::GuildDirectory;
use crate::messages::permission_denied_message;
use crate::session::MessageRef;

/// Handle an incoming gateway message
pub async fn handle_message(ctx: &BotContext, msg: &serenity::Message, commands: &[CommandDescriptor]) {
    // Ignore bot messages
    if msg.author.bot {
        return;
    }

    // Commands only run inside guilds
    let Some(guild_id) = msg.guild_id else {
        return;
    };

    handle_command(ctx, &MessageRef::from(msg), guild_id, &msg.content, commands).await;
}

/// Name of the command invoked by `content`, if it starts with `prefix`
pub fn parse_command<'c>(prefix: &str, content: &'c str) -> Option<&'c str> {
    if prefix.is_empty() {
        return None;
    }
    content
        .strip_prefix(prefix)?
        .split_whitespace()
        .next()
}

/// Look up, authorize and run the command in `content`.
pub async fn handle_command(
    ctx: &BotContext,
    message: &MessageRef,
    guild_id: GuildId,
    content: &str,
    commands: &[CommandDescriptor],
) {
    if ctx.config.is_channel_blacklisted(&message.channel_id.to_string()) {
        return;
    }

    let Some(name) = parse_command(&ctx.config.prefix, content) else {
        return;
    };
    let Some(command) = commands.iter().find(|c| c.name.eq_ignore_ascii_case(name)) else {
        debug!("Unknown command '{}' from {}", name, message.author_id);
        return;
    };

    if !ctx.config.blacklisted_roles.is_empty() {
        let directory = GuildDirectory::new(ctx.session.as_ref());
        match directory.resolve_member(guild_id, message.author_id).await {
            Ok(member) if ctx.config.has_blacklisted_role(&member) => {
                debug!("Ignoring '{}' from blacklisted member {}", name, message.author_id);
                return;
            }
            Ok(_) => {}
            Err(e) => {
                error!("Failed to look up member {}: {}", message.author_id, e);
                alert_user(ctx.session.as_ref(), message, &e).await;
                return;
            }
        }
    }

    match ctx.resolver().can_run(command, message).await {
        Ok(true) => {
            info!("Command '{}' invoked by {} in {}", command.name, message.author_id, guild_id);
            command.run(ctx.session.clone(), *message).await;
        }
        Ok(false) => {
            info!("User {} denied '{}'", message.author_id, command.name);
            let text = permission_denied_message(message.author_id, &command.name);
            if let Err(e) = ctx.session.send_message(message.channel_id, &text).await {
                error!("Failed to send permission notice: {}", e);
            }
        }
        Err(e) => {
            error!("Permission check for '{}' failed: {}", command.name, e);
            alert_user(ctx.session.as_ref(), message, &e).await;
        }
    }
}
