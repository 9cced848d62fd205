use poise::serenity_prelude::{GuildId, RoleId, UserId};

use crate::error::{BotError, Result};
use crate::session::{ChatSession, GuildInfo, MemberInfo, MessageRef, RoleInfo};

/// Guild, member and role lookups for the permission resolver.
///
/// One session call per lookup. Errors from the session are returned as-is
/// and are not logged here.
pub struct GuildDirectory<'a> {
    session: &'a dyn ChatSession,
}

impl<'a> GuildDirectory<'a> {
    pub fn new(session: &'a dyn ChatSession) -> Self {
        Self { session }
    }

    /// The guild a message was posted in (message -> channel -> guild).
    pub async fn resolve_guild(&self, message: &MessageRef) -> Result<GuildInfo> {
        let channel = self.session.channel(message.channel_id).await?;
        let guild_id = channel.guild_id.ok_or_else(|| BotError::NotInGuild {
            channel_id: channel.id.to_string(),
        })?;
        self.session.guild(guild_id).await
    }

    pub async fn resolve_member(&self, guild_id: GuildId, user_id: UserId) -> Result<MemberInfo> {
        self.session.guild_member(guild_id, user_id).await
    }

    pub async fn list_roles(&self, guild_id: GuildId) -> Result<Vec<RoleInfo>> {
        self.session.guild_roles(guild_id).await
    }
}

/// Linear scan of `roles` for `id`. `None` means the guild has no such role,
/// which is distinct from a role that exists but grants nothing.
pub fn find_role(roles: &[RoleInfo], id: RoleId) -> Option<&RoleInfo> {
    roles.iter().find(|role| role.id == id)
}
