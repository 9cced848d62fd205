use poise::serenity_prelude::UserId;
use std::sync::Arc;
use tracing::debug;

use super::requirement::PermissionRequirement;
use crate::config::{BotConfig, CommandDescriptor};
use crate::directory::{find_role, GuildDirectory};
use crate::error::Result;
use crate::session::{MessageRef, SharedSession};
use crate::util::contains;

/// Answers "may this member do something that needs these permissions".
///
/// The check is flat, not hierarchical:
/// 1. a member holding any role listed in the config's `admins` is allowed;
/// 2. otherwise any role whose bits intersect the requirement, or that carries
///    ADMINISTRATOR, allows;
/// 3. otherwise the member is denied.
///
/// Lookup failures are errors, not denials.
#[derive(Clone)]
pub struct AuthorizationResolver {
    session: SharedSession,
    config: Arc<BotConfig>,
}

impl AuthorizationResolver {
    pub fn new(session: SharedSession, config: Arc<BotConfig>) -> Self {
        Self { session, config }
    }

    /// Check `user_id` (or the message author when `None`) in the guild the
    /// message was sent in.
    pub async fn has_permission(
        &self,
        message: &MessageRef,
        user_id: Option<UserId>,
        required: PermissionRequirement,
    ) -> Result<bool> {
        if required == PermissionRequirement::Public {
            return Ok(true);
        }

        let directory = GuildDirectory::new(self.session.as_ref());
        let guild = directory.resolve_guild(message).await?;
        let user_id = user_id.unwrap_or(message.author_id);
        let member = directory.resolve_member(guild.id, user_id).await?;

        let member_roles = member.role_id_strings();
        if let Some(admin) = self
            .config
            .admins
            .iter()
            .find(|admin| contains(&member_roles, admin))
        {
            debug!("User {} allowed via admin entry {}", user_id, admin);
            return Ok(true);
        }

        if member.roles.is_empty() {
            return Ok(false);
        }

        let roles = directory.list_roles(guild.id).await?;
        for role_id in &member.roles {
            let Some(role) = find_role(&roles, *role_id) else {
                debug!(
                    "Role {} held by {} does not exist in guild {}",
                    role_id, user_id, guild.id
                );
                continue;
            };

            if required.granted_by(role.permissions) {
                debug!("User {} allowed via role '{}' for {}", user_id, role.name, required);
                return Ok(true);
            }
            if role.is_administrator() {
                debug!("User {} allowed via administrator role '{}'", user_id, role.name);
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Same as [`has_permission`](Self::has_permission), taking the raw
    /// integer form where `-1` means public.
    pub async fn has_raw_permission(
        &self,
        message: &MessageRef,
        user_id: Option<UserId>,
        required: i64,
    ) -> Result<bool> {
        let required = PermissionRequirement::from_raw(required)?;
        self.has_permission(message, user_id, required).await
    }

    /// Whether the author of `message` may run `command`.
    pub async fn can_run(&self, command: &CommandDescriptor, message: &MessageRef) -> Result<bool> {
        self.has_permission(message, None, command.requirement()?).await
    }
}
