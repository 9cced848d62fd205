//! The chat-platform session as seen by the core.
//!
//! Everything the core needs from Discord goes through [`ChatSession`]: five
//! synchronous-per-call lookups with errors handed back untouched. The live
//! implementation wraps serenity's HTTP client; tests use [`fake::FakeSession`].

use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use poise::serenity_prelude::{ChannelId, GuildId, MessageId, Permissions, RoleId, UserId};
use std::sync::Arc;

use crate::error::{BotError, Result};

/// Identity of the message that triggered an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageRef {
    pub id: MessageId,
    pub channel_id: ChannelId,
    pub author_id: UserId,
}

impl From<&serenity::Message> for MessageRef {
    fn from(msg: &serenity::Message) -> Self {
        Self {
            id: msg.id,
            channel_id: msg.channel_id,
            author_id: msg.author.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    pub id: ChannelId,
    /// `None` for DMs and group DMs
    pub guild_id: Option<GuildId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildInfo {
    pub id: GuildId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    pub guild_id: GuildId,
    pub user_id: UserId,
    /// Role IDs in the order the platform returned them
    pub roles: Vec<RoleId>,
}

impl MemberInfo {
    /// Role IDs rendered as strings, for comparison against configured ID lists.
    pub fn role_id_strings(&self) -> Vec<String> {
        self.roles.iter().map(|r| r.to_string()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleInfo {
    pub id: RoleId,
    pub name: String,
    pub permissions: Permissions,
}

impl RoleInfo {
    pub fn is_administrator(&self) -> bool {
        self.permissions.contains(Permissions::ADMINISTRATOR)
    }
}

/// Capabilities the core requires from the external chat session.
#[async_trait]
pub trait ChatSession: Send + Sync {
    async fn channel(&self, id: ChannelId) -> Result<ChannelInfo>;

    async fn guild(&self, id: GuildId) -> Result<GuildInfo>;

    async fn guild_member(&self, guild_id: GuildId, user_id: UserId) -> Result<MemberInfo>;

    async fn guild_roles(&self, guild_id: GuildId) -> Result<Vec<RoleInfo>>;

    async fn send_message(&self, channel_id: ChannelId, text: &str) -> Result<()>;
}

pub type SharedSession = Arc<dyn ChatSession>;

/// [`ChatSession`] backed by serenity's REST client. No caching, no retries.
pub struct SerenitySession {
    http: Arc<serenity::Http>,
}

impl SerenitySession {
    pub fn new(http: Arc<serenity::Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ChatSession for SerenitySession {
    async fn channel(&self, id: ChannelId) -> Result<ChannelInfo> {
        let channel = self.http.get_channel(id).await?;
        Ok(ChannelInfo {
            id,
            guild_id: channel.guild().map(|c| c.guild_id),
        })
    }

    async fn guild(&self, id: GuildId) -> Result<GuildInfo> {
        let guild = self
            .http
            .get_guild(id)
            .await
            .map_err(|e| lookup_error(e, || BotError::GuildNotFound { id: id.to_string() }))?;
        Ok(GuildInfo {
            id: guild.id,
            name: guild.name,
        })
    }

    async fn guild_member(&self, guild_id: GuildId, user_id: UserId) -> Result<MemberInfo> {
        let member = self
            .http
            .get_member(guild_id, user_id)
            .await
            .map_err(|e| {
                lookup_error(e, || BotError::MemberNotFound {
                    guild_id: guild_id.to_string(),
                    user_id: user_id.to_string(),
                })
            })?;
        Ok(MemberInfo {
            guild_id,
            user_id: member.user.id,
            roles: member.roles,
        })
    }

    async fn guild_roles(&self, guild_id: GuildId) -> Result<Vec<RoleInfo>> {
        let roles = self.http.get_guild_roles(guild_id).await?;
        Ok(roles
            .into_iter()
            .map(|role| RoleInfo {
                id: role.id,
                name: role.name,
                permissions: role.permissions,
            })
            .collect())
    }

    async fn send_message(&self, channel_id: ChannelId, text: &str) -> Result<()> {
        channel_id.say(&self.http, text).await?;
        Ok(())
    }
}

/// Turn a failed lookup into `not_found()` when Discord answered 404,
/// otherwise pass the serenity error through.
fn lookup_error(err: serenity::Error, not_found: impl FnOnce() -> BotError) -> BotError {
    let status = match &err {
        serenity::Error::Http(e) => e.status_code(),
        _ => None,
    };
    if is_not_found(status) {
        not_found()
    } else {
        BotError::Discord(err)
    }
}

fn is_not_found(status: Option<serenity::StatusCode>) -> bool {
    status == Some(serenity::StatusCode::NOT_FOUND)
}

#[cfg(test)]
mod tests {
    use super::*;
    use poise::serenity_prelude::{HttpError, StatusCode};

    fn guild_not_found() -> BotError {
        BotError::GuildNotFound {
            id: "100".to_string(),
        }
    }

    #[test]
    fn test_only_404_means_not_found() {
        assert!(is_not_found(Some(StatusCode::NOT_FOUND)));
        assert!(!is_not_found(Some(StatusCode::FORBIDDEN)));
        assert!(!is_not_found(None));
    }

    #[test]
    fn test_other_errors_pass_through() {
        let err = lookup_error(serenity::Error::Other("Unknown Channel"), guild_not_found);
        assert!(matches!(err, BotError::Discord(serenity::Error::Other("Unknown Channel"))));

        let err = lookup_error(serenity::Error::Http(HttpError::RateLimitUtf8), guild_not_found);
        assert!(matches!(err, BotError::Discord(serenity::Error::Http(_))));
    }
}
