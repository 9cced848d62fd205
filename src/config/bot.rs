use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{info, warn};

use crate::error::Result;
use crate::session::MemberInfo;
use crate::store::Store;

/// Store key of the bot-wide configuration document
pub const CONFIG_KEY: &str = "foundation/config.json";

/// Bot credentials and bot-wide settings.
///
/// Loaded once at startup and shared read-only afterwards. Anything that
/// mutates it must bring its own synchronization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    #[serde(rename = "clientID")]
    pub client_id: String,

    pub secret: String,

    pub token: String,

    /// Command trigger, e.g. `!`
    pub prefix: String,

    /// Channels the bot ignores
    #[serde(rename = "channels")]
    pub blacklisted_channels: BTreeSet<String>,

    /// Members holding any of these roles are ignored
    #[serde(rename = "roles")]
    pub blacklisted_roles: BTreeSet<String>,

    /// IDs granted every permission regardless of role bits
    pub admins: BTreeSet<String>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            secret: String::new(),
            token: String::new(),
            prefix: "!".to_string(),
            blacklisted_channels: BTreeSet::new(),
            blacklisted_roles: BTreeSet::new(),
            admins: BTreeSet::new(),
        }
    }
}

impl BotConfig {
    pub async fn load(store: &Store) -> Result<Self> {
        let config: Self = store.load(CONFIG_KEY).await?;
        info!(
            "Loaded bot config: prefix={:?}, {} admin IDs, {} blacklisted channels, {} blacklisted roles",
            config.prefix,
            config.admins.len(),
            config.blacklisted_channels.len(),
            config.blacklisted_roles.len()
        );
        Ok(config)
    }

    pub async fn save(&self, store: &Store) -> Result<()> {
        store.save(CONFIG_KEY, self).await
    }

    /// Load the config, writing out a default document first if none exists.
    pub async fn load_or_init(store: &Store) -> Result<Self> {
        match Self::load(store).await {
            Ok(config) => Ok(config),
            Err(e) if e.is_not_found() => {
                warn!("No bot config at '{}', writing defaults", CONFIG_KEY);
                let config = Self::default();
                config.save(store).await?;
                Ok(config)
            }
            Err(e) => Err(e),
        }
    }

    pub fn is_admin_id(&self, id: &str) -> bool {
        self.admins.contains(id)
    }

    pub fn is_channel_blacklisted(&self, channel_id: &str) -> bool {
        self.blacklisted_channels.contains(channel_id)
    }

    pub fn has_blacklisted_role(&self, member: &MemberInfo) -> bool {
        member
            .roles
            .iter()
            .any(|role| self.blacklisted_roles.contains(&role.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poise::serenity_prelude::{GuildId, RoleId, UserId};
    use tempfile::TempDir;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "clientID": "1234",
            "secret": "s3cret",
            "token": "tok",
            "prefix": "?",
            "channels": ["10", "11", "10"],
            "roles": ["20"],
            "admins": ["30", "31"]
        }"#;

        let config: BotConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.client_id, "1234");
        assert_eq!(config.prefix, "?");
        assert_eq!(config.blacklisted_channels.len(), 2);
        assert!(config.is_channel_blacklisted("11"));
        assert!(config.is_admin_id("31"));
        assert!(!config.is_admin_id("32"));
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: BotConfig = serde_json::from_str(r#"{"token": "abc", "unknown": 1}"#).unwrap();
        assert_eq!(config.token, "abc");
        assert_eq!(config.prefix, "!");
        assert!(config.admins.is_empty());
    }

    #[test]
    fn test_blacklisted_role() {
        let mut config = BotConfig::default();
        config.blacklisted_roles.insert("20".to_string());

        let member = MemberInfo {
            guild_id: GuildId::new(1),
            user_id: UserId::new(2),
            roles: vec![RoleId::new(19), RoleId::new(20)],
        };
        assert!(config.has_blacklisted_role(&member));

        let clean = MemberInfo {
            roles: vec![RoleId::new(19)],
            ..member
        };
        assert!(!config.has_blacklisted_role(&clean));
    }

    #[tokio::test]
    async fn test_load_or_init_writes_defaults() {
        let dir = TempDir::new().unwrap();
        let store = Store::new(dir.path());

        let config = BotConfig::load_or_init(&store).await.unwrap();
        assert_eq!(config, BotConfig::default());
        assert!(store.contains(CONFIG_KEY).await.unwrap());
    }

    #[tokio::test]
    async fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let store = Store::new(dir.path());

        let mut config = BotConfig::default();
        config.prefix = ">>".to_string();
        config.admins.insert("555".to_string());
        config.save(&store).await.unwrap();

        let raw = std::fs::read_to_string(dir.path().join("cfg/foundation/config.json")).unwrap();
        assert!(raw.contains("\"clientID\""));
        assert!(raw.contains("\"admins\""));

        let loaded = BotConfig::load(&store).await.unwrap();
        assert_eq!(loaded, config);
    }
}
