use poise::serenity_prelude as serenity;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    // Store errors
    #[error("Invalid document key '{key}': {reason}")]
    InvalidKey { key: String, reason: &'static str },

    #[error("Failed to stat '{path}': {source}")]
    Stat {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory '{path}': {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to open '{path}': {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode document '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write '{path}': {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Document '{key}' not found at '{path}'")]
    DocumentNotFound { key: String, path: String },

    #[error("Failed to decode '{path}': {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    // Directory errors
    #[error(transparent)]
    Discord(#[from] serenity::Error),

    #[error("Channel {channel_id} does not belong to a guild")]
    NotInGuild { channel_id: String },

    #[error("Guild not found: {id}")]
    GuildNotFound { id: String },

    #[error("Member {user_id} not found in guild {guild_id}")]
    MemberNotFound { guild_id: String, user_id: String },

    // Permission errors
    #[error("Invalid permission value: {value}")]
    InvalidPermission { value: i64 },

    #[error("Failed to initialize logging: {message}")]
    LogInit { message: String },
}

impl BotError {
    /// True when a load failed only because the document has never been saved.
    pub fn is_not_found(&self) -> bool {
        matches!(self, BotError::DocumentNotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, BotError>;
