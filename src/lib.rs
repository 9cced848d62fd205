//! Authorization and persistence core for a Discord bot.
//!
//! [`store::Store`] keeps small JSON documents under a root directory;
//! [`permissions::AuthorizationResolver`] decides whether a member may run a
//! command, using live guild data from a [`session::ChatSession`] and the
//! admin list in [`config::BotConfig`].

pub mod alert;
pub mod commands;
pub mod config;
pub mod context;
pub mod directory;
pub mod error;
pub mod events;
pub mod logging;
pub mod messages;
pub mod permissions;
pub mod session;
pub mod store;
pub mod util;

pub use context::BotContext;
pub use error::{BotError, Result};
