pub mod bot;
pub mod command;

pub use bot::{BotConfig, CONFIG_KEY};
pub use command::{Action, CommandDescriptor};
