pub mod message;

pub use message::{handle_command, handle_message, parse_command};
