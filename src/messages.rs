// src/messages.rs
use poise::serenity_prelude::UserId;

pub fn alert_message(author_id: UserId, error: &str) -> String {
    format!(
        "<@{}> | Error encountered, details as follows:\n\
        ```\n{}\n```\n\
        You are being pinged because your message was the message that triggered the \
        above error. Please inform the person running this bot or a server admin.",
        author_id, error
    )
}

pub fn permission_denied_message(author_id: UserId, command: &str) -> String {
    format!(
        "<@{}> you do not have permission to run `{}`.",
        author_id, command
    )
}
