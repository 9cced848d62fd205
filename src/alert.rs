use std::fmt::Display;
use tracing::warn;

use crate::messages::alert_message;
use crate::session::{ChatSession, MessageRef};

/// Tell the author of `message` that their command failed with `error`.
///
/// This does not replace logging the error; it only keeps the user from
/// waiting on a reply that will never come. A failed send is logged and
/// otherwise dropped. `error` is `Sync` so the returned future stays `Send`
/// and can run inside a command action.
pub async fn alert_user(
    session: &dyn ChatSession,
    message: &MessageRef,
    error: &(dyn Display + Sync),
) {
    let text = alert_message(message.author_id, &error.to_string());
    if let Err(e) = session.send_message(message.channel_id, &text).await {
        warn!(
            "Failed to send error alert to channel {}: {}",
            message.channel_id, e
        );
    }
}
