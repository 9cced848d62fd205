use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::error::Result;
use crate::permissions::PermissionRequirement;
use crate::session::{MessageRef, SharedSession};

/// What a command does when run. Errors are the action's own business: it
/// returns nothing, so anything that goes wrong must be logged or reported
/// to the user from inside.
pub type Action = Arc<dyn Fn(SharedSession, MessageRef) -> BoxFuture<'static, ()> + Send + Sync>;

/// Static description of a bot command, owned by the module that defines it.
#[derive(Clone, Serialize, Deserialize)]
pub struct CommandDescriptor {
    pub name: String,

    pub help: String,

    /// Permission bitmask required to run the command, or `-1` for everyone
    pub perms: i64,

    pub version: String,

    #[serde(skip)]
    action: Option<Action>,
}

impl CommandDescriptor {
    pub fn new(name: &str, help: &str, perms: i64, version: &str) -> Self {
        Self {
            name: name.to_string(),
            help: help.to_string(),
            perms,
            version: version.to_string(),
            action: None,
        }
    }

    pub fn with_action<F, Fut>(mut self, action: F) -> Self
    where
        F: Fn(SharedSession, MessageRef) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let action: Action = Arc::new(
            move |session: SharedSession, message: MessageRef| -> BoxFuture<'static, ()> {
                Box::pin(action(session, message))
            },
        );
        self.action = Some(action);
        self
    }

    pub fn requirement(&self) -> Result<PermissionRequirement> {
        PermissionRequirement::from_raw(self.perms)
    }

    /// Run the action, if one is bound.
    pub async fn run(&self, session: SharedSession, message: MessageRef) {
        if let Some(action) = &self.action {
            action(session, message).await;
        }
    }
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("help", &self.help)
            .field("perms", &self.perms)
            .field("version", &self.version)
            .field("action", &self.action.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::fake::FakeSession;
    use poise::serenity_prelude::{ChannelId, MessageId, UserId};

    #[test]
    fn test_descriptor_json_omits_action() {
        let command = CommandDescriptor::new("ping", "Check the bot is alive", -1, "1.0.0")
            .with_action(|_, _| async {});

        let json = serde_json::to_value(&command).unwrap();
        assert_eq!(json["name"], "ping");
        assert_eq!(json["perms"], -1);
        assert!(json.get("action").is_none());

        let parsed: CommandDescriptor = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.name, "ping");
        assert!(parsed.action.is_none());
    }

    #[tokio::test]
    async fn test_run_invokes_action() {
        let command = CommandDescriptor::new("echo", "Echo back", -1, "1.0.0").with_action(
            |session: SharedSession, message: MessageRef| async move {
                let _ = session.send_message(message.channel_id, "echo").await;
            },
        );

        let fake = Arc::new(FakeSession::new());
        let message = MessageRef {
            id: MessageId::new(1),
            channel_id: ChannelId::new(2),
            author_id: UserId::new(3),
        };
        command.run(fake.clone(), message).await;

        let sent = fake.sent.lock();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0], (ChannelId::new(2), "echo".to_string()));
    }
}
