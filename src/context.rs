use std::sync::Arc;

use crate::config::BotConfig;
use crate::permissions::AuthorizationResolver;
use crate::session::SharedSession;
use crate::store::Store;

/// Everything a command handler needs, built once at startup and passed
/// around explicitly.
#[derive(Clone)]
pub struct BotContext {
    pub store: Store,
    pub config: Arc<BotConfig>,
    pub session: SharedSession,
}

impl BotContext {
    pub fn new(store: Store, config: BotConfig, session: SharedSession) -> Self {
        Self {
            store,
            config: Arc::new(config),
            session,
        }
    }

    pub fn resolver(&self) -> AuthorizationResolver {
        AuthorizationResolver::new(self.session.clone(), self.config.clone())
    }
}
