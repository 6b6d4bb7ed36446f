//! Conversations domain state

use crate::domain::dispatcher::EventDispatcher;
use crate::repository::ConversationStore;
use std::sync::Arc;

/// Application state for the Conversations domain
#[derive(Clone)]
pub struct ConversationsState {
    pub store: Arc<dyn ConversationStore>,
}

impl ConversationsState {
    pub fn new(store: Arc<dyn ConversationStore>) -> Self {
        Self { store }
    }

    /// Dispatcher bound to this state's store
    pub fn dispatcher(&self) -> EventDispatcher {
        EventDispatcher::new(self.store.clone())
    }
}
