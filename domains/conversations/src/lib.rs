//! Conversations domain: webhook event dispatch, conversations, messages

pub mod api;
pub mod domain;
pub mod repository;

// Re-export domain types at the crate root for convenience
pub use domain::dispatcher::{DispatchOutcome, EventDispatcher};
pub use domain::entities::{Conversation, ConversationStatus, Message, MessageDirection};
pub use domain::events::{EventType, WebhookEnvelope, WebhookEvent};
pub use domain::state::{
    ConversationEvent, ConversationState, ConversationStateMachine, StateError,
};

// Re-export repository types
pub use repository::{
    ConversationStore, InMemoryConversationStore, PgConversationStore, StoreResult,
};

// Re-export API types
pub use api::routes;
pub use api::ConversationsState;
