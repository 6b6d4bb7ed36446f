//! State machine for conversation status transitions
//!
//! Conversation states: Open → Closed (one-way)

pub use threadline_common::StateError;
use serde::{Deserialize, Serialize};

/// Conversation states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConversationState {
    Open,
    Closed,
}

impl ConversationState {
    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl std::fmt::Display for ConversationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::Closed => write!(f, "CLOSED"),
        }
    }
}

/// Events that act on a conversation's state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConversationEvent {
    /// A CLOSE_CONVERSATION event arrived
    Close,
    /// A NEW_MESSAGE event wants to append to the conversation
    AppendMessage,
}

impl std::fmt::Display for ConversationEvent {
    #[mutants::skip] // Log formatting only
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Close => write!(f, "close"),
            Self::AppendMessage => write!(f, "append_message"),
        }
    }
}

/// Conversation state machine
pub struct ConversationStateMachine;

impl ConversationStateMachine {
    /// Attempt a state transition
    ///
    /// Closing a closed conversation is a self-loop so redelivered close
    /// events succeed without effect.
    pub fn transition(
        current: ConversationState,
        event: ConversationEvent,
    ) -> Result<ConversationState, StateError> {
        match event {
            ConversationEvent::Close => Ok(ConversationState::Closed),
            ConversationEvent::AppendMessage if current.is_terminal() => {
                Err(StateError::TerminalState(current.to_string()))
            }
            ConversationEvent::AppendMessage => Ok(current),
        }
    }
}
