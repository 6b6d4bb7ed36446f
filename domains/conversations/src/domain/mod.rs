//! Domain layer: entities, the status state machine, webhook events, and the dispatcher

pub mod dispatcher;
pub mod entities;
pub mod events;
pub mod state;
