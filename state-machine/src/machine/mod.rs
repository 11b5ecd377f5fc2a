#![warn(clippy::missing_docs_in_private_items)]

/// Chain state machine.
pub mod chain;
/// Channel state machine.
pub mod channel;
/// Initiator state machine.
pub mod initiator;
/// Initiator Manager state machine.
pub mod initiator_manager;
/// Mediator state machine.
pub mod mediator;
/// Routes utils.
pub mod routes;
/// Secret registry utils .
pub mod secret_registry;
/// Target state machine.
pub mod target;
/// Token network state machine.
pub mod token_network;
/// Common utils.
pub mod utils;
