#![warn(clippy::missing_docs_in_private_items)]

/// Message decoding from the generic transport envelope.
pub mod decode;
/// Off-chain wire messages exchanged between nodes.
pub mod messages;
