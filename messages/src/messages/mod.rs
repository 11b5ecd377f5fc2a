use raiden_primitives::types::{
	Address,
	AddressMetadata,
	MessageIdentifier,
	QueueIdentifier,
};
use serde::{
	Deserialize,
	Serialize,
};
use web3::signing::{
	Key,
	Signature,
	SigningError,
};

mod metadata;
mod transfer;

pub use metadata::*;
pub use transfer::*;

/// Identifier for off-chain messages.
///
/// These magic numbers are prepended to the signed byte record of a message
/// so that a signature on one message type cannot be replayed as a
/// signature on another.
pub(crate) enum CmdId {
	Processed = 0,
	SecretRequest = 3,
	Unlock = 4,
	LockedTransfer = 7,
	RevealSecret = 11,
	Delivered = 12,
	LockExpired = 13,
	RefundTransfer = 14,
	DirectTransfer = 15,
}

impl From<CmdId> for [u8; 1] {
	fn from(val: CmdId) -> Self {
		(val as u8).to_be_bytes()
	}
}

/// An enum containing all message types exchanged between nodes for the
/// mediated-transfer core. `DirectTransfer`, `LockedTransfer` and
/// `RefundTransfer` correspond to the `Signer`/`Transport` collaborator
/// interfaces; `Processed`/`Delivered` are transport-level acknowledgements
/// that the core treats as no-ops once received.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MessageInner {
	LockedTransfer(LockedTransfer),
	RefundTransfer(RefundTransfer),
	DirectTransfer(DirectTransfer),
	LockExpired(LockExpired),
	SecretRequest(SecretRequest),
	SecretReveal(SecretReveal),
	Unlock(Unlock),
	Processed(Processed),
	Delivered(Delivered),
}

impl MessageInner {
	/// Returns the string type name of the message, used as the `type`
	/// discriminant in the canonical mapping representation.
	pub fn type_name(&self) -> &'static str {
		match self {
			MessageInner::LockedTransfer(_) => "LockedTransfer",
			MessageInner::RefundTransfer(_) => "RefundTransfer",
			MessageInner::DirectTransfer(_) => "DirectTransfer",
			MessageInner::LockExpired(_) => "LockExpired",
			MessageInner::SecretRequest(_) => "SecretRequest",
			MessageInner::SecretReveal(_) => "SecretReveal",
			MessageInner::Unlock(_) => "Unlock",
			MessageInner::Processed(_) => "Processed",
			MessageInner::Delivered(_) => "Delivered",
		}
	}
}

/// A `Processed` acknowledgement, confirming that a message was received
/// and handled by the recipient's core.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Processed {
	pub message_identifier: MessageIdentifier,
	pub signature: Vec<u8>,
}

/// A `Delivered` acknowledgement, confirming that a message reached the
/// recipient's transport layer (but not necessarily its core).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Delivered {
	pub delivered_message_identifier: MessageIdentifier,
	pub signature: Vec<u8>,
}

/// Message to be handed to the `Transport` collaborator for delivery to the
/// partner node.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct OutgoingMessage {
	pub message_identifier: MessageIdentifier,
	pub recipient: Address,
	pub recipient_metadata: Option<AddressMetadata>,
	#[serde(flatten)]
	pub inner: MessageInner,
}

impl OutgoingMessage {
	/// Identifies the queue this message belongs to. Messages within a
	/// queue are delivered in order; queues for distinct recipients are
	/// independent.
	pub fn queue_identifier(&self, canonical_identifier: raiden_primitives::types::CanonicalIdentifier) -> QueueIdentifier {
		QueueIdentifier { recipient: self.recipient, canonical_identifier }
	}
}

/// Message received from the partner node via the `Transport` collaborator.
/// Delivery is at-least-once; the core must treat duplicates idempotently.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IncomingMessage {
	pub message_identifier: MessageIdentifier,
	#[serde(flatten)]
	pub inner: MessageInner,
}

/// Trait implemented by messages that must be signed by the `Signer`
/// collaborator before being sent out.
///
/// `K` stands in for the `Signer` interface of the core: anything that can
/// produce a 65-byte ECDSA signature over an arbitrary message hash, which
/// is exactly what `web3::signing::Key` already provides. Key management
/// itself (how `K` comes to hold a private key) is out of scope for the
/// core.
pub trait SignedMessage {
	/// Returns the byte record to be hashed and signed. This is the message
	/// layout minus the trailing signature field.
	fn bytes_to_sign(&self) -> Vec<u8>;

	/// Signs the message in place using `key`.
	fn sign<K: Key>(&mut self, key: &K) -> Result<(), SigningError>;

	/// Computes the signature over the message's byte record without
	/// mutating it.
	fn sign_message<K: Key>(&self, key: &K) -> Result<Signature, SigningError> {
		let bytes = self.bytes_to_sign();
		key.sign_message(&bytes)
	}
}

/// A signed message that carries a balance proof. Its `message_hash` is
/// folded into the balance-proof packing so that a balance proof cannot be
/// replayed across message types.
pub trait SignedEnvelopeMessage: SignedMessage {
	fn message_hash(&self) -> raiden_primitives::types::H256;
}

/// Convert a `Send*` state-machine event into a signed `OutgoingMessage`.
#[macro_export]
macro_rules! to_message {
	( $send_message_event:ident, $key:expr, $message_type:tt ) => {{
		let message_identifier = $send_message_event.inner.message_identifier;
		let recipient = $send_message_event.inner.recipient;
		let recipient_metadata = $send_message_event.inner.recipient_metadata.clone();
		let mut message: $message_type = $send_message_event.into();
		let _ = $crate::messages::SignedMessage::sign(&mut message, $key);
		$crate::messages::OutgoingMessage {
			message_identifier,
			recipient,
			recipient_metadata,
			inner: $crate::messages::MessageInner::$message_type(message),
		}
	}};
}
