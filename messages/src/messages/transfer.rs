use raiden_primitives::{
	deserializers::{
		h256_from_str,
		signature_from_str,
		u256_from_str,
		u64_from_str,
	},
	hashing::hash_balance_data,
	packing::pack_balance_proof,
	serializers::u256_to_str,
	types::{
		Address,
		BlockExpiration,
		CanonicalIdentifier,
		ChainID,
		Locksroot,
		MessageIdentifier,
		MessageTypeId,
		PaymentIdentifier,
		Secret,
		SecretHash,
		Signature,
		TokenAddress,
		TokenAmount,
		TokenNetworkAddress,
		H256,
		U256,
	},
};
use raiden_state_machine::types::{
	SendLockExpired,
	SendLockedTransfer,
	SendSecretRequest,
	SendSecretReveal,
	SendUnlock,
};
use serde::{
	Deserialize,
	Serialize,
};
use tiny_keccak::{
	Hasher,
	Keccak,
};
use web3::signing::{
	Key,
	SigningError,
};

use super::{
	metadata::Metadata,
	CmdId,
	SignedEnvelopeMessage,
	SignedMessage,
};

/// Requests the secret for `secrethash` from the payer, sent by the target
/// once it has received a `LockedTransfer` it is willing to claim.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SecretRequest {
	#[serde(deserialize_with = "u64_from_str")]
	pub message_identifier: MessageIdentifier,
	pub payment_identifier: PaymentIdentifier,
	#[serde(deserialize_with = "h256_from_str")]
	pub secrethash: SecretHash,
	#[serde(deserialize_with = "u256_from_str", serialize_with = "u256_to_str")]
	pub amount: TokenAmount,
	pub expiration: BlockExpiration,
	#[serde(deserialize_with = "signature_from_str")]
	pub signature: Signature,
}

impl From<SendSecretRequest> for SecretRequest {
	fn from(event: SendSecretRequest) -> Self {
		Self {
			message_identifier: event.message_identifier,
			payment_identifier: event.payment_identifier,
			secrethash: event.secrethash,
			amount: event.amount,
			expiration: event.expiration,
			signature: Signature::from(vec![]),
		}
	}
}

impl SignedMessage for SecretRequest {
	fn bytes_to_sign(&self) -> Vec<u8> {
		let cmd_id: [u8; 1] = CmdId::SecretRequest.into();

		let mut amount = [0u8; 32];
		self.amount.to_big_endian(&mut amount);

		let mut bytes = vec![];
		bytes.extend_from_slice(&cmd_id);
		bytes.extend_from_slice(&self.message_identifier.to_be_bytes());
		bytes.extend_from_slice(&payment_identifier_bytes(self.payment_identifier));
		bytes.extend_from_slice(self.secrethash.as_bytes());
		bytes.extend_from_slice(&amount);
		bytes.extend_from_slice(&self.expiration.to_be_bytes());
		bytes
	}

	fn sign<K: Key>(&mut self, key: &K) -> Result<(), SigningError> {
		self.signature = Signature::from(self.sign_message(key)?.as_vec());
		Ok(())
	}
}

/// Reveals a secret to the recipient, once it is known locally and an
/// action must be performed on the recipient:
///
/// - Payees learn that the lock has been released and the token can be
///   claimed, either on-chain or off-chain.
/// - Payers learn that the payee knows the secret and wants to claim the
///   lock off-chain, so the payer may unlock the lock and send an
///   up-to-date balance proof, avoiding an on-chain unlock.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SecretReveal {
	#[serde(deserialize_with = "u64_from_str")]
	pub message_identifier: MessageIdentifier,
	pub secret: Secret,
	#[serde(deserialize_with = "signature_from_str")]
	pub signature: Signature,
}

impl From<SendSecretReveal> for SecretReveal {
	fn from(event: SendSecretReveal) -> Self {
		Self {
			message_identifier: event.message_identifier,
			secret: event.secret,
			signature: Signature::from(vec![]),
		}
	}
}

impl SignedMessage for SecretReveal {
	fn bytes_to_sign(&self) -> Vec<u8> {
		let cmd_id: [u8; 1] = CmdId::RevealSecret.into();

		let mut bytes = vec![];
		bytes.extend_from_slice(&cmd_id);
		bytes.extend_from_slice(&self.message_identifier.to_be_bytes());
		bytes.extend_from_slice(&self.secret.0);
		bytes
	}

	fn sign<K: Key>(&mut self, key: &K) -> Result<(), SigningError> {
		self.signature = Signature::from(self.sign_message(key)?.as_vec());
		Ok(())
	}
}

/// Informs the recipient that a lock expired without being claimed, freeing
/// up the locked amount it reserved. Carries an up-to-date balance proof
/// with the lock removed from the pending-locks tree.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct LockExpired {
	#[serde(deserialize_with = "u64_from_str")]
	pub message_identifier: MessageIdentifier,
	pub chain_id: ChainID,
	pub token_network_address: TokenNetworkAddress,
	#[serde(deserialize_with = "u256_from_str", serialize_with = "u256_to_str")]
	pub channel_identifier: U256,
	#[serde(deserialize_with = "u256_from_str", serialize_with = "u256_to_str")]
	pub transferred_amount: TokenAmount,
	#[serde(deserialize_with = "u256_from_str", serialize_with = "u256_to_str")]
	pub locked_amount: TokenAmount,
	#[serde(deserialize_with = "h256_from_str")]
	pub locksroot: Locksroot,
	#[serde(deserialize_with = "u256_from_str", serialize_with = "u256_to_str")]
	pub nonce: U256,
	pub recipient: Address,
	#[serde(deserialize_with = "h256_from_str")]
	pub secrethash: SecretHash,
	#[serde(deserialize_with = "signature_from_str")]
	pub signature: Signature,
}

impl From<SendLockExpired> for LockExpired {
	fn from(event: SendLockExpired) -> Self {
		Self {
			message_identifier: event.inner.message_identifier,
			chain_id: event.inner.canonical_identifier.chain_identifier,
			token_network_address: event.inner.canonical_identifier.token_network_address,
			channel_identifier: event.inner.canonical_identifier.channel_identifier,
			transferred_amount: event.balance_proof.transferred_amount,
			locked_amount: event.balance_proof.locked_amount,
			locksroot: event.balance_proof.locksroot,
			recipient: event.inner.recipient,
			secrethash: event.secrethash,
			nonce: event.balance_proof.nonce,
			signature: Signature::from(vec![]),
		}
	}
}

impl SignedMessage for LockExpired {
	fn bytes_to_sign(&self) -> Vec<u8> {
		let balance_hash =
			hash_balance_data(self.transferred_amount, self.locked_amount, self.locksroot)
				.expect("locksroot of a pending balance proof is always 32 bytes");
		pack_balance_proof(
			self.nonce,
			balance_hash,
			self.message_hash(),
			CanonicalIdentifier {
				chain_identifier: self.chain_id,
				token_network_address: self.token_network_address,
				channel_identifier: self.channel_identifier,
			},
			MessageTypeId::BalanceProof,
		)
		.0
	}

	fn sign<K: Key>(&mut self, key: &K) -> Result<(), SigningError> {
		self.signature = Signature::from(self.sign_message(key)?.as_vec());
		Ok(())
	}
}

impl SignedEnvelopeMessage for LockExpired {
	fn message_hash(&self) -> H256 {
		let cmd: [u8; 1] = CmdId::LockExpired.into();

		let mut res: Vec<u8> = Vec::new();
		res.extend_from_slice(&cmd);
		res.extend_from_slice(&self.message_identifier.to_be_bytes());
		res.extend_from_slice(self.recipient.as_bytes());
		res.extend_from_slice(self.secrethash.as_bytes());

		keccak256(&res)
	}
}

/// Sent by a payer to a payee once the payee is known to hold the secret,
/// carrying a balance proof with the payee's lock removed from the pending
/// locks and its amount added to `transferred_amount`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Unlock {
	#[serde(deserialize_with = "u64_from_str")]
	pub message_identifier: MessageIdentifier,
	pub payment_identifier: PaymentIdentifier,
	pub chain_id: ChainID,
	pub token_network_address: TokenNetworkAddress,
	#[serde(deserialize_with = "u256_from_str", serialize_with = "u256_to_str")]
	pub channel_identifier: U256,
	#[serde(deserialize_with = "u256_from_str", serialize_with = "u256_to_str")]
	pub transferred_amount: TokenAmount,
	#[serde(deserialize_with = "u256_from_str", serialize_with = "u256_to_str")]
	pub locked_amount: TokenAmount,
	#[serde(deserialize_with = "h256_from_str")]
	pub locksroot: Locksroot,
	#[serde(deserialize_with = "u256_from_str", serialize_with = "u256_to_str")]
	pub nonce: U256,
	pub secret: Secret,
	#[serde(deserialize_with = "signature_from_str")]
	pub signature: Signature,
}

impl From<SendUnlock> for Unlock {
	fn from(event: SendUnlock) -> Self {
		Self {
			message_identifier: event.inner.message_identifier,
			payment_identifier: event.payment_identifier,
			chain_id: event.inner.canonical_identifier.chain_identifier,
			token_network_address: event.inner.canonical_identifier.token_network_address,
			channel_identifier: event.inner.canonical_identifier.channel_identifier,
			transferred_amount: event.balance_proof.transferred_amount,
			locked_amount: event.balance_proof.locked_amount,
			locksroot: event.balance_proof.locksroot,
			secret: event.secret,
			nonce: event.balance_proof.nonce,
			signature: Signature::from(vec![]),
		}
	}
}

impl SignedMessage for Unlock {
	fn bytes_to_sign(&self) -> Vec<u8> {
		let balance_hash =
			hash_balance_data(self.transferred_amount, self.locked_amount, self.locksroot)
				.expect("locksroot of a pending balance proof is always 32 bytes");
		pack_balance_proof(
			self.nonce,
			balance_hash,
			self.message_hash(),
			CanonicalIdentifier {
				chain_identifier: self.chain_id,
				token_network_address: self.token_network_address,
				channel_identifier: self.channel_identifier,
			},
			MessageTypeId::BalanceProof,
		)
		.0
	}

	fn sign<K: Key>(&mut self, key: &K) -> Result<(), SigningError> {
		self.signature = Signature::from(self.sign_message(key)?.as_vec());
		Ok(())
	}
}

impl SignedEnvelopeMessage for Unlock {
	fn message_hash(&self) -> H256 {
		let cmd: [u8; 1] = CmdId::Unlock.into();

		let mut res: Vec<u8> = Vec::new();
		res.extend_from_slice(&cmd);
		res.extend_from_slice(&self.message_identifier.to_be_bytes());
		res.extend_from_slice(&payment_identifier_bytes(self.payment_identifier));
		res.extend_from_slice(&self.secret.0);

		keccak256(&res)
	}
}

/// A single pending lock as carried on the wire, mirroring
/// `HashTimeLockState` without the locally-computed `encoded` field.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Lock {
	#[serde(deserialize_with = "u256_from_str", serialize_with = "u256_to_str")]
	pub amount: TokenAmount,
	pub expiration: BlockExpiration,
	#[serde(deserialize_with = "h256_from_str")]
	pub secrethash: SecretHash,
}

/// A mediated transfer: locks `lock.amount` until `lock.expiration`,
/// payable to whoever presents the secret for `lock.secrethash` before
/// expiry. Forwarded hop-by-hop from initiator to target, each hop
/// re-signing with its own balance proof and (for mediators) its own fee
/// deducted from `lock.amount`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct LockedTransfer {
	#[serde(deserialize_with = "u64_from_str")]
	pub message_identifier: MessageIdentifier,
	pub payment_identifier: PaymentIdentifier,
	pub chain_id: ChainID,
	pub token_network_address: TokenNetworkAddress,
	#[serde(deserialize_with = "u256_from_str", serialize_with = "u256_to_str")]
	pub channel_identifier: U256,
	#[serde(deserialize_with = "u256_from_str", serialize_with = "u256_to_str")]
	pub transferred_amount: TokenAmount,
	#[serde(deserialize_with = "u256_from_str", serialize_with = "u256_to_str")]
	pub locked_amount: TokenAmount,
	#[serde(deserialize_with = "h256_from_str")]
	pub locksroot: Locksroot,
	pub token: TokenAddress,
	pub recipient: Address,
	pub lock: Lock,
	pub target: Address,
	pub initiator: Address,
	pub metadata: Metadata,
	#[serde(deserialize_with = "u256_from_str", serialize_with = "u256_to_str")]
	pub nonce: U256,
	pub secret: Option<Secret>,
	#[serde(deserialize_with = "signature_from_str")]
	pub signature: Signature,
}

impl From<SendLockedTransfer> for LockedTransfer {
	fn from(event: SendLockedTransfer) -> Self {
		let metadata: Metadata = event.clone().into();
		let transfer = event.transfer;
		Self {
			message_identifier: event.inner.message_identifier,
			payment_identifier: transfer.payment_identifier,
			chain_id: event.inner.canonical_identifier.chain_identifier,
			token_network_address: event.inner.canonical_identifier.token_network_address,
			channel_identifier: event.inner.canonical_identifier.channel_identifier,
			transferred_amount: transfer.balance_proof.transferred_amount,
			locked_amount: transfer.balance_proof.locked_amount,
			locksroot: transfer.balance_proof.locksroot,
			secret: transfer.secret,
			nonce: transfer.balance_proof.nonce,
			signature: Signature::from(vec![]),
			token: transfer.token,
			recipient: event.inner.recipient,
			lock: Lock {
				amount: transfer.lock.amount,
				expiration: transfer.lock.expiration,
				secrethash: transfer.lock.secrethash,
			},
			target: transfer.target,
			initiator: transfer.initiator,
			metadata,
		}
	}
}

impl SignedMessage for LockedTransfer {
	fn bytes_to_sign(&self) -> Vec<u8> {
		let balance_hash =
			hash_balance_data(self.transferred_amount, self.locked_amount, self.locksroot)
				.expect("locksroot of a pending balance proof is always 32 bytes");
		pack_balance_proof(
			self.nonce,
			balance_hash,
			self.message_hash(),
			CanonicalIdentifier {
				chain_identifier: self.chain_id,
				token_network_address: self.token_network_address,
				channel_identifier: self.channel_identifier,
			},
			MessageTypeId::BalanceProof,
		)
		.0
	}

	fn sign<K: Key>(&mut self, key: &K) -> Result<(), SigningError> {
		self.signature = Signature::from(self.sign_message(key)?.as_vec());
		Ok(())
	}
}

impl SignedEnvelopeMessage for LockedTransfer {
	fn message_hash(&self) -> H256 {
		let cmd: [u8; 1] = CmdId::LockedTransfer.into();
		let metadata_hash = self.metadata.hash().unwrap_or_default();

		let mut res: Vec<u8> = Vec::new();
		res.extend_from_slice(&cmd);
		res.extend_from_slice(&self.message_identifier.to_be_bytes());
		res.extend_from_slice(&payment_identifier_bytes(self.payment_identifier));
		res.extend_from_slice(&lock_bytes(&self.lock));
		res.extend_from_slice(self.token.as_bytes());
		res.extend_from_slice(self.initiator.as_bytes());
		res.extend_from_slice(self.target.as_bytes());
		res.extend_from_slice(&metadata_hash);

		keccak256(&res)
	}
}

/// A `LockedTransfer` sent back towards the initiator by a mediator that
/// has no usable forward route, carrying the same lock and secrethash so
/// that the initiator may retry via a different path.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct RefundTransfer {
	#[serde(deserialize_with = "u64_from_str")]
	pub message_identifier: MessageIdentifier,
	pub payment_identifier: PaymentIdentifier,
	pub chain_id: ChainID,
	pub token_network_address: TokenNetworkAddress,
	#[serde(deserialize_with = "u256_from_str", serialize_with = "u256_to_str")]
	pub channel_identifier: U256,
	#[serde(deserialize_with = "u256_from_str", serialize_with = "u256_to_str")]
	pub transferred_amount: TokenAmount,
	#[serde(deserialize_with = "u256_from_str", serialize_with = "u256_to_str")]
	pub locked_amount: TokenAmount,
	#[serde(deserialize_with = "h256_from_str")]
	pub locksroot: Locksroot,
	pub token: TokenAddress,
	pub recipient: Address,
	pub lock: Lock,
	pub target: Address,
	pub initiator: Address,
	pub metadata: Metadata,
	#[serde(deserialize_with = "u256_from_str", serialize_with = "u256_to_str")]
	pub nonce: U256,
	#[serde(deserialize_with = "signature_from_str")]
	pub signature: Signature,
}

impl From<LockedTransfer> for RefundTransfer {
	fn from(message: LockedTransfer) -> Self {
		Self {
			message_identifier: message.message_identifier,
			payment_identifier: message.payment_identifier,
			chain_id: message.chain_id,
			token_network_address: message.token_network_address,
			channel_identifier: message.channel_identifier,
			transferred_amount: message.transferred_amount,
			locked_amount: message.locked_amount,
			locksroot: message.locksroot,
			token: message.token,
			recipient: message.recipient,
			lock: message.lock,
			target: message.target,
			initiator: message.initiator,
			metadata: message.metadata,
			nonce: message.nonce,
			signature: Signature::from(vec![]),
		}
	}
}

impl SignedMessage for RefundTransfer {
	fn bytes_to_sign(&self) -> Vec<u8> {
		let balance_hash =
			hash_balance_data(self.transferred_amount, self.locked_amount, self.locksroot)
				.expect("locksroot of a pending balance proof is always 32 bytes");
		pack_balance_proof(
			self.nonce,
			balance_hash,
			self.message_hash(),
			CanonicalIdentifier {
				chain_identifier: self.chain_id,
				token_network_address: self.token_network_address,
				channel_identifier: self.channel_identifier,
			},
			MessageTypeId::BalanceProof,
		)
		.0
	}

	fn sign<K: Key>(&mut self, key: &K) -> Result<(), SigningError> {
		self.signature = Signature::from(self.sign_message(key)?.as_vec());
		Ok(())
	}
}

impl SignedEnvelopeMessage for RefundTransfer {
	fn message_hash(&self) -> H256 {
		let cmd: [u8; 1] = CmdId::RefundTransfer.into();
		let metadata_hash = self.metadata.hash().unwrap_or_default();

		let mut res: Vec<u8> = Vec::new();
		res.extend_from_slice(&cmd);
		res.extend_from_slice(&self.message_identifier.to_be_bytes());
		res.extend_from_slice(&payment_identifier_bytes(self.payment_identifier));
		res.extend_from_slice(&lock_bytes(&self.lock));
		res.extend_from_slice(self.token.as_bytes());
		res.extend_from_slice(self.initiator.as_bytes());
		res.extend_from_slice(self.target.as_bytes());
		res.extend_from_slice(&metadata_hash);

		keccak256(&res)
	}
}

/// A single-hop transfer settled directly between channel partners,
/// without a hash-time-lock: the balance proof alone moves value, which is
/// only safe because there is no further hop to mediate the atomicity of.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct DirectTransfer {
	#[serde(deserialize_with = "u64_from_str")]
	pub message_identifier: MessageIdentifier,
	pub payment_identifier: PaymentIdentifier,
	pub chain_id: ChainID,
	pub token_network_address: TokenNetworkAddress,
	#[serde(deserialize_with = "u256_from_str", serialize_with = "u256_to_str")]
	pub channel_identifier: U256,
	#[serde(deserialize_with = "u256_from_str", serialize_with = "u256_to_str")]
	pub transferred_amount: TokenAmount,
	#[serde(deserialize_with = "u256_from_str", serialize_with = "u256_to_str")]
	pub locked_amount: TokenAmount,
	#[serde(deserialize_with = "h256_from_str")]
	pub locksroot: Locksroot,
	pub token: TokenAddress,
	pub recipient: Address,
	#[serde(deserialize_with = "u256_from_str", serialize_with = "u256_to_str")]
	pub nonce: U256,
	#[serde(deserialize_with = "signature_from_str")]
	pub signature: Signature,
}

impl SignedMessage for DirectTransfer {
	fn bytes_to_sign(&self) -> Vec<u8> {
		let balance_hash =
			hash_balance_data(self.transferred_amount, self.locked_amount, self.locksroot)
				.expect("locksroot of a pending balance proof is always 32 bytes");
		pack_balance_proof(
			self.nonce,
			balance_hash,
			self.message_hash(),
			CanonicalIdentifier {
				chain_identifier: self.chain_id,
				token_network_address: self.token_network_address,
				channel_identifier: self.channel_identifier,
			},
			MessageTypeId::BalanceProof,
		)
		.0
	}

	fn sign<K: Key>(&mut self, key: &K) -> Result<(), SigningError> {
		self.signature = Signature::from(self.sign_message(key)?.as_vec());
		Ok(())
	}
}

impl SignedEnvelopeMessage for DirectTransfer {
	fn message_hash(&self) -> H256 {
		let cmd: [u8; 1] = CmdId::DirectTransfer.into();

		let mut res: Vec<u8> = Vec::new();
		res.extend_from_slice(&cmd);
		res.extend_from_slice(&self.message_identifier.to_be_bytes());
		res.extend_from_slice(&payment_identifier_bytes(self.payment_identifier));
		res.extend_from_slice(self.token.as_bytes());

		keccak256(&res)
	}
}

fn payment_identifier_bytes(identifier: PaymentIdentifier) -> Vec<u8> {
	identifier.as_bytes()
}

fn lock_bytes(lock: &Lock) -> Vec<u8> {
	let mut amount = [0u8; 32];
	lock.amount.to_big_endian(&mut amount);

	let mut bytes = vec![];
	bytes.extend_from_slice(&lock.expiration.to_be_bytes());
	bytes.extend_from_slice(&amount);
	bytes.extend_from_slice(lock.secrethash.as_bytes());
	bytes
}

fn keccak256(data: &[u8]) -> H256 {
	let mut keccak = Keccak::v256();
	let mut result = [0u8; 32];
	keccak.update(data);
	keccak.finalize(&mut result);
	H256::from_slice(&result)
}

#[cfg(test)]
mod tests {
	use raiden_primitives::types::Bytes;
	use secp256k1::SecretKey;
	use web3::signing::SecretKeyRef;

	use super::*;

	fn test_key() -> SecretKey {
		SecretKey::from_slice(&[0xcd; 32]).expect("32 bytes is a valid secret key")
	}

	fn sample_lock() -> Lock {
		Lock { amount: U256::from(100u64), expiration: BlockExpiration::from(50u32), secrethash: H256::zero() }
	}

	fn sample_locked_transfer(
		message_identifier: u64,
		payment_identifier: PaymentIdentifier,
		nonce: U256,
		transferred_amount: U256,
		amount: U256,
	) -> LockedTransfer {
		LockedTransfer {
			message_identifier,
			payment_identifier,
			chain_id: ChainID::Mainnet,
			token_network_address: Address::zero(),
			channel_identifier: U256::from(1u64),
			transferred_amount,
			locked_amount: amount,
			locksroot: H256::from_low_u64_be(1),
			token: Address::zero(),
			recipient: Address::zero(),
			lock: Lock { amount, ..sample_lock() },
			target: Address::zero(),
			initiator: Address::zero(),
			metadata: Metadata { routes: vec![] },
			nonce,
			secret: None,
			signature: Signature::from(vec![]),
		}
	}

	#[test]
	fn signs_and_recovers_locked_transfer_signer() {
		let key = test_key();
		let key_ref = SecretKeyRef::new(&key);
		let mut message = sample_locked_transfer(1, PaymentIdentifier::from(1u64), U256::from(1u64), U256::zero(), U256::from(100u64));

		message.sign(&key_ref).expect("signing should not fail");

		let bytes = message.bytes_to_sign();
		let hash = web3::signing::keccak256(&bytes);
		let signature_bytes = message.signature.0.clone();
		let signature = web3::signing::Signature {
			r: H256::from_slice(&signature_bytes[0..32]),
			s: H256::from_slice(&signature_bytes[32..64]),
			v: signature_bytes[64] as u64,
		};
		let recovered = web3::signing::recover(&hash, signature.r.as_bytes(), signature.s.as_bytes(), signature.v as i32)
			.expect("signature should recover a public key");
		assert_eq!(recovered, key_ref.address());
	}

	#[test]
	fn boundary_values_round_trip_through_serialization() {
		let boundary_identifiers = [PaymentIdentifier::from(0u32), PaymentIdentifier::from(u64::MAX)];
		let boundary_nonces = [U256::from(1u64), U256::MAX];
		let boundary_amounts = [U256::zero(), U256::MAX];

		for &identifier in &boundary_identifiers {
			for &nonce in &boundary_nonces {
				for &amount in &boundary_amounts {
					let message = sample_locked_transfer(u64::MAX, identifier, nonce, amount, amount);
					let json = serde_json::to_string(&message).expect("should serialize");
					let decoded: LockedTransfer = serde_json::from_str(&json).expect("should round-trip");
					assert_eq!(decoded, message);
				}
			}
		}
	}

	#[test]
	fn refund_transfer_carries_original_lock() {
		let locked = sample_locked_transfer(1, PaymentIdentifier::from(1u64), U256::from(1u64), U256::zero(), U256::from(100u64));
		let refund = RefundTransfer::from(locked.clone());
		assert_eq!(refund.lock, locked.lock);
		assert_eq!(refund.locksroot, locked.locksroot);
	}

	#[test]
	fn refund_transfer_boundary_values_round_trip_through_serialization() {
		let boundary_identifiers = [PaymentIdentifier::from(0u32), PaymentIdentifier::from(u64::MAX)];
		let boundary_nonces = [U256::from(1u64), U256::MAX];
		let boundary_amounts = [U256::zero(), U256::MAX];

		for &identifier in &boundary_identifiers {
			for &nonce in &boundary_nonces {
				for &amount in &boundary_amounts {
					let locked = sample_locked_transfer(u64::MAX, identifier, nonce, amount, amount);
					let message = RefundTransfer::from(locked);
					let json = serde_json::to_string(&message).expect("should serialize");
					let decoded: RefundTransfer = serde_json::from_str(&json).expect("should round-trip");
					assert_eq!(decoded, message);
				}
			}
		}
	}

	fn sample_direct_transfer(
		message_identifier: u64,
		payment_identifier: PaymentIdentifier,
		nonce: U256,
		transferred_amount: U256,
	) -> DirectTransfer {
		DirectTransfer {
			message_identifier,
			payment_identifier,
			chain_id: ChainID::Mainnet,
			token_network_address: Address::zero(),
			channel_identifier: U256::from(1u64),
			transferred_amount,
			locked_amount: U256::zero(),
			locksroot: H256::zero(),
			token: Address::zero(),
			recipient: Address::zero(),
			nonce,
			signature: Signature::from(vec![]),
		}
	}

	#[test]
	fn direct_transfer_message_hash_is_deterministic() {
		let message = sample_direct_transfer(1, PaymentIdentifier::from(1u64), U256::from(1u64), U256::from(10u64));
		assert_eq!(message.message_hash(), message.message_hash());
	}

	#[test]
	fn direct_transfer_boundary_values_round_trip_through_serialization() {
		let boundary_identifiers = [PaymentIdentifier::from(0u32), PaymentIdentifier::from(u64::MAX)];
		let boundary_nonces = [U256::from(1u64), U256::MAX];
		let boundary_amounts = [U256::zero(), U256::MAX];

		for &identifier in &boundary_identifiers {
			for &nonce in &boundary_nonces {
				for &transferred_amount in &boundary_amounts {
					let message = sample_direct_transfer(u64::MAX, identifier, nonce, transferred_amount);
					let json = serde_json::to_string(&message).expect("should serialize");
					let decoded: DirectTransfer = serde_json::from_str(&json).expect("should round-trip");
					assert_eq!(decoded, message);
				}
			}
		}
	}

	#[test]
	fn secret_reveal_bytes_embed_secret() {
		let secret = Bytes(vec![9u8; 32]);
		let message = SecretReveal { message_identifier: 1, secret: secret.clone(), signature: Signature::from(vec![]) };
		let bytes = message.bytes_to_sign();
		assert!(bytes.ends_with(&secret.0));
	}
}
