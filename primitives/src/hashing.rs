use web3::signing::keccak256;

use crate::types::{
	BalanceHash,
	Bytes,
	LockedAmount,
	Locksroot,
	TokenAmount,
};

/// Derives a `SecretHash` from a `Secret`. Must match the hash the
/// `SecretRegistry` on-chain collaborator uses, so nodes and the chain agree
/// on which lock a revealed secret unlocks.
pub fn hash_secret(secret: &[u8]) -> [u8; 32] {
	keccak256(secret)
}

/// Hashes the three fields of a channel side that a balance proof commits
/// to. Used both when building a new balance proof and when validating one
/// received from a channel partner.
pub fn hash_balance_data(
	transferred_amount: TokenAmount,
	locked_amount: LockedAmount,
	locksroot: Locksroot,
) -> Result<BalanceHash, String> {
	let mut transferred_amount_bytes = [0u8; 32];
	transferred_amount.to_big_endian(&mut transferred_amount_bytes);

	let mut locked_amount_bytes = [0u8; 32];
	locked_amount.to_big_endian(&mut locked_amount_bytes);

	let hash = keccak256(
		&[&transferred_amount_bytes[..], &locked_amount_bytes[..], locksroot.as_bytes()].concat(),
	);
	Ok(BalanceHash::from_slice(&hash))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn hash_secret_matches_keccak256() {
		let secret = Bytes(b"secretsecretsecretsecretsecret12".to_vec());
		let hash = hash_secret(&secret.0);
		assert_eq!(hash.len(), 32);
		assert_eq!(hash, keccak256(&secret.0));
	}
}
