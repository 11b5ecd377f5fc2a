use std::collections::HashMap;

use raiden_primitives::types::{
	Address,
	AddressMetadata,
};
use raiden_state_machine::types::SendLockedTransfer;
use serde::{
	Deserialize,
	Serialize,
};
use web3::signing::keccak256;

/// Describes one hop of the route a `LockedTransfer` travelled, along with
/// the address metadata the next hop needs to reach the node after it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct RouteMetadata {
	pub route: Vec<Address>,
	pub address_metadata: HashMap<Address, AddressMetadata>,
}

/// Carried alongside a `LockedTransfer` so that mediating nodes can forward
/// routing information without the core needing to look it up again.
/// Mediating nodes must treat this as a read-only, opaque structure: it is
/// produced by the initiator and is not reinterpreted along the path.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
	pub routes: Vec<RouteMetadata>,
}

impl Metadata {
	/// Hashes the canonical JSON encoding of the metadata. Used to fold
	/// routing metadata into a message's signed byte record without
	/// reproducing it verbatim in every signature.
	pub fn hash(&self) -> Result<Vec<u8>, String> {
		let value = serde_json::to_value(self)
			.map_err(|e| format!("Could not convert metadata to JSON: {:?}", e))?;
		let data = canonical_json::to_string(&value)
			.map_err(|e| format!("Could not canonicalize json: {:?}", e))?;

		Ok(keccak256(data.as_bytes()).to_vec())
	}
}

impl From<SendLockedTransfer> for Metadata {
	fn from(event: SendLockedTransfer) -> Self {
		let routes = event
			.transfer
			.route_states
			.into_iter()
			.map(|r| RouteMetadata { route: r.route, address_metadata: r.address_to_metadata })
			.collect();
		Self { routes }
	}
}
