use crate::messages::IncomingMessage;

/// Errors that can occur while decoding a message from the wire.
#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
	#[error("could not parse message body: {0}")]
	Malformed(#[from] serde_json::Error),
}

/// Decodes the JSON body handed over by the `Transport` collaborator into
/// the `IncomingMessage` the core dispatches on.
pub struct MessageDecoder;

impl MessageDecoder {
	pub fn decode(body: &str) -> Result<IncomingMessage, DecodeError> {
		Ok(serde_json::from_str(body)?)
	}
}

#[cfg(test)]
mod tests {
	use raiden_primitives::types::Bytes;

	use super::*;
	use crate::messages::{
		MessageInner,
		SecretReveal,
	};

	#[test]
	fn decodes_secret_reveal() {
		let incoming = IncomingMessage {
			message_identifier: 1,
			inner: MessageInner::SecretReveal(SecretReveal {
				message_identifier: 1,
				secret: Bytes(vec![7u8; 32]),
				signature: vec![1, 2, 3],
			}),
		};
		let body = serde_json::to_string(&incoming).expect("should encode");

		let decoded = MessageDecoder::decode(&body).expect("should decode");
		match decoded.inner {
			MessageInner::SecretReveal(reveal) => {
				assert_eq!(reveal.message_identifier, 1);
				assert_eq!(reveal.secret, Bytes(vec![7u8; 32]));
			},
			_ => panic!("expected SecretReveal"),
		}
	}

	#[test]
	fn rejects_malformed_body() {
		assert!(MessageDecoder::decode("not json").is_err());
	}
}
