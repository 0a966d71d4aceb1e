//! Best-effort decoding of democracy preimages

use std::sync::Arc;

use serde_json::Value;

use crate::domain::models::PreimageCall;
use crate::infrastructure::chain::ChainClient;
use crate::utils::logging;

/// Schemas tried in order against an encoded preimage
pub const PREIMAGE_SCHEMAS: [&str; 2] = ["Proposal", "Call"];

/// Decodes encoded calls through the node's type registry
#[derive(Debug, Clone)]
pub struct PreimageDecoder {
    client: Arc<dyn ChainClient>,
}

impl PreimageDecoder {
    pub fn new(client: Arc<dyn ChainClient>) -> Self {
        Self { client }
    }

    /// Decode a hex encoded call into its section and method
    ///
    /// Never fails: a payload that matches no schema yields
    /// [`PreimageCall::DecodeFailed`].
    pub async fn decode(&self, encoded: &str) -> PreimageCall {
        let bytes = match hex::decode(encoded.trim_start_matches("0x")) {
            Ok(bytes) => bytes,
            Err(e) => {
                logging::log_warning(&format!("Preimage {} is not valid hex: {}", encoded, e));
                return PreimageCall::DecodeFailed;
            }
        };

        let mut last_error = String::new();
        for schema in PREIMAGE_SCHEMAS {
            match self.client.create_type(schema, &bytes).await {
                Ok(decoded) => match section_and_method(&decoded) {
                    Some((section, method)) => return PreimageCall::Decoded { section, method },
                    None => last_error = format!("{} decoded without section/method", schema),
                },
                Err(e) => last_error = format!("{}: {}", schema, e),
            }
        }

        logging::log_warning(&format!("Could not decode preimage: {}", last_error));
        PreimageCall::DecodeFailed
    }
}

fn section_and_method(decoded: &Value) -> Option<(String, String)> {
    let section = decoded.get("section")?.as_str()?;
    let method = decoded.get("method")?.as_str()?;
    Some((section.to_string(), method.to_string()))
}
