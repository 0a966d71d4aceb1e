use serde::{Deserialize, Serialize};

/// An indexed network, identified by its node endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chain {
    pub id: i32,
    /// Websocket endpoint of the node serving this chain
    pub ws_endpoint: String,
}

/// An on-chain address, created lazily on first reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: i32,
    pub chain_id: i32,
    pub address: String,
}

/// A processed block
///
/// Written once per block; later patched only to record a processing error.
/// Other entities reference the block row id in their `modified_at` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: i32,
    pub chain_id: i32,
    pub hash: String,
    pub number: i64,
    pub error: bool,
    pub error_message: Option<String>,
}

impl Block {
    /// Creates a block row that has not been stored yet
    pub fn new(chain_id: i32, hash: String, number: i64) -> Self {
        Self {
            id: 0,
            chain_id,
            hash,
            number,
            error: false,
            error_message: None,
        }
    }
}
