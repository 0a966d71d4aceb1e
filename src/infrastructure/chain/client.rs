use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::watch;

use super::error::ChainClientError;

/// Lifecycle of the node connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Connected,
    Disconnected,
}

/// A block as served by the node
#[derive(Debug, Clone, PartialEq)]
pub struct SignedBlock {
    pub hash: String,
    pub number: u64,
    pub parent_hash: String,
    /// Rendered extrinsics in block order
    pub extrinsics: Vec<Value>,
}

/// Trait for chain data sources
#[async_trait]
pub trait ChainClient: Send + Sync + std::fmt::Debug {
    /// Endpoint this client is bound to
    fn endpoint(&self) -> &str;

    /// Subscribe to connection lifecycle changes
    fn connection_state(&self) -> watch::Receiver<ConnectionState>;

    /// Height of the current chain head
    async fn latest_height(&self) -> Result<u64, ChainClientError>;

    /// Get block hash by height
    async fn block_hash(&self, height: u64) -> Result<String, ChainClientError>;

    /// Get block by hash
    async fn block(&self, hash: &str) -> Result<SignedBlock, ChainClientError>;

    /// Get the rendered event records emitted in the given block
    async fn events(&self, hash: &str) -> Result<Vec<Value>, ChainClientError>;

    /// Decode `bytes` as the runtime type named `schema`
    async fn create_type(&self, schema: &str, bytes: &[u8]) -> Result<Value, ChainClientError>;
}
