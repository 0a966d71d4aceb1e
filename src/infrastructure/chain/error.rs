use thiserror::Error;

/// Represents errors that can occur in chain client operations
#[derive(Debug, Clone, Error)]
pub enum ChainClientError {
    /// The websocket could not be opened or was lost
    #[error("Connection error: {0}")]
    ConnectionError(String),
    /// The node answered with a JSON-RPC error object
    #[error("RPC error {code}: {message}")]
    RpcError { code: i64, message: String },
    /// The node answered with something the client cannot interpret
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    /// SCALE data that does not match the runtime's types
    #[error("Undecodable runtime data: {0}")]
    Undecodable(String),
    /// The client's connection task is gone
    #[error("Client closed")]
    Closed,
}

impl From<parity_scale_codec::Error> for ChainClientError {
    fn from(err: parity_scale_codec::Error) -> Self {
        ChainClientError::Undecodable(err.to_string())
    }
}
