//! Chain data source
//!
//! The engine talks to a node only through [`ChainClient`]. Extrinsics and
//! event records are handed over in their human-readable JSON rendering;
//! typing them is the job of `domain::services::call_decoder`.

pub mod client;
mod error;
mod runtime;
mod scale;
pub mod ws_client;

pub use client::{ChainClient, ConnectionState, SignedBlock};
pub use error::ChainClientError;
pub use ws_client::WsChainClient;
