//! Governance Indexer Module
//!
//! Walks a chain backward from a start height and reconciles every block's
//! governance activity into the store.

pub mod block_processor;
pub mod chain_walker;
pub mod retry_handler;
pub mod session;

use std::sync::Arc;

pub use block_processor::{BlockOutcome, BlockProcessor};
pub use chain_walker::{ChainWalker, WalkSummary};
pub use retry_handler::RetryHandler;
pub use session::IndexingSession;

use crate::config::IndexerConfig;
use crate::domain::errors::BlockProcessorError;
use crate::infrastructure::chain::ChainClient;
use crate::infrastructure::persistence::GovernanceStore;

/// Index the chain served by `client` over the configured height range
pub async fn index_chain(
    client: Arc<dyn ChainClient>,
    store: Arc<dyn GovernanceStore>,
    config: &IndexerConfig,
) -> Result<WalkSummary, BlockProcessorError> {
    let session = IndexingSession::open(client, store).await?;
    let watcher = session.watch_connection();

    let walker = ChainWalker::new(session, config);
    let result = walker.walk(config.from_height, config.to_height).await;

    watcher.abort();
    result
}
