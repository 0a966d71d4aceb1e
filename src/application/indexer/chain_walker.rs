//! Backward walk over the chain through parent-hash links

use std::time::Instant;

use crate::config::IndexerConfig;
use crate::domain::errors::BlockProcessorError;
use crate::infrastructure::chain::SignedBlock;
use crate::utils::logging;

use super::block_processor::{BlockOutcome, BlockProcessor};
use super::retry_handler::RetryHandler;
use super::session::IndexingSession;

/// Counters of a finished walk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkSummary {
    pub indexed: u64,
    pub skipped: u64,
    pub failed: u64,
}

impl WalkSummary {
    fn record(&mut self, outcome: BlockOutcome) {
        match outcome {
            BlockOutcome::Indexed => self.indexed += 1,
            BlockOutcome::Skipped => self.skipped += 1,
            BlockOutcome::Failed => self.failed += 1,
        }
    }
}

/// Walks from a start height down to a floor height, one block at a time
#[derive(Debug)]
pub struct ChainWalker {
    session: IndexingSession,
    processor: BlockProcessor,
    retry_handler: RetryHandler,
}

impl ChainWalker {
    pub fn new(session: IndexingSession, config: &IndexerConfig) -> Self {
        let retry_handler = RetryHandler::with_config(config.fetch_retries, config.fetch_retry_delay_ms);
        Self {
            processor: BlockProcessor::new(session.clone(), retry_handler.clone()),
            retry_handler,
            session,
        }
    }

    /// Process every block from `from_height` (default: the head) down to
    /// `to_height`, inclusive
    ///
    /// Each block is fully processed before its parent is fetched. The walk
    /// stops at genesis.
    pub async fn walk(&self, from_height: Option<u64>, to_height: u64) -> Result<WalkSummary, BlockProcessorError> {
        let endpoint = self.session.client.endpoint();
        let from_height = match from_height {
            Some(height) => height,
            None => {
                self.retry_handler
                    .execute_with_retry_and_logging(|| self.session.client.latest_height(), "Fetching chain head", endpoint)
                    .await?
            }
        };

        let started = Instant::now();
        let mut summary = WalkSummary::default();
        if from_height < to_height {
            logging::log_warning(&format!(
                "Start height {} is below floor height {}, nothing to index",
                from_height, to_height
            ));
            return Ok(summary);
        }

        logging::log_info(&format!(
            "[{}] Walking from block {} down to block {}",
            endpoint, from_height, to_height
        ));

        let mut hash = self
            .retry_handler
            .execute_with_retry_and_logging(
                || self.session.client.block_hash(from_height),
                &format!("Fetching hash of block {}", from_height),
                endpoint,
            )
            .await?;

        loop {
            let block = self.fetch_block(&hash).await?;
            if block.number < to_height {
                break;
            }

            match self.processor.process_block(&block).await {
                Ok(outcome) => summary.record(outcome),
                Err(e) => {
                    logging::log_error(&format!(
                        "Could not process block {} ({}): {}",
                        block.number, block.hash, e
                    ));
                    summary.failed += 1;
                }
            }

            if block.number == 0 || block.number == to_height {
                break;
            }
            hash = block.parent_hash;
        }

        logging::log_info(&format!(
            "[{}] Walk finished in {}s: {} indexed, {} skipped, {} failed",
            endpoint,
            started.elapsed().as_secs(),
            summary.indexed,
            summary.skipped,
            summary.failed
        ));
        Ok(summary)
    }

    async fn fetch_block(&self, hash: &str) -> Result<SignedBlock, BlockProcessorError> {
        Ok(self
            .retry_handler
            .execute_with_retry_and_logging(
                || self.session.client.block(hash),
                &format!("Fetching block {}", hash),
                self.session.client.endpoint(),
            )
            .await?)
    }
}
