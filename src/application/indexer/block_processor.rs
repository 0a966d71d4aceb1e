//! Block processor for handling individual block processing operations

use std::time::Instant;

use crate::domain::errors::BlockProcessorError;
use crate::domain::models::Block;
use crate::domain::services::call_decoder::{decode_events, decode_extrinsics};
use crate::domain::services::{BlockEvents, CallContext};
use crate::infrastructure::chain::SignedBlock;
use crate::utils::logging;

use super::retry_handler::RetryHandler;
use super::session::IndexingSession;

/// What happened to a block handed to the processor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockOutcome {
    /// The block was already stored
    Skipped,
    Indexed,
    /// Reconciliation failed; the error is recorded on the block row
    Failed,
}

/// Handles processing of individual blocks
#[derive(Debug, Clone)]
pub struct BlockProcessor {
    session: IndexingSession,
    retry_handler: RetryHandler,
}

impl BlockProcessor {
    pub fn new(session: IndexingSession, retry_handler: RetryHandler) -> Self {
        Self {
            session,
            retry_handler,
        }
    }

    /// Process a single block
    ///
    /// Reconciliation errors do not escape: they are stored on the block
    /// row. Failures to fetch the block's events or to read or write that
    /// row are returned, and leave no row behind so a later run picks the
    /// block up again.
    pub async fn process_block(&self, block: &SignedBlock) -> Result<BlockOutcome, BlockProcessorError> {
        let chain_id = self.session.chain.id;
        let store = &self.session.store;

        // 1. Idempotence guard
        if store.block_exists(chain_id, &block.hash).await? {
            logging::log_debug(&format!(
                "Block {} ({}) already processed, skipping",
                block.number, block.hash
            ));
            return Ok(BlockOutcome::Skipped);
        }

        let started = Instant::now();
        logging::log_debug(&format!("Processing block {} ({})", block.number, block.hash));

        // 2. Fetch events before anything is written
        let client = &self.session.client;
        let records = self
            .retry_handler
            .execute_with_retry_and_logging(
                || client.events(&block.hash),
                &format!("Fetching events of block {}", block.number),
                client.endpoint(),
            )
            .await?;

        // 3. Store the block row other entities point at
        let mut stored = store
            .insert_block(Block::new(chain_id, block.hash.clone(), block.number as i64))
            .await?;

        // 4. Reconcile its extrinsics
        let outcome = match self.reconcile_block(&stored, block, &records).await {
            Ok(()) => BlockOutcome::Indexed,
            Err(e) => {
                logging::log_error(&format!(
                    "Error processing block {} ({}): {}",
                    block.number, block.hash, e
                ));
                stored.error = true;
                stored.error_message = Some(e.to_string());
                store.update_block(&stored).await?;
                BlockOutcome::Failed
            }
        };

        logging::log_info(&format!(
            "Block {}: {} extrinsics in {}ms",
            block.number,
            block.extrinsics.len(),
            started.elapsed().as_millis()
        ));
        Ok(outcome)
    }

    async fn reconcile_block(
        &self,
        stored: &Block,
        block: &SignedBlock,
        records: &[serde_json::Value],
    ) -> Result<(), BlockProcessorError> {
        let events = BlockEvents::correlate(decode_events(records)?);
        let extrinsics = decode_extrinsics(&block.extrinsics)?;

        // Extrinsics run in index order; failure filtering depends on it
        for extrinsic in &extrinsics {
            if events.is_failed(extrinsic.index) {
                logging::log_debug(&format!(
                    "Skipping failed extrinsic {}-{} ({}.{})",
                    block.number, extrinsic.index, extrinsic.call.section, extrinsic.call.method
                ));
                continue;
            }

            let ctx = CallContext {
                block: stored,
                signer: extrinsic.signer.as_deref(),
                events: events.for_extrinsic(extrinsic.index),
                initialization_events: events.initialization(),
            };
            self.session.dispatcher.dispatch(&extrinsic.call, &ctx).await?;
        }
        Ok(())
    }
}
