//! Reconciliation of decoded governance activity into the read model
//!
//! Every handler follows the same upsert policy. An entity is looked up by
//! its natural key within the chain. A missing entity is inserted with the
//! status derived from the triggering call or event. An existing one always
//! gets its non-status fields refreshed, while `status` and `modified_at`
//! move only when the current block is strictly higher than the block
//! recorded in `modified_at`. That makes the final status independent of the
//! order blocks are processed in.

mod bounty;
mod council;
mod democracy;
mod initialization;
mod tips;
mod treasury;

use std::sync::Arc;

use crate::domain::errors::ReconcileError;
use crate::domain::models::Block;
use crate::domain::services::call_decoder::GovernanceEvent;
use crate::domain::services::preimage_decoder::PreimageDecoder;
use crate::infrastructure::persistence::GovernanceStore;

/// What a handler knows about the call it reconciles
#[derive(Debug, Clone, Copy)]
pub struct CallContext<'a> {
    /// Stored row of the block being processed
    pub block: &'a Block,
    /// Signer of the outer extrinsic, shared by every unwrapped inner call
    pub signer: Option<&'a str>,
    /// Events emitted while applying the outer extrinsic
    pub events: &'a [GovernanceEvent],
    /// Events emitted during block initialization
    pub initialization_events: &'a [GovernanceEvent],
}

/// Per-domain handlers over a [`GovernanceStore`]
#[derive(Debug, Clone)]
pub struct ReconciliationEngine {
    chain_id: i32,
    store: Arc<dyn GovernanceStore>,
    preimages: PreimageDecoder,
}

impl ReconciliationEngine {
    pub fn new(chain_id: i32, store: Arc<dyn GovernanceStore>, preimages: PreimageDecoder) -> Self {
        Self {
            chain_id,
            store,
            preimages,
        }
    }

    /// Whether `block` may overwrite a status last set at block `modified_at`
    async fn is_newer(&self, block: &Block, modified_at: Option<i32>) -> Result<bool, ReconcileError> {
        Ok(self
            .store
            .has_higher_block_number(block.id, modified_at)
            .await?)
    }

    async fn account_id(&self, address: &str) -> Result<i32, ReconcileError> {
        Ok(self
            .store
            .get_or_create_account(address, self.chain_id)
            .await?
            .id)
    }

    /// Account of the extrinsic signer, if the extrinsic was signed
    async fn signer_account_id(&self, ctx: &CallContext<'_>) -> Result<Option<i32>, ReconcileError> {
        match ctx.signer {
            Some(signer) => Ok(Some(self.account_id(signer).await?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use async_trait::async_trait;
    use serde_json::Value;
    use tokio::sync::watch;

    use super::*;
    use crate::infrastructure::chain::{ChainClient, ChainClientError, ConnectionState, SignedBlock};
    use crate::infrastructure::persistence::InMemoryStore;

    /// Node that is never reachable; preimages never decode against it
    #[derive(Debug)]
    pub(crate) struct OfflineClient;

    #[async_trait]
    impl ChainClient for OfflineClient {
        fn endpoint(&self) -> &str {
            "ws://offline"
        }

        fn connection_state(&self) -> watch::Receiver<ConnectionState> {
            watch::channel(ConnectionState::Disconnected).1
        }

        async fn latest_height(&self) -> Result<u64, ChainClientError> {
            Err(ChainClientError::Closed)
        }

        async fn block_hash(&self, _height: u64) -> Result<String, ChainClientError> {
            Err(ChainClientError::Closed)
        }

        async fn block(&self, _hash: &str) -> Result<SignedBlock, ChainClientError> {
            Err(ChainClientError::Closed)
        }

        async fn events(&self, _hash: &str) -> Result<Vec<Value>, ChainClientError> {
            Err(ChainClientError::Closed)
        }

        async fn create_type(&self, _schema: &str, _bytes: &[u8]) -> Result<Value, ChainClientError> {
            Err(ChainClientError::Closed)
        }
    }

    pub(crate) struct Fixture {
        pub engine: ReconciliationEngine,
        pub store: Arc<InMemoryStore>,
        pub chain_id: i32,
    }

    impl Fixture {
        pub async fn new() -> Self {
            let store = Arc::new(InMemoryStore::new());
            let chain = store.get_or_create_chain("ws://offline").await.unwrap();
            let engine = ReconciliationEngine::new(
                chain.id,
                store.clone(),
                PreimageDecoder::new(Arc::new(OfflineClient)),
            );
            Self {
                engine,
                store,
                chain_id: chain.id,
            }
        }

        /// Store a block at `number`
        pub async fn block(&self, number: i64) -> Block {
            self.store
                .insert_block(Block::new(self.chain_id, format!("0x{:x}", number), number))
                .await
                .unwrap()
        }

        pub fn ctx<'a>(
            &self,
            block: &'a Block,
            signer: Option<&'a str>,
            events: &'a [GovernanceEvent],
        ) -> CallContext<'a> {
            CallContext {
                block,
                signer,
                events,
                initialization_events: &[],
            }
        }
    }
}
