//! Scripted chain for driving the indexer end to end

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::watch;

use governance_indexer::application::indexer::{self, WalkSummary};
use governance_indexer::config::IndexerConfig;
use governance_indexer::domain::errors::BlockProcessorError;
use governance_indexer::infrastructure::chain::{ChainClient, ChainClientError, ConnectionState, SignedBlock};
use governance_indexer::infrastructure::persistence::InMemoryStore;

pub const ENDPOINT: &str = "ws://fake-node";

#[derive(Debug, Clone, Default)]
struct ScriptedBlock {
    extrinsics: Vec<Value>,
    events: Vec<Value>,
}

/// A linear chain from genesis to `head`
///
/// Every block carries a `timestamp.set` inherent at index 0. Extra
/// extrinsics and events are added per height.
#[derive(Debug)]
pub struct FakeChainClient {
    head: u64,
    blocks: Mutex<HashMap<u64, ScriptedBlock>>,
    fetched: Mutex<Vec<u64>>,
    event_failures: Mutex<HashMap<u64, u32>>,
    state: watch::Sender<ConnectionState>,
}

pub fn hash_of(height: u64) -> String {
    format!("0x{:064x}", height)
}

fn height_of(hash: &str) -> Option<u64> {
    u64::from_str_radix(hash.trim_start_matches("0x"), 16).ok()
}

impl FakeChainClient {
    pub fn new(head: u64) -> Self {
        let (state, _) = watch::channel(ConnectionState::Connected);
        Self {
            head,
            blocks: Mutex::new(HashMap::new()),
            fetched: Mutex::new(Vec::new()),
            event_failures: Mutex::new(HashMap::new()),
            state,
        }
    }

    /// Append an extrinsic to the block at `height`, returning its index
    pub fn push_extrinsic(&self, height: u64, extrinsic: Value) -> u32 {
        let mut blocks = self.blocks.lock().unwrap();
        let block = blocks.entry(height).or_default();
        block.extrinsics.push(extrinsic);
        block.extrinsics.len() as u32
    }

    pub fn push_event(&self, height: u64, event: Value) {
        self.blocks
            .lock()
            .unwrap()
            .entry(height)
            .or_default()
            .events
            .push(event);
    }

    /// Make the next `times` event fetches of the block at `height` fail
    pub fn fail_events(&self, height: u64, times: u32) {
        self.event_failures.lock().unwrap().insert(height, times);
    }

    /// Heights fetched with `block`, in request order
    pub fn fetched(&self) -> Vec<u64> {
        self.fetched.lock().unwrap().clone()
    }

    fn scripted(&self, height: u64) -> ScriptedBlock {
        self.blocks
            .lock()
            .unwrap()
            .get(&height)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl ChainClient for FakeChainClient {
    fn endpoint(&self) -> &str {
        ENDPOINT
    }

    fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    async fn latest_height(&self) -> Result<u64, ChainClientError> {
        Ok(self.head)
    }

    async fn block_hash(&self, height: u64) -> Result<String, ChainClientError> {
        if height > self.head {
            return Err(ChainClientError::InvalidResponse(format!("no block at {}", height)));
        }
        Ok(hash_of(height))
    }

    async fn block(&self, hash: &str) -> Result<SignedBlock, ChainClientError> {
        let height = height_of(hash)
            .filter(|h| *h <= self.head)
            .ok_or_else(|| ChainClientError::InvalidResponse(format!("unknown block {}", hash)))?;
        self.fetched.lock().unwrap().push(height);

        let mut extrinsics = vec![inherent("timestamp", "set", json!({ "now": height * 6000 }))];
        extrinsics.extend(self.scripted(height).extrinsics);
        Ok(SignedBlock {
            hash: hash.to_string(),
            number: height,
            parent_hash: hash_of(height.saturating_sub(1)),
            extrinsics,
        })
    }

    async fn events(&self, hash: &str) -> Result<Vec<Value>, ChainClientError> {
        let height = height_of(hash)
            .ok_or_else(|| ChainClientError::InvalidResponse(format!("unknown block {}", hash)))?;

        if let Some(remaining) = self.event_failures.lock().unwrap().get_mut(&height) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(ChainClientError::RpcError {
                    code: -32000,
                    message: "transient".to_string(),
                });
            }
        }
        Ok(self.scripted(height).events)
    }

    async fn create_type(&self, schema: &str, _bytes: &[u8]) -> Result<Value, ChainClientError> {
        Err(ChainClientError::RpcError {
            code: -32602,
            message: format!("cannot decode as {}", schema),
        })
    }
}

pub fn signed(signer: &str, section: &str, method: &str, args: Value) -> Value {
    json!({
        "isSigned": true,
        "signer": { "Id": signer },
        "method": { "section": section, "method": method, "args": args }
    })
}

pub fn inherent(section: &str, method: &str, args: Value) -> Value {
    json!({
        "isSigned": false,
        "method": { "section": section, "method": method, "args": args }
    })
}

pub fn call(section: &str, method: &str, args: Value) -> Value {
    json!({ "section": section, "method": method, "args": args })
}

pub fn event(phase: Value, section: &str, method: &str, data: Value) -> Value {
    json!({
        "phase": phase,
        "event": { "section": section, "method": method, "data": data }
    })
}

pub fn apply(index: u32) -> Value {
    json!({ "ApplyExtrinsic": index })
}

pub fn initialization() -> Value {
    json!("Initialization")
}

pub fn success(index: u32) -> Value {
    event(apply(index), "system", "ExtrinsicSuccess", json!([{ "weight": "1,000" }]))
}

pub fn failure(index: u32) -> Value {
    event(
        apply(index),
        "system",
        "ExtrinsicFailed",
        json!([{ "Module": { "index": 9, "error": 3 } }, { "weight": "1,000" }]),
    )
}

pub fn walk_config(from: Option<u64>, to: u64) -> IndexerConfig {
    IndexerConfig {
        from_height: from,
        to_height: to,
        fetch_retries: 1,
        fetch_retry_delay_ms: 0,
        dry_run: true,
    }
}

pub async fn walk(
    client: &Arc<FakeChainClient>,
    store: &Arc<InMemoryStore>,
    from: Option<u64>,
    to: u64,
) -> Result<WalkSummary, BlockProcessorError> {
    walk_with(client, store, &walk_config(from, to)).await
}

pub async fn walk_with(
    client: &Arc<FakeChainClient>,
    store: &Arc<InMemoryStore>,
    config: &IndexerConfig,
) -> Result<WalkSummary, BlockProcessorError> {
    indexer::index_chain(client.clone(), store.clone(), config).await
}
