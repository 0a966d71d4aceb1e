//! JSON-RPC over websocket client with flat reconnect
//!
//! One background task owns the socket. Requests are multiplexed by id and
//! kept in flight until answered, so a request issued before a disconnect is
//! sent again on the next connection and its caller just keeps waiting.
//!
//! Blocks and events arrive SCALE encoded. They are decoded here against the
//! metadata of the runtime version they were produced under, one metadata
//! download per version.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::sync::{mpsc, oneshot, watch};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use super::client::{ChainClient, ConnectionState, SignedBlock};
use super::error::ChainClientError;
use super::runtime::{RuntimeTypes, SYSTEM_EVENTS_KEY};
use crate::utils::logging;

/// RPC methods served by the node endpoint
pub mod methods {
    pub const HEADER: &str = "chain_getHeader";
    pub const BLOCK_HASH: &str = "chain_getBlockHash";
    pub const BLOCK: &str = "chain_getBlock";
    pub const RUNTIME_VERSION: &str = "state_getRuntimeVersion";
    pub const METADATA: &str = "state_getMetadata";
    pub const STORAGE: &str = "state_getStorage";
}

type RpcResult = Result<Value, ChainClientError>;

#[derive(Debug)]
struct PendingRequest {
    id: u64,
    payload: String,
    respond_to: oneshot::Sender<RpcResult>,
}

/// Chain client speaking JSON-RPC 2.0 over a websocket
#[derive(Debug)]
pub struct WsChainClient {
    endpoint: String,
    requests: mpsc::UnboundedSender<PendingRequest>,
    state: watch::Receiver<ConnectionState>,
    next_id: AtomicU64,
    /// Runtime types by spec version
    runtimes: Mutex<HashMap<u64, Arc<RuntimeTypes>>>,
    /// Runtime of the block read last, used for standalone type decoding
    current_runtime: Mutex<Option<Arc<RuntimeTypes>>>,
}

impl WsChainClient {
    /// Create a client for `endpoint` and start its connection task
    ///
    /// Returns immediately; requests issued before the first connection is up
    /// wait for it.
    pub fn connect(endpoint: &str, reconnect_interval: Duration) -> Self {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Connecting);

        tokio::spawn(run_connection(
            endpoint.to_string(),
            reconnect_interval,
            request_rx,
            state_tx,
        ));

        Self {
            endpoint: endpoint.to_string(),
            requests: request_tx,
            state: state_rx,
            next_id: AtomicU64::new(1),
            runtimes: Mutex::new(HashMap::new()),
            current_runtime: Mutex::new(None),
        }
    }

    /// Runtime types in force at block `hash`
    async fn runtime_at(&self, hash: &str) -> Result<Arc<RuntimeTypes>, ChainClientError> {
        let version = self.rpc_call(methods::RUNTIME_VERSION, json!([hash])).await?;
        let spec_version = version
            .get("specVersion")
            .and_then(Value::as_u64)
            .ok_or_else(|| ChainClientError::InvalidResponse(format!("no spec version at {}", hash)))?;

        let cached = self
            .runtimes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&spec_version)
            .cloned();
        let runtime = match cached {
            Some(runtime) => runtime,
            None => {
                let metadata = self.rpc_call(methods::METADATA, json!([hash])).await?;
                let runtime = Arc::new(RuntimeTypes::from_metadata(&hex_payload(&metadata)?)?);
                logging::log_info(&format!(
                    "[{}] Loaded metadata of runtime version {}",
                    self.endpoint, spec_version
                ));
                self.runtimes
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(spec_version, runtime.clone());
                runtime
            }
        };

        *self
            .current_runtime
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(runtime.clone());
        Ok(runtime)
    }

    /// Make a JSON-RPC call and wait for its result
    async fn rpc_call(&self, method: &str, params: Value) -> RpcResult {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let payload = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params
        })
        .to_string();

        let (respond_to, response) = oneshot::channel();
        self.requests
            .send(PendingRequest {
                id,
                payload,
                respond_to,
            })
            .map_err(|_| ChainClientError::Closed)?;

        response.await.map_err(|_| ChainClientError::Closed)?
    }
}

#[async_trait]
impl ChainClient for WsChainClient {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    async fn latest_height(&self) -> Result<u64, ChainClientError> {
        let header = self.rpc_call(methods::HEADER, json!([])).await?;
        parse_number(header.get("number").unwrap_or(&Value::Null))
    }

    async fn block_hash(&self, height: u64) -> Result<String, ChainClientError> {
        let result = self.rpc_call(methods::BLOCK_HASH, json!([height])).await?;
        result.as_str().map(|s| s.to_string()).ok_or_else(|| {
            ChainClientError::InvalidResponse(format!("no block hash for height {}", height))
        })
    }

    async fn block(&self, hash: &str) -> Result<SignedBlock, ChainClientError> {
        let result = self.rpc_call(methods::BLOCK, json!([hash])).await?;
        let raw = parse_raw_block(hash, &result)?;
        let runtime = self.runtime_at(hash).await?;

        let extrinsics = raw
            .extrinsics
            .iter()
            .enumerate()
            .map(|(index, encoded)| {
                runtime.decode_extrinsic(encoded).map_err(|e| {
                    ChainClientError::Undecodable(format!("extrinsic {}-{}: {}", raw.number, index, e))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SignedBlock {
            hash: hash.to_string(),
            number: raw.number,
            parent_hash: raw.parent_hash,
            extrinsics,
        })
    }

    async fn events(&self, hash: &str) -> Result<Vec<Value>, ChainClientError> {
        let runtime = self.runtime_at(hash).await?;
        let stored = self
            .rpc_call(methods::STORAGE, json!([SYSTEM_EVENTS_KEY, hash]))
            .await?;
        if stored.is_null() {
            return Ok(Vec::new());
        }
        runtime.decode_events(&hex_payload(&stored)?)
    }

    /// `Proposal` must consume every byte; `Call` tolerates trailing bytes
    async fn create_type(&self, schema: &str, bytes: &[u8]) -> Result<Value, ChainClientError> {
        let runtime = self
            .current_runtime
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| ChainClientError::Undecodable("no runtime metadata loaded yet".to_string()))?;

        match schema {
            "Proposal" => runtime.decode_call(bytes, true),
            "Call" => runtime.decode_call(bytes, false),
            other => Err(ChainClientError::Undecodable(format!("unknown type {}", other))),
        }
    }
}

/// Owns the websocket for the lifetime of the client
async fn run_connection(
    endpoint: String,
    reconnect_interval: Duration,
    mut requests: mpsc::UnboundedReceiver<PendingRequest>,
    state: watch::Sender<ConnectionState>,
) {
    let mut in_flight: HashMap<u64, PendingRequest> = HashMap::new();

    loop {
        let stream = match connect_async(endpoint.as_str()).await {
            Ok((stream, _)) => stream,
            Err(e) => {
                logging::log_debug(&format!("Connecting to {} failed: {}", endpoint, e));
                tokio::time::sleep(reconnect_interval).await;
                continue;
            }
        };

        state.send_replace(ConnectionState::Connected);
        let (mut sink, mut source) = stream.split();
        let mut alive = true;

        for request in in_flight.values() {
            if sink.send(Message::Text(request.payload.clone())).await.is_err() {
                alive = false;
                break;
            }
        }

        while alive {
            tokio::select! {
                request = requests.recv() => match request {
                    Some(request) => {
                        let payload = request.payload.clone();
                        in_flight.insert(request.id, request);
                        if sink.send(Message::Text(payload)).await.is_err() {
                            alive = false;
                        }
                    }
                    None => {
                        // Client dropped
                        let _ = sink.close().await;
                        return;
                    }
                },
                message = source.next() => match message {
                    Some(Ok(Message::Text(text))) => resolve_responses(&text, &mut in_flight),
                    Some(Ok(Message::Binary(bytes))) => {
                        if let Ok(text) = String::from_utf8(bytes) {
                            resolve_responses(&text, &mut in_flight);
                        }
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => alive = false,
                    Some(Ok(_)) => {}
                },
            }
        }

        state.send_replace(ConnectionState::Disconnected);
    }
}

/// Hand every response in `text` to its waiting caller
fn resolve_responses(text: &str, in_flight: &mut HashMap<u64, PendingRequest>) {
    let message: Value = match serde_json::from_str(text) {
        Ok(message) => message,
        Err(e) => {
            logging::log_warning(&format!("Discarding unparsable node message: {}", e));
            return;
        }
    };

    let responses = match message {
        Value::Array(items) => items,
        single => vec![single],
    };

    for response in responses {
        let Some(id) = response.get("id").and_then(Value::as_u64) else {
            continue;
        };
        if let Some(request) = in_flight.remove(&id) {
            let _ = request.respond_to.send(rpc_outcome(response));
        }
    }
}

fn rpc_outcome(mut response: Value) -> RpcResult {
    if let Some(error) = response.get("error") {
        return Err(ChainClientError::RpcError {
            code: error.get("code").and_then(Value::as_i64).unwrap_or(0),
            message: error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string(),
        });
    }
    Ok(response
        .get_mut("result")
        .map(Value::take)
        .unwrap_or(Value::Null))
}

/// Block numbers arrive hex encoded (`"0x1b4"`), as plain numbers or as
/// decimal strings
fn parse_number(value: &Value) -> Result<u64, ChainClientError> {
    let parsed = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => match s.strip_prefix("0x") {
            Some(hex_digits) => u64::from_str_radix(hex_digits, 16).ok(),
            None => s.replace(',', "").parse::<u64>().ok(),
        },
        _ => None,
    };
    parsed.ok_or_else(|| ChainClientError::InvalidResponse(format!("invalid block number {}", value)))
}

/// Hex string payload of an RPC result
fn hex_payload(value: &Value) -> Result<Vec<u8>, ChainClientError> {
    let text = value
        .as_str()
        .ok_or_else(|| ChainClientError::InvalidResponse(format!("expected hex data, got {}", value)))?;
    hex::decode(text.trim_start_matches("0x"))
        .map_err(|e| ChainClientError::InvalidResponse(format!("invalid hex data: {}", e)))
}

/// Header fields and still encoded extrinsics of a `chain_getBlock` result
#[derive(Debug)]
struct RawBlock {
    number: u64,
    parent_hash: String,
    extrinsics: Vec<Vec<u8>>,
}

fn parse_raw_block(hash: &str, result: &Value) -> Result<RawBlock, ChainClientError> {
    let block = result
        .get("block")
        .ok_or_else(|| ChainClientError::InvalidResponse(format!("block {} not found", hash)))?;
    let header = block
        .get("header")
        .ok_or_else(|| ChainClientError::InvalidResponse("block without header".to_string()))?;

    let number = parse_number(header.get("number").unwrap_or(&Value::Null))?;
    let parent_hash = header
        .get("parentHash")
        .and_then(Value::as_str)
        .ok_or_else(|| ChainClientError::InvalidResponse("header without parentHash".to_string()))?
        .to_string();
    let extrinsics = block
        .get("extrinsics")
        .and_then(Value::as_array)
        .map(|encoded| encoded.iter().map(hex_payload).collect::<Result<Vec<_>, _>>())
        .transpose()?
        .unwrap_or_default();

    Ok(RawBlock {
        number,
        parent_hash,
        extrinsics,
    })
}
