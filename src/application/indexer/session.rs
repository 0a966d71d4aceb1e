//! Per-walk indexing context

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::domain::errors::BlockProcessorError;
use crate::domain::models::Chain;
use crate::domain::services::{Dispatcher, PreimageDecoder, ReconciliationEngine};
use crate::infrastructure::chain::{ChainClient, ConnectionState};
use crate::infrastructure::persistence::GovernanceStore;
use crate::utils::logging;

/// Everything one chain walk needs, built once per `index_chain` call
#[derive(Debug, Clone)]
pub struct IndexingSession {
    pub chain: Chain,
    pub client: Arc<dyn ChainClient>,
    pub store: Arc<dyn GovernanceStore>,
    pub dispatcher: Dispatcher,
}

impl IndexingSession {
    /// Resolve the chain row for the client's endpoint and wire the handlers
    pub async fn open(
        client: Arc<dyn ChainClient>,
        store: Arc<dyn GovernanceStore>,
    ) -> Result<Self, BlockProcessorError> {
        let chain = store.get_or_create_chain(client.endpoint()).await?;
        let engine = ReconciliationEngine::new(
            chain.id,
            store.clone(),
            PreimageDecoder::new(client.clone()),
        );

        Ok(Self {
            chain,
            client,
            store,
            dispatcher: Dispatcher::new(engine),
        })
    }

    /// Log connection losses and recoveries until the client goes away
    pub fn watch_connection(&self) -> JoinHandle<()> {
        let mut state = self.client.connection_state();
        let endpoint = self.client.endpoint().to_string();

        tokio::spawn(async move {
            let mut watch = ConnectionWatch::default();
            while state.changed().await.is_ok() {
                let current = *state.borrow_and_update();
                match watch.observe(current) {
                    Some(ConnectionChange::Lost) => logging::log_warning(&format!(
                        "Disconnected from {}, trying to reconnect",
                        endpoint
                    )),
                    Some(ConnectionChange::Restored) => {
                        logging::log_info(&format!("Reconnected to {}", endpoint))
                    }
                    None => {}
                }
            }
        })
    }
}

/// A connection transition worth reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionChange {
    Lost,
    Restored,
}

/// Turns connection states into loss and recovery transitions
#[derive(Debug, Default)]
pub struct ConnectionWatch {
    disconnected: bool,
}

impl ConnectionWatch {
    pub fn observe(&mut self, state: ConnectionState) -> Option<ConnectionChange> {
        match state {
            ConnectionState::Disconnected if !self.disconnected => {
                self.disconnected = true;
                Some(ConnectionChange::Lost)
            }
            ConnectionState::Connected if self.disconnected => {
                self.disconnected = false;
                Some(ConnectionChange::Restored)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_outage_is_reported_once() {
        let mut watch = ConnectionWatch::default();

        assert_eq!(watch.observe(ConnectionState::Connected), None);
        assert_eq!(watch.observe(ConnectionState::Disconnected), Some(ConnectionChange::Lost));
        assert_eq!(watch.observe(ConnectionState::Disconnected), None);
        assert_eq!(watch.observe(ConnectionState::Connecting), None);
        assert_eq!(watch.observe(ConnectionState::Connected), Some(ConnectionChange::Restored));
        assert_eq!(watch.observe(ConnectionState::Connected), None);
    }
}
