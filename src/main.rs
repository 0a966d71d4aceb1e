use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use governance_indexer::application::indexer;
use governance_indexer::config::AppConfig;
use governance_indexer::infrastructure::chain::{ChainClient, WsChainClient};
use governance_indexer::infrastructure::persistence::{DbPool, GovernanceStore, InMemoryStore, SeaOrmStore};
use governance_indexer::utils::logging;

/// Governance indexer for Substrate-style chains
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Websocket endpoint of the node
    #[arg(short, long, env = "NODE_WS_URL")]
    endpoint: Option<String>,

    /// Height to start the backward walk at (chain head if not specified)
    #[arg(short, long)]
    from: Option<u64>,

    /// Lowest height to index, inclusive
    #[arg(short, long)]
    to: Option<u64>,

    /// Keep derived state in memory instead of writing to the database
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_logger();

    let cli = Cli::parse();
    let config = AppConfig::from_env().with_overrides(cli.endpoint, cli.from, cli.to, cli.dry_run);

    logging::log_node_connection_details(&config.node.ws_endpoint);
    let client: Arc<dyn ChainClient> = Arc::new(WsChainClient::connect(
        &config.node.ws_endpoint,
        Duration::from_millis(config.node.reconnect_interval_ms),
    ));

    let store: Arc<dyn GovernanceStore> = if config.indexer.dry_run {
        logging::log_info("Dry run: derived state is kept in memory");
        Arc::new(InMemoryStore::new())
    } else {
        let db_pool = DbPool::new(&config.database)
            .await
            .context("Failed to connect to database")?;
        Arc::new(SeaOrmStore::new(&db_pool))
    };

    let summary = indexer::index_chain(client, store, &config.indexer)
        .await
        .context("Indexing stopped")?;

    logging::log_info(&format!(
        "Indexed {} blocks ({} already present, {} with errors)",
        summary.indexed, summary.skipped, summary.failed
    ));
    Ok(())
}
