use anyhow::{Context, Result};
use clap::Parser;
use mutual_api::metrics::Metrics;
use mutual_genesis::{create_genesis_state, GenesisConfig};
use mutual_storage::Store;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::{mpsc, RwLock};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Mutual insurance ledger node")]
struct Args {
    /// RocksDB directory. Ignored unless built with the `rocksdb` feature.
    #[arg(short, long)]
    data_dir: Option<PathBuf>,
    /// Genesis TOML used when the store holds no state yet.
    #[arg(short, long)]
    genesis: Option<PathBuf>,
    #[arg(short, long, default_value = "0.0.0.0:3000")]
    listen: SocketAddr,
    #[arg(long, default_value_t = 2)]
    block_time_secs: u64,
}

#[cfg(feature = "rocksdb")]
fn open_persistent(dir: &Path) -> Result<Option<Arc<dyn Store>>> {
    let path = dir.to_str().context("data dir must be valid UTF-8")?;
    let store = mutual_storage::RocksStore::new(path).context("Failed to initialize storage")?;
    info!("Storage initialized at {}", dir.display());
    Ok(Some(Arc::new(store)))
}

#[cfg(not(feature = "rocksdb"))]
fn open_persistent(dir: &Path) -> Result<Option<Arc<dyn Store>>> {
    info!("Built without the rocksdb feature; ignoring {}", dir.display());
    Ok(None)
}

fn open_storage(args: &Args) -> Result<Arc<dyn Store>> {
    if let Some(dir) = &args.data_dir {
        if let Some(store) = open_persistent(dir)? {
            return Ok(store);
        }
    }
    info!("Using in-memory storage");
    Ok(Arc::new(mutual_storage::MemoryStore::new()))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    info!("Starting mutual insurance node...");

    let storage = open_storage(&args)?;

    let state = match storage.load_state().context("Failed to load state")? {
        Some(state) => {
            info!("Loaded existing state.");
            state
        }
        None => {
            info!("Store is empty, applying genesis...");
            let config = match &args.genesis {
                Some(path) => GenesisConfig::load(path)?,
                None => GenesisConfig::default(),
            };
            let genesis = create_genesis_state(&config)?;
            storage.save_state(&genesis).context("Failed to save genesis state")?;
            genesis
        }
    };
    let shared_state = Arc::new(RwLock::new(state));

    let (tx_sender, tx_receiver) = mpsc::channel(1000);

    let sequencer = mutual_consensus::ConsensusService::new(
        shared_state.clone(),
        storage.clone(),
        tx_receiver,
        Duration::from_secs(args.block_time_secs.max(1)),
    )?;
    tokio::spawn(sequencer.run());

    let api_state = mutual_api::AppState {
        ledger: shared_state.clone(),
        storage: storage.clone(),
        tx_sender,
        metrics: Arc::new(Metrics::new()),
    };
    let listen = args.listen;
    tokio::spawn(async move {
        if let Err(e) = mutual_api::start_server(listen, api_state).await {
            error!("API server stopped: {:#}", e);
        }
    });

    info!("Node running. Press Ctrl+C to stop.");
    signal::ctrl_c().await?;

    let final_state = shared_state.read().await;
    storage.save_state(&final_state).context("Failed to persist state on shutdown")?;
    info!("State saved, shutting down.");
    Ok(())
}
