use anyhow::{anyhow, Result};
use mutual_types::block::{Block, Receipt};
use mutual_types::state::LedgerState;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;

const STATE_KEY: &[u8] = b"ledger_state";
const TIP_KEY: &[u8] = b"chain_tip";

fn block_key(height: u64) -> Vec<u8> {
    format!("block_height_{}", height).into_bytes()
}

fn receipt_key(tx_id: &[u8; 32]) -> Vec<u8> {
    format!("receipt_{}", hex::encode(tx_id)).into_bytes()
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    bincode::serialize(value).map_err(|e| anyhow!("Serialization error: {}", e))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    bincode::deserialize(bytes).map_err(|e| anyhow!("Deserialization error: {}", e))
}

/// Durable key/value backing for the ledger. Implementors only provide raw
/// byte access; the typed accessors are shared.
pub trait Store: Send + Sync {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;
    fn put(&self, key: &[u8], value: Vec<u8>) -> Result<()>;

    fn save_state(&self, state: &LedgerState) -> Result<()> {
        self.put(STATE_KEY, encode(state)?)
    }

    /// Returns `None` on a fresh store so the caller can apply genesis.
    fn load_state(&self) -> Result<Option<LedgerState>> {
        self.get(STATE_KEY)?.map(|bytes| decode(&bytes)).transpose()
    }

    fn save_block(&self, block: &Block) -> Result<()> {
        self.put(&block_key(block.header.height), encode(block)?)
    }

    fn load_block_by_height(&self, height: u64) -> Result<Option<Block>> {
        self.get(&block_key(height))?.map(|bytes| decode(&bytes)).transpose()
    }

    fn save_tip(&self, height: u64, hash: [u8; 32]) -> Result<()> {
        self.put(TIP_KEY, encode(&(height, hash))?)
    }

    fn load_tip(&self) -> Result<Option<(u64, [u8; 32])>> {
        self.get(TIP_KEY)?.map(|bytes| decode(&bytes)).transpose()
    }

    fn save_receipt(&self, receipt: &Receipt) -> Result<()> {
        self.put(&receipt_key(&receipt.tx_id), encode(receipt)?)
    }

    fn load_receipt(&self, tx_id: &[u8; 32]) -> Result<Option<Receipt>> {
        self.get(&receipt_key(tx_id))?.map(|bytes| decode(&bytes)).transpose()
    }
}

#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn put(&self, key: &[u8], value: Vec<u8>) -> Result<()> {
        self.entries.write().insert(key.to_vec(), value);
        Ok(())
    }
}

#[cfg(feature = "rocksdb")]
pub struct RocksStore {
    db: rocksdb::DB,
}

#[cfg(feature = "rocksdb")]
impl RocksStore {
    pub fn new(path: &str) -> Result<Self> {
        let mut opts = rocksdb::Options::default();
        opts.create_if_missing(true);
        let db = rocksdb::DB::open(&opts, path).map_err(|e| anyhow!("Failed to open DB: {}", e))?;
        Ok(Self { db })
    }
}

#[cfg(feature = "rocksdb")]
impl Store for RocksStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.db.get(key).map_err(|e| anyhow!("DB read error: {}", e))
    }

    fn put(&self, key: &[u8], value: Vec<u8>) -> Result<()> {
        self.db.put(key, value).map_err(|e| anyhow!("DB write error: {}", e))
    }
}
