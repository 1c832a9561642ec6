//! Single-writer sequencer. Each block is executed against a private copy of
//! the ledger and swapped in once it is durable, so readers only ever see
//! persisted blocks and hold the lock for no longer than a swap.

use anyhow::Result;
use mutual_execution::{execute_transaction, ExecutionContext};
use mutual_storage::Store;
use mutual_types::block::{Block, BlockHeader, Receipt, ReceiptStatus};
use mutual_types::state::LedgerState;
use mutual_types::transaction::Transaction;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::{mpsc, RwLock};
use tracing::{error, info, warn};

pub struct ConsensusService {
    state: Arc<RwLock<LedgerState>>,
    storage: Arc<dyn Store>,
    tx_rx: mpsc::Receiver<Transaction>,
    mempool: Vec<Transaction>,
    block_time: Duration,
    height: u64,
    last_hash: [u8; 32],
    last_timestamp: u64,
}

impl ConsensusService {
    pub fn new(
        state: Arc<RwLock<LedgerState>>,
        storage: Arc<dyn Store>,
        tx_rx: mpsc::Receiver<Transaction>,
        block_time: Duration,
    ) -> Result<Self> {
        let (height, last_hash) = storage.load_tip()?.unwrap_or((0, [0u8; 32]));
        let last_timestamp = match storage.load_block_by_height(height)? {
            Some(block) => block.header.timestamp,
            None => 0,
        };
        if height > 0 {
            info!("Recovered chain tip. Resuming after height {}", height);
        }

        Ok(Self {
            state,
            storage,
            tx_rx,
            mempool: Vec::new(),
            block_time,
            height,
            last_hash,
            last_timestamp,
        })
    }

    pub fn height(&self) -> u64 {
        self.height
    }

    pub async fn run(mut self) {
        info!("Starting sequencer with {:?} block time", self.block_time);
        let mut interval = tokio::time::interval(self.block_time);

        loop {
            tokio::select! {
                received = self.tx_rx.recv() => match received {
                    Some(tx) => self.mempool.push(tx),
                    None => {
                        info!("Transaction channel closed, sequencer stopping");
                        break;
                    }
                },
                _ = interval.tick() => {
                    if let Err(e) = self.step().await {
                        error!("Block production failed at height {}: {}", self.height + 1, e);
                    }
                }
            }
        }
    }

    /// Drains anything already queued and seals the mempool into a block.
    /// Returns the block if at least one transaction committed.
    ///
    /// The block is built on a copy of the ledger and published only after
    /// it is persisted. If storage fails, the live state, the tip and the
    /// mempool are left as they were so the same height can be retried.
    pub async fn step(&mut self) -> Result<Option<Block>> {
        while let Ok(tx) = self.tx_rx.try_recv() {
            self.mempool.push(tx);
        }
        if self.mempool.is_empty() {
            return Ok(None);
        }

        let height = self.height + 1;
        let timestamp = now_secs().max(self.last_timestamp);

        // The sequencer is the only writer, so the copy cannot go stale.
        let mut next = self.state.read().await.clone();
        let (block, receipts) =
            build_block(&mut next, self.mempool.clone(), height, self.last_hash, timestamp);

        let Some(block) = block else {
            self.mempool.clear();
            for receipt in &receipts {
                self.storage.save_receipt(receipt)?;
            }
            warn!("No transaction committed for height {}", height);
            return Ok(None);
        };

        self.persist(&block, &receipts, &next)?;
        self.mempool.clear();
        let pool_balance = next.pool_balance();
        *self.state.write().await = next;

        self.height = height;
        self.last_hash = block.hash();
        self.last_timestamp = timestamp;
        info!(
            "Committed block {} with {} txs ({} rejected). Pool balance: {}",
            height,
            block.transactions.len(),
            receipts.len() - block.transactions.len(),
            pool_balance
        );
        Ok(Some(block))
    }

    /// Writes the block and everything it produced. The tip goes last, so a
    /// store interrupted midway still points at the previous block.
    fn persist(&self, block: &Block, receipts: &[Receipt], state: &LedgerState) -> Result<()> {
        self.storage.save_block(block)?;
        for receipt in receipts {
            self.storage.save_receipt(receipt)?;
        }
        self.storage.save_state(state)?;
        self.storage.save_tip(block.header.height, block.hash())
    }
}

/// Applies `txs` in order at one trusted timestamp. Rejected transactions
/// leave no trace in `state` and are reported through their receipts only.
pub fn build_block(
    state: &mut LedgerState,
    txs: Vec<Transaction>,
    height: u64,
    prev_hash: [u8; 32],
    timestamp: u64,
) -> (Option<Block>, Vec<Receipt>) {
    let mut committed = Vec::new();
    let mut receipts = Vec::with_capacity(txs.len());
    let mut ctx = ExecutionContext::new(state, height, timestamp);

    for tx in txs {
        let status = match execute_transaction(&tx, &mut ctx) {
            Ok(events) => ReceiptStatus::Committed { events },
            Err(e) => {
                warn!(tx = %hex::encode(tx.id()), "Tx execution failed: {:#}", e);
                ReceiptStatus::Rejected {
                    reason: format!("{:#}", e),
                }
            }
        };
        receipts.push(Receipt {
            tx_id: tx.id(),
            height,
            status,
        });
        if matches!(receipts.last(), Some(Receipt { status: ReceiptStatus::Committed { .. }, .. })) {
            committed.push(tx);
        }
    }

    if committed.is_empty() {
        return (None, receipts);
    }

    let events = std::mem::take(&mut ctx.events);
    let block = Block {
        header: BlockHeader {
            height,
            prev_hash,
            transactions_root: Block::transactions_root(&committed),
            state_root: ctx.state.root_hash(),
            timestamp,
        },
        transactions: committed,
        events,
    };
    (Some(block), receipts)
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
