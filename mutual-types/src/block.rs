use crate::event::Event;
use crate::transaction::Transaction;
use serde::{Deserialize, Serialize};

fn hash_concat(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(left);
    hasher.update(right);
    *hasher.finalize().as_bytes()
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    pub height: u64,
    pub prev_hash: [u8; 32],
    pub transactions_root: [u8; 32],
    pub state_root: [u8; 32],
    pub timestamp: u64,
}

/// A batch of committed transactions and the events they emitted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
    pub events: Vec<Event>,
}

impl Block {
    pub fn transactions_root(txs: &[Transaction]) -> [u8; 32] {
        if txs.is_empty() {
            return [0u8; 32];
        }

        let mut level: Vec<[u8; 32]> = txs.iter().map(|tx| tx.id()).collect();
        while level.len() > 1 {
            level = level
                .chunks(2)
                .map(|pair| match pair {
                    [left, right] => hash_concat(left, right),
                    [single] => hash_concat(single, single),
                    _ => unreachable!("chunks(2) yields one or two items"),
                })
                .collect();
        }
        level[0]
    }

    pub fn hash(&self) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&bincode::serialize(&self.header).expect("block header serialization"));
        *hasher.finalize().as_bytes()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum ReceiptStatus {
    Committed { events: Vec<Event> },
    Rejected { reason: String },
}

/// Outcome of one submitted transaction, kept whether or not it committed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub tx_id: [u8; 32],
    pub height: u64,
    pub status: ReceiptStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::InsuranceInstruction;

    #[test]
    fn transactions_root_depends_on_order() {
        let a = Transaction::new([1u8; 32], 0, InsuranceInstruction::Contribute { amount: 1 });
        let b = Transaction::new([2u8; 32], 0, InsuranceInstruction::Contribute { amount: 2 });
        let c = Transaction::new([3u8; 32], 0, InsuranceInstruction::EmergencyDrain);

        assert_eq!(Block::transactions_root(&[]), [0u8; 32]);
        assert_eq!(Block::transactions_root(&[a.clone()]), a.id());
        assert_ne!(
            Block::transactions_root(&[a.clone(), b.clone(), c.clone()]),
            Block::transactions_root(&[b, a, c])
        );
    }
}
