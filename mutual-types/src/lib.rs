pub mod block;
pub mod claim;
pub mod error;
pub mod event;
pub mod instruction;
pub mod policy;
pub mod pool;
pub mod state;
pub mod transaction;

/// An identity on the ledger: the raw bytes of an ed25519 verifying key.
pub type Address = [u8; 32];
pub type PolicyId = u64;
pub type ClaimId = u64;

pub use block::{Block, BlockHeader, Receipt, ReceiptStatus};
pub use claim::{Claim, ClaimBook, ClaimStatus};
pub use error::{InsuranceError, InvalidInput};
pub use event::Event;
pub use instruction::InsuranceInstruction;
pub use policy::{Policy, PolicyRegistry};
pub use pool::PoolLedger;
pub use state::{AccountState, LedgerState};
pub use transaction::Transaction;
