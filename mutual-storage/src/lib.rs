pub mod db;

pub use db::{MemoryStore, Store};
#[cfg(feature = "rocksdb")]
pub use db::RocksStore;
