// Storage module - Persistence layer for ledger and competition data

mod store;

pub use store::{
    treasury_state_key, wallet_state_key, LedgerStore, StorageStats, StoreError, TransferError,
};
