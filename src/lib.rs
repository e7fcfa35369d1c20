//! FantaPay Ledger - Embedded wallet ledger for a fantasy-sports payments app
//!
//! Owns, per user, an authoritative balance and an append-only transaction
//! history, persisted in local key-value storage. Each wallet is one
//! serialized record, written with compare-and-swap, so balance and history
//! always move together. Competition treasuries are wallets of the same
//! shape; fees and prizes move between ledgers in a single atomic storage
//! transaction.

pub mod competition;
pub mod ledger;
pub mod storage;
pub mod wallet;

pub use competition::{
    Competition, CompetitionError, CompetitionId, CompetitionLedger, CompetitionRules,
    InviteCode, PrizeSlot, RuleKind, TransferReceipt,
};
pub use ledger::{
    Amount, AmountParseError, LedgerState, LedgerStateError, Transaction, TransactionDirection,
    TransactionId, TxKind, TxStatus, WalletTag,
};
pub use storage::{LedgerStore, StorageStats, StoreError, TransferError};
pub use wallet::{Mutation, MutationReceipt, UserId, WalletError, WalletLedger};
