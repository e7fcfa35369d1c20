// Ledger module - Core data model: amounts, transactions and per-wallet state

mod amount;
mod state;
mod transaction;

pub use amount::{Amount, AmountParseError};
pub use state::{LedgerState, LedgerStateError};
pub use transaction::{
    Transaction, TransactionDirection, TransactionId, TxKind, TxStatus, WalletTag,
};
