// Ledger State - One wallet's balance and ordered transaction history,
// persisted as a single record so balance and history can never diverge on disk

use crate::ledger::{Amount, Transaction, TransactionDirection, WalletTag};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when mutating or replaying a ledger state
#[derive(Error, Debug)]
pub enum LedgerStateError {
    #[error("Insufficient balance: available {available}, required {required}")]
    InsufficientFunds { available: Amount, required: Amount },

    #[error("Balance would overflow")]
    BalanceOverflow,

    #[error("Stored balance {stored} does not match replayed balance {replayed}")]
    BalanceMismatch { stored: Amount, replayed: Amount },

    #[error("Transaction history replays below zero")]
    ReplayUnderflow,

    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),
}

/// One wallet's complete ledger: balance, version token and history.
///
/// Transactions are kept newest-first. The version is a logical clock bumped
/// on every mutation; the storage layer uses the serialized record as the
/// compare-and-swap token for optimistic concurrency.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerState {
    /// Which account tag this wallet answers to (personal or competition)
    owner: WalletTag,
    /// Logical clock, bumped on every applied mutation
    version: u64,
    /// Current balance
    balance: Amount,
    /// Transaction history, newest-first
    transactions: Vec<Transaction>,
}

impl LedgerState {
    /// Create an empty zero-balance ledger for the given owner tag
    pub fn new(owner: WalletTag) -> Self {
        Self {
            owner,
            version: 0,
            balance: Amount::ZERO,
            transactions: Vec::new(),
        }
    }

    pub fn owner(&self) -> &WalletTag {
        &self.owner
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    /// Transaction history, newest-first
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    /// The most recent transaction, if any
    pub fn newest(&self) -> Option<&Transaction> {
        self.transactions.first()
    }

    /// Apply one mutation: adjust the balance with checked arithmetic,
    /// prepend the transaction and bump the version.
    ///
    /// On error nothing is modified.
    pub fn apply(&mut self, tx: Transaction) -> Result<(), LedgerStateError> {
        let new_balance = match tx.direction_for(&self.owner) {
            TransactionDirection::Incoming => self
                .balance
                .checked_add(tx.amount())
                .ok_or(LedgerStateError::BalanceOverflow)?,
            TransactionDirection::Outgoing => {
                self.balance
                    .checked_sub(tx.amount())
                    .ok_or(LedgerStateError::InsufficientFunds {
                        available: self.balance,
                        required: tx.amount(),
                    })?
            }
        };

        self.balance = new_balance;
        self.transactions.insert(0, tx);
        self.version += 1;
        Ok(())
    }

    /// Derive the balance by folding the signed amounts over the full
    /// history, oldest-first
    pub fn replayed_balance(&self) -> Result<Amount, LedgerStateError> {
        let mut balance = Amount::ZERO;
        for tx in self.transactions.iter().rev() {
            balance = match tx.direction_for(&self.owner) {
                TransactionDirection::Incoming => balance
                    .checked_add(tx.amount())
                    .ok_or(LedgerStateError::BalanceOverflow)?,
                TransactionDirection::Outgoing => balance
                    .checked_sub(tx.amount())
                    .ok_or(LedgerStateError::ReplayUnderflow)?,
            };
        }
        Ok(balance)
    }

    /// Verify the ledger invariant: the stored balance equals the sum of
    /// signed transaction amounts
    pub fn audit(&self) -> Result<(), LedgerStateError> {
        let replayed = self.replayed_balance()?;
        if replayed != self.balance {
            return Err(LedgerStateError::BalanceMismatch {
                stored: self.balance,
                replayed,
            });
        }
        Ok(())
    }

    /// Serialize to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, LedgerStateError> {
        postcard::to_allocvec(self)
            .map_err(|e| LedgerStateError::SerializationFailed(e.to_string()))
    }

    /// Deserialize from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LedgerStateError> {
        postcard::from_bytes(bytes)
            .map_err(|e| LedgerStateError::DeserializationFailed(e.to_string()))
    }
}
