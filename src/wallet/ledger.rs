// WalletLedger - Per-user balance and transaction history over persistent storage

use crate::ledger::{
    Amount, AmountParseError, LedgerState, LedgerStateError, Transaction, WalletTag,
};
use crate::storage::{LedgerStore, StoreError};
use crate::wallet::{Mutation, UserId};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors surfaced by wallet operations.
///
/// Validation failures (`InvalidAmount`, `InsufficientFunds`) are raised
/// before any write; `ConcurrentUpdate` means the mutation lost a race and
/// can be retried; `Storage` means the mutation did not durably complete.
#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Insufficient balance: available {available}, required {required}")]
    InsufficientFunds { available: Amount, required: Amount },

    #[error("Balance would overflow")]
    BalanceOverflow,

    #[error("Ledger was modified concurrently, retry the mutation")]
    ConcurrentUpdate,

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Ledger state error: {0}")]
    State(LedgerStateError),
}

impl From<LedgerStateError> for WalletError {
    fn from(err: LedgerStateError) -> Self {
        match err {
            LedgerStateError::InsufficientFunds {
                available,
                required,
            } => WalletError::InsufficientFunds {
                available,
                required,
            },
            LedgerStateError::BalanceOverflow => WalletError::BalanceOverflow,
            other => WalletError::State(other),
        }
    }
}

impl From<AmountParseError> for WalletError {
    fn from(err: AmountParseError) -> Self {
        WalletError::InvalidAmount(err.to_string())
    }
}

/// Result of a successfully applied mutation
#[derive(Clone, Debug)]
pub struct MutationReceipt {
    /// Balance after the mutation
    pub new_balance: Amount,
    /// The recorded transaction
    pub transaction: Transaction,
}

/// The Wallet Ledger - owns per-user balances and append-only histories.
///
/// Every wallet is one serialized `LedgerState` record in storage, written
/// with compare-and-swap on the previous bytes: balance and history move
/// together, and a mutation based on a stale read is rejected instead of
/// silently clobbering a concurrent write.
pub struct WalletLedger {
    store: LedgerStore,
}

impl WalletLedger {
    /// Open or create a wallet ledger backed by storage at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, WalletError> {
        Ok(Self {
            store: LedgerStore::open(path)?,
        })
    }

    /// Build a wallet ledger over an existing store handle
    pub fn with_store(store: LedgerStore) -> Self {
        Self { store }
    }

    /// Get the underlying store (shared with the competition ledger)
    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    /// Explicit first-touch initialization: returns the user's ledger state,
    /// persisting an empty zero-balance record if none exists yet.
    pub fn ensure_initialized(&self, user: &UserId) -> Result<LedgerState, WalletError> {
        if let Some(state) = self.store.load_wallet_state(user.as_str())? {
            return Ok(state);
        }

        let state = LedgerState::new(WalletTag::Personal);
        if self.store.swap_wallet_state(user.as_str(), None, &state)? {
            self.store.flush()?;
            debug!(user = %user, "initialized empty wallet ledger");
            return Ok(state);
        }

        // Lost the creation race; the winner's state must be there now
        self.store
            .load_wallet_state(user.as_str())?
            .ok_or(WalletError::ConcurrentUpdate)
    }

    /// Current balance; a fresh user reads as zero (and gets a persisted
    /// zero record)
    pub fn balance(&self, user: &UserId) -> Result<Amount, WalletError> {
        Ok(self.ensure_initialized(user)?.balance())
    }

    /// Transaction history, newest-first
    pub fn transactions(&self, user: &UserId) -> Result<Vec<Transaction>, WalletError> {
        Ok(self.ensure_initialized(user)?.transactions().to_vec())
    }

    /// Apply one mutation: validate, adjust the balance, record the
    /// transaction, and persist everything as a single atomic write.
    ///
    /// On any error the stored ledger is unchanged.
    pub fn apply(&self, user: &UserId, mutation: Mutation) -> Result<MutationReceipt, WalletError> {
        if mutation.amount().is_zero() {
            return Err(WalletError::InvalidAmount(
                "amount must be positive".to_string(),
            ));
        }

        let (mut state, base) = match self.store.load_wallet_state_raw(user.as_str())? {
            Some((state, raw)) => (state, Some(raw)),
            None => (LedgerState::new(WalletTag::Personal), None),
        };

        let tx = mutation.into_transaction();
        state.apply(tx.clone())?;

        if !self
            .store
            .swap_wallet_state(user.as_str(), base.as_deref(), &state)?
        {
            return Err(WalletError::ConcurrentUpdate);
        }
        self.store.flush()?;

        debug!(
            user = %user,
            kind = %tx.kind(),
            amount = %tx.amount(),
            new_balance = %state.balance(),
            "applied wallet mutation"
        );

        Ok(MutationReceipt {
            new_balance: state.balance(),
            transaction: tx,
        })
    }

    /// Verify that the stored balance reconciles with the transaction
    /// history
    pub fn audit(&self, user: &UserId) -> Result<(), WalletError> {
        let state = self.ensure_initialized(user)?;
        state.audit().map_err(WalletError::from)
    }
}
