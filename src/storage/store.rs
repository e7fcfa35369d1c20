// LedgerStore - Persistent key-value storage using sled
//
// Provides typed access for storing:
// - Per-user wallet ledger state (single record: balance + history)
// - Competition records and their invite-code index
// - Per-competition treasury ledger state

use crate::competition::Competition;
use crate::ledger::{LedgerState, LedgerStateError, Transaction, WalletTag};
use sled::transaction::{ConflictableTransactionError, TransactionError};
use std::path::Path;
use thiserror::Error;

/// Key prefixes for organizing data
mod keys {
    pub const WALLET_STATE_PREFIX: &[u8] = b"wallet:state:";
    pub const COMPETITION_PREFIX: &[u8] = b"competition:state:";
    pub const TREASURY_PREFIX: &[u8] = b"competition:treasury:";
    pub const INVITE_CODE_PREFIX: &[u8] = b"competition:code:";
}

/// Errors from storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to open database: {0}")]
    OpenFailed(String),

    #[error("Database operation failed: {0}")]
    DatabaseError(String),

    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    #[error("Flush failed: {0}")]
    FlushFailed(String),
}

impl From<sled::Error> for StoreError {
    fn from(err: sled::Error) -> Self {
        StoreError::DatabaseError(err.to_string())
    }
}

/// Errors from an atomic two-wallet transfer
#[derive(Error, Debug)]
pub enum TransferError {
    #[error(transparent)]
    State(#[from] LedgerStateError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Statistics about the storage
#[derive(Clone, Debug)]
pub struct StorageStats {
    /// Number of keys in the database
    pub key_count: usize,
    /// Approximate disk size in bytes
    pub disk_size_bytes: u64,
}

/// Key for a user's wallet ledger record
pub fn wallet_state_key(user: &str) -> Vec<u8> {
    [keys::WALLET_STATE_PREFIX, user.as_bytes()].concat()
}

/// Key for a competition's treasury ledger record
pub fn treasury_state_key(competition: &str) -> Vec<u8> {
    [keys::TREASURY_PREFIX, competition.as_bytes()].concat()
}

fn competition_key(id: &str) -> Vec<u8> {
    [keys::COMPETITION_PREFIX, id.as_bytes()].concat()
}

fn invite_code_key(code: &str) -> Vec<u8> {
    [keys::INVITE_CODE_PREFIX, code.as_bytes()].concat()
}

/// Persistent key-value store for ledger data
///
/// Uses sled for crash-safe, embedded storage. Each wallet lives under a
/// single key, so a write either lands completely or not at all; there is no
/// separate balance key that could drift from the history.
#[derive(Clone)]
pub struct LedgerStore {
    db: sled::Db,
}

impl LedgerStore {
    /// Open or create a store at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path).map_err(|e| StoreError::OpenFailed(e.to_string()))?;
        Ok(Self { db })
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.db.is_empty())
    }

    /// Flush all pending writes to disk
    pub fn flush(&self) -> Result<(), StoreError> {
        self.db
            .flush()
            .map_err(|e| StoreError::FlushFailed(e.to_string()))?;
        Ok(())
    }

    /// Get storage statistics
    pub fn stats(&self) -> Result<StorageStats, StoreError> {
        Ok(StorageStats {
            key_count: self.db.len(),
            disk_size_bytes: self.db.size_on_disk().unwrap_or(0),
        })
    }

    // ========================================================================
    // RAW KEY-VALUE OPERATIONS
    // ========================================================================

    /// Put raw bytes
    pub fn put_raw(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.db.insert(key, value)?;
        Ok(())
    }

    /// Get raw bytes
    pub fn get_raw(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.db.get(key)?.map(|v| v.to_vec()))
    }

    /// Delete a key
    pub fn delete(&self, key: &[u8]) -> Result<(), StoreError> {
        self.db.remove(key)?;
        Ok(())
    }

    // ========================================================================
    // LEDGER STATE PERSISTENCE
    // ========================================================================

    fn load_state(&self, key: &[u8]) -> Result<Option<(LedgerState, Vec<u8>)>, StoreError> {
        match self.get_raw(key)? {
            Some(bytes) => {
                let state = LedgerState::from_bytes(&bytes)
                    .map_err(|e| StoreError::DeserializationFailed(e.to_string()))?;
                Ok(Some((state, bytes)))
            }
            None => Ok(None),
        }
    }

    fn swap_state(
        &self,
        key: &[u8],
        old: Option<&[u8]>,
        state: &LedgerState,
    ) -> Result<bool, StoreError> {
        let new_bytes = state
            .to_bytes()
            .map_err(|e| StoreError::SerializationFailed(e.to_string()))?;
        match self.db.compare_and_swap(key, old, Some(new_bytes))? {
            Ok(()) => Ok(true),
            Err(_) => Ok(false),
        }
    }

    /// Load a user's wallet ledger state
    pub fn load_wallet_state(&self, user: &str) -> Result<Option<LedgerState>, StoreError> {
        Ok(self
            .load_state(&wallet_state_key(user))?
            .map(|(state, _)| state))
    }

    /// Load a user's wallet ledger state together with the raw bytes that
    /// back it, to be used as the compare-and-swap base
    pub fn load_wallet_state_raw(
        &self,
        user: &str,
    ) -> Result<Option<(LedgerState, Vec<u8>)>, StoreError> {
        self.load_state(&wallet_state_key(user))
    }

    /// Persist a wallet state if the stored record still matches `old`
    /// (`None` means "must not exist yet").
    ///
    /// Returns false when the base was stale and nothing was written.
    pub fn swap_wallet_state(
        &self,
        user: &str,
        old: Option<&[u8]>,
        state: &LedgerState,
    ) -> Result<bool, StoreError> {
        self.swap_state(&wallet_state_key(user), old, state)
    }

    /// Load a competition's treasury ledger state
    pub fn load_treasury_state(
        &self,
        competition: &str,
    ) -> Result<Option<LedgerState>, StoreError> {
        Ok(self
            .load_state(&treasury_state_key(competition))?
            .map(|(state, _)| state))
    }

    /// Persist a treasury state under the same compare-and-swap contract as
    /// `swap_wallet_state`
    pub fn swap_treasury_state(
        &self,
        competition: &str,
        old: Option<&[u8]>,
        state: &LedgerState,
    ) -> Result<bool, StoreError> {
        self.swap_state(&treasury_state_key(competition), old, state)
    }

    // ========================================================================
    // COMPETITION PERSISTENCE
    // ========================================================================

    /// Save a competition record
    pub fn save_competition(&self, competition: &Competition) -> Result<(), StoreError> {
        let bytes = competition
            .to_bytes()
            .map_err(|e| StoreError::SerializationFailed(e.to_string()))?;
        self.put_raw(&competition_key(competition.id().as_str()), &bytes)
    }

    /// Load a competition by ID
    pub fn load_competition(&self, id: &str) -> Result<Option<Competition>, StoreError> {
        match self.get_raw(&competition_key(id))? {
            Some(bytes) => {
                let competition = Competition::from_bytes(&bytes)
                    .map_err(|e| StoreError::DeserializationFailed(e.to_string()))?;
                Ok(Some(competition))
            }
            None => Ok(None),
        }
    }

    /// Index an invite code to a competition ID
    pub fn index_invite_code(&self, code: &str, id: &str) -> Result<(), StoreError> {
        self.put_raw(&invite_code_key(code), id.as_bytes())
    }

    /// Check whether an invite code is already taken
    pub fn invite_code_exists(&self, code: &str) -> Result<bool, StoreError> {
        Ok(self.db.contains_key(invite_code_key(code))?)
    }

    /// Resolve an invite code to its competition
    pub fn load_competition_by_code(&self, code: &str) -> Result<Option<Competition>, StoreError> {
        match self.get_raw(&invite_code_key(code))? {
            Some(id_bytes) => {
                let id = String::from_utf8(id_bytes)
                    .map_err(|e| StoreError::DeserializationFailed(e.to_string()))?;
                self.load_competition(&id)
            }
            None => Ok(None),
        }
    }

    /// List every stored competition
    pub fn all_competitions(&self) -> Result<Vec<Competition>, StoreError> {
        let mut competitions = Vec::new();
        for result in self.db.scan_prefix(keys::COMPETITION_PREFIX) {
            let (_, bytes) = result?;
            let competition = Competition::from_bytes(&bytes)
                .map_err(|e| StoreError::DeserializationFailed(e.to_string()))?;
            competitions.push(competition);
        }
        Ok(competitions)
    }

    // ========================================================================
    // ATOMIC TRANSFERS
    // ========================================================================

    /// Debit one ledger and credit another as a single atomic unit.
    ///
    /// Both records are read, mutated and written inside one sled
    /// transaction: either both sides commit or neither does. A missing
    /// record starts from an empty zero-balance ledger with the given owner
    /// tag, so a debit from a never-funded wallet fails with
    /// `InsufficientFunds` rather than a missing-key error.
    ///
    /// Returns the post-transfer states as `(debit, credit)`.
    pub fn transfer(
        &self,
        debit_key: &[u8],
        debit_owner: WalletTag,
        credit_key: &[u8],
        credit_owner: WalletTag,
        debit_tx: &Transaction,
        credit_tx: &Transaction,
    ) -> Result<(LedgerState, LedgerState), TransferError> {
        let result = self.db.transaction(|tx| {
            let mut debit_state = match tx.get(debit_key)? {
                Some(bytes) => LedgerState::from_bytes(&bytes).map_err(|e| {
                    ConflictableTransactionError::Abort(TransferError::Store(
                        StoreError::DeserializationFailed(e.to_string()),
                    ))
                })?,
                None => LedgerState::new(debit_owner.clone()),
            };
            let mut credit_state = match tx.get(credit_key)? {
                Some(bytes) => LedgerState::from_bytes(&bytes).map_err(|e| {
                    ConflictableTransactionError::Abort(TransferError::Store(
                        StoreError::DeserializationFailed(e.to_string()),
                    ))
                })?,
                None => LedgerState::new(credit_owner.clone()),
            };

            debit_state
                .apply(debit_tx.clone())
                .map_err(|e| ConflictableTransactionError::Abort(TransferError::State(e)))?;
            credit_state
                .apply(credit_tx.clone())
                .map_err(|e| ConflictableTransactionError::Abort(TransferError::State(e)))?;

            let debit_bytes = debit_state.to_bytes().map_err(|e| {
                ConflictableTransactionError::Abort(TransferError::Store(
                    StoreError::SerializationFailed(e.to_string()),
                ))
            })?;
            let credit_bytes = credit_state.to_bytes().map_err(|e| {
                ConflictableTransactionError::Abort(TransferError::Store(
                    StoreError::SerializationFailed(e.to_string()),
                ))
            })?;

            tx.insert(debit_key, debit_bytes)?;
            tx.insert(credit_key, credit_bytes)?;

            Ok((debit_state, credit_state))
        });

        match result {
            Ok(states) => Ok(states),
            Err(TransactionError::Abort(e)) => Err(e),
            Err(TransactionError::Storage(e)) => Err(TransferError::Store(e.into())),
        }
    }
}
