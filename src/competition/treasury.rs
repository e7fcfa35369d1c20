// CompetitionLedger - Registry operations and the per-competition treasury wallet

use crate::competition::{Competition, CompetitionRules, InviteCode};
use crate::ledger::{
    Amount, LedgerState, LedgerStateError, Transaction, TxKind, WalletTag,
};
use crate::storage::{
    treasury_state_key, wallet_state_key, LedgerStore, StoreError, TransferError,
};
use crate::wallet::UserId;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info};

/// Errors from competition operations
#[derive(Error, Debug)]
pub enum CompetitionError {
    #[error("Competition not found")]
    NotFound,

    #[error("Invalid invite code: {0}")]
    InvalidInviteCode(String),

    #[error("Already joined this competition")]
    AlreadyJoined,

    #[error("Not a participant in this competition")]
    NotParticipant,

    #[error("Only the admin can perform this operation")]
    NotAdmin,

    #[error("Competition is no longer active")]
    Inactive,

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Insufficient balance: available {available}, required {required}")]
    InsufficientFunds { available: Amount, required: Amount },

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Ledger state error: {0}")]
    Ledger(LedgerStateError),

    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),
}

impl From<TransferError> for CompetitionError {
    fn from(err: TransferError) -> Self {
        match err {
            TransferError::State(LedgerStateError::InsufficientFunds {
                available,
                required,
            }) => CompetitionError::InsufficientFunds {
                available,
                required,
            },
            TransferError::State(other) => CompetitionError::Ledger(other),
            TransferError::Store(store) => CompetitionError::Storage(store),
        }
    }
}

/// Result of a fee payment or prize payout
#[derive(Clone, Debug)]
pub struct TransferReceipt {
    /// The user's wallet balance after the transfer
    pub wallet_balance: Amount,
    /// The competition treasury balance after the transfer
    pub treasury_balance: Amount,
    /// The record written to the user's wallet
    pub transaction: Transaction,
}

/// Competition registry plus treasury bookkeeping.
///
/// Shares the `LedgerStore` with `WalletLedger`; fee payments and prize
/// payouts debit one ledger and credit the other inside a single storage
/// transaction, so the two sides can never disagree.
pub struct CompetitionLedger {
    store: LedgerStore,
}

impl CompetitionLedger {
    /// Build a competition ledger over an existing store handle
    pub fn with_store(store: LedgerStore) -> Self {
        Self { store }
    }

    // ========================================================================
    // REGISTRY
    // ========================================================================

    /// Create a competition: register it, index its invite code and
    /// initialize a zero-balance treasury
    pub fn create(
        &self,
        admin: &UserId,
        name: &str,
        rules: CompetitionRules,
    ) -> Result<Competition, CompetitionError> {
        let mut competition = Competition::new(name, admin.clone(), rules);
        while self
            .store
            .invite_code_exists(competition.invite_code().as_str())?
        {
            competition.regenerate_invite_code();
        }

        self.store.save_competition(&competition)?;
        self.store.index_invite_code(
            competition.invite_code().as_str(),
            competition.id().as_str(),
        )?;

        let treasury = LedgerState::new(WalletTag::Competition);
        self.store
            .swap_treasury_state(competition.id().as_str(), None, &treasury)?;
        self.store.flush()?;

        info!(
            competition = %competition.id(),
            admin = %admin,
            invite_code = %competition.invite_code(),
            "created competition"
        );
        Ok(competition)
    }

    /// Join a competition by invite code
    pub fn join(&self, user: &UserId, code: &str) -> Result<Competition, CompetitionError> {
        let code = InviteCode::parse(code)?;
        let mut competition = self
            .store
            .load_competition_by_code(code.as_str())?
            .ok_or(CompetitionError::NotFound)?;

        if competition.is_participant(user) {
            return Err(CompetitionError::AlreadyJoined);
        }

        competition.add_participant(user.clone());
        self.store.save_competition(&competition)?;
        self.store.flush()?;

        debug!(competition = %competition.id(), user = %user, "user joined competition");
        Ok(competition)
    }

    /// Get a competition by ID
    pub fn get(&self, id: &str) -> Result<Competition, CompetitionError> {
        self.store
            .load_competition(id)?
            .ok_or(CompetitionError::NotFound)
    }

    /// Resolve an invite code to its competition
    pub fn find_by_code(&self, code: &str) -> Result<Competition, CompetitionError> {
        let code = InviteCode::parse(code)?;
        self.store
            .load_competition_by_code(code.as_str())?
            .ok_or(CompetitionError::NotFound)
    }

    /// List the competitions a user participates in
    pub fn competitions_of(&self, user: &UserId) -> Result<Vec<Competition>, CompetitionError> {
        let competitions = self
            .store
            .all_competitions()?
            .into_iter()
            .filter(|c| c.is_participant(user))
            .collect();
        Ok(competitions)
    }

    /// Replace the standings and optionally advance the matchday
    /// (admin only)
    pub fn update_standings(
        &self,
        caller: &UserId,
        id: &str,
        standings: HashMap<String, i64>,
        matchday: Option<u32>,
    ) -> Result<Competition, CompetitionError> {
        let mut competition = self.get(id)?;
        if !competition.is_admin(caller) {
            return Err(CompetitionError::NotAdmin);
        }

        competition.set_standings(standings, matchday);
        self.store.save_competition(&competition)?;
        self.store.flush()?;
        Ok(competition)
    }

    /// Close a competition so it stops accepting fee payments (admin only)
    pub fn close(&self, caller: &UserId, id: &str) -> Result<Competition, CompetitionError> {
        let mut competition = self.get(id)?;
        if !competition.is_admin(caller) {
            return Err(CompetitionError::NotAdmin);
        }

        competition.deactivate();
        self.store.save_competition(&competition)?;
        self.store.flush()?;

        info!(competition = %competition.id(), "competition closed");
        Ok(competition)
    }

    // ========================================================================
    // TREASURY
    // ========================================================================

    /// Pay a matchday fee from the user's personal wallet into the
    /// competition treasury, atomically
    pub fn pay_matchday_fee(
        &self,
        user: &UserId,
        id: &str,
        amount: Amount,
    ) -> Result<TransferReceipt, CompetitionError> {
        if amount.is_zero() {
            return Err(CompetitionError::InvalidAmount(
                "amount must be positive".to_string(),
            ));
        }

        let competition = self.get(id)?;
        if !competition.is_active() {
            return Err(CompetitionError::Inactive);
        }
        if !competition.is_participant(user) {
            return Err(CompetitionError::NotParticipant);
        }

        let debit_tx = Transaction::new(
            TxKind::MatchdayPayment,
            amount,
            format!(
                "Matchday {} fee for {}",
                competition.current_matchday(),
                competition.name()
            ),
            WalletTag::Personal,
            WalletTag::Competition,
        );
        let credit_tx = Transaction::new(
            TxKind::MatchdayPayment,
            amount,
            format!(
                "Matchday {} fee from {}",
                competition.current_matchday(),
                user
            ),
            WalletTag::Personal,
            WalletTag::Competition,
        );

        let (wallet_state, treasury_state) = self.store.transfer(
            &wallet_state_key(user.as_str()),
            WalletTag::Personal,
            &treasury_state_key(id),
            WalletTag::Competition,
            &debit_tx,
            &credit_tx,
        )?;
        self.store.flush()?;

        info!(
            competition = %competition.id(),
            user = %user,
            amount = %amount,
            "matchday fee paid"
        );

        Ok(TransferReceipt {
            wallet_balance: wallet_state.balance(),
            treasury_balance: treasury_state.balance(),
            transaction: debit_tx,
        })
    }

    /// Pay a prize from the competition treasury into a participant's
    /// personal wallet, atomically (admin only)
    pub fn award_prize(
        &self,
        caller: &UserId,
        id: &str,
        recipient: &UserId,
        amount: Amount,
    ) -> Result<TransferReceipt, CompetitionError> {
        if amount.is_zero() {
            return Err(CompetitionError::InvalidAmount(
                "amount must be positive".to_string(),
            ));
        }

        let competition = self.get(id)?;
        if !competition.is_admin(caller) {
            return Err(CompetitionError::NotAdmin);
        }
        if !competition.is_participant(recipient) {
            return Err(CompetitionError::NotParticipant);
        }

        let debit_tx = Transaction::new(
            TxKind::PrizeReceived,
            amount,
            format!("Prize payout to {}", recipient),
            WalletTag::Competition,
            WalletTag::Personal,
        );
        let credit_tx = Transaction::new(
            TxKind::PrizeReceived,
            amount,
            format!("Prize from {}", competition.name()),
            WalletTag::Competition,
            WalletTag::Personal,
        );

        let (treasury_state, wallet_state) = self.store.transfer(
            &treasury_state_key(id),
            WalletTag::Competition,
            &wallet_state_key(recipient.as_str()),
            WalletTag::Personal,
            &debit_tx,
            &credit_tx,
        )?;
        self.store.flush()?;

        info!(
            competition = %competition.id(),
            recipient = %recipient,
            amount = %amount,
            "prize awarded"
        );

        Ok(TransferReceipt {
            wallet_balance: wallet_state.balance(),
            treasury_balance: treasury_state.balance(),
            transaction: credit_tx,
        })
    }

    /// Current treasury balance; zero for a treasury that has never
    /// collected a fee
    pub fn treasury_balance(&self, id: &str) -> Result<Amount, CompetitionError> {
        self.get(id)?;
        let balance = self
            .store
            .load_treasury_state(id)?
            .map(|state| state.balance())
            .unwrap_or(Amount::ZERO);
        Ok(balance)
    }

    /// Treasury transaction history, newest-first
    pub fn treasury_transactions(&self, id: &str) -> Result<Vec<Transaction>, CompetitionError> {
        self.get(id)?;
        let transactions = self
            .store
            .load_treasury_state(id)?
            .map(|state| state.transactions().to_vec())
            .unwrap_or_default();
        Ok(transactions)
    }
}
