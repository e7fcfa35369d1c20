// Mutation - A validated request to change a wallet's balance

use crate::ledger::{Amount, Transaction, TxKind, WalletTag};

/// A balance-affecting request: what kind of movement, how much, between
/// which account tags, and a human-readable description.
///
/// Validation happens before any state is touched; an invalid mutation never
/// reaches storage.
#[derive(Clone, Debug)]
pub struct Mutation {
    kind: TxKind,
    amount: Amount,
    from_wallet: WalletTag,
    to_wallet: WalletTag,
    description: String,
}

impl Mutation {
    /// Create a mutation with explicit account tags
    pub fn new(
        kind: TxKind,
        amount: Amount,
        from_wallet: WalletTag,
        to_wallet: WalletTag,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            amount,
            from_wallet,
            to_wallet,
            description: description.into(),
        }
    }

    /// A top-up from an external source into the personal wallet
    pub fn deposit(amount: Amount, description: impl Into<String>) -> Self {
        Self::new(
            TxKind::Deposit,
            amount,
            WalletTag::External,
            WalletTag::Personal,
            description,
        )
    }

    /// A withdrawal from the personal wallet to an external destination
    pub fn withdraw(amount: Amount, description: impl Into<String>) -> Self {
        Self::new(
            TxKind::Withdraw,
            amount,
            WalletTag::Personal,
            WalletTag::External,
            description,
        )
    }

    /// A refund credited back into the personal wallet
    pub fn refund(amount: Amount, description: impl Into<String>) -> Self {
        Self::new(
            TxKind::Refund,
            amount,
            WalletTag::Competition,
            WalletTag::Personal,
            description,
        )
    }

    pub fn kind(&self) -> &TxKind {
        &self.kind
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn from_wallet(&self) -> &WalletTag {
        &self.from_wallet
    }

    pub fn to_wallet(&self) -> &WalletTag {
        &self.to_wallet
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Turn the request into an immutable transaction record with a fresh
    /// ID and timestamp
    pub fn into_transaction(self) -> Transaction {
        Transaction::new(
            self.kind,
            self.amount,
            self.description,
            self.from_wallet,
            self.to_wallet,
        )
    }
}
