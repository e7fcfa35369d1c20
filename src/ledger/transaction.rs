// Transaction - One immutable record of a balance-affecting event

use crate::ledger::Amount;
use chrono::{DateTime, Utc};
use serde::de::{Deserializer, Error as DeError};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Unique identifier for a transaction (SHA256 over contents, timestamp and a nonce)
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId([u8; 32]);

impl TransactionId {
    /// Create a TransactionId from raw bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Transaction type - an open, string-tagged enumeration.
///
/// Tags the ledger does not know about survive round-trips via `Other`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TxKind {
    Deposit,
    Withdraw,
    MatchdayPayment,
    PrizeReceived,
    Refund,
    Other(String),
}

impl TxKind {
    pub fn as_str(&self) -> &str {
        match self {
            TxKind::Deposit => "deposit",
            TxKind::Withdraw => "withdraw",
            TxKind::MatchdayPayment => "matchday_payment",
            TxKind::PrizeReceived => "prize_received",
            TxKind::Refund => "refund",
            TxKind::Other(tag) => tag,
        }
    }
}

impl From<&str> for TxKind {
    fn from(tag: &str) -> Self {
        match tag {
            "deposit" => TxKind::Deposit,
            "withdraw" => TxKind::Withdraw,
            "matchday_payment" => TxKind::MatchdayPayment,
            "prize_received" => TxKind::PrizeReceived,
            "refund" => TxKind::Refund,
            other => TxKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TxKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TxKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(TxKind::from(tag.as_str()))
    }
}

/// Source or destination account tag - also an open, string-tagged set
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WalletTag {
    Personal,
    Competition,
    External,
    Other(String),
}

impl WalletTag {
    pub fn as_str(&self) -> &str {
        match self {
            WalletTag::Personal => "personal",
            WalletTag::Competition => "competition",
            WalletTag::External => "external",
            WalletTag::Other(tag) => tag,
        }
    }
}

impl From<&str> for WalletTag {
    fn from(tag: &str) -> Self {
        match tag {
            "personal" => WalletTag::Personal,
            "competition" => WalletTag::Competition,
            "external" => WalletTag::External,
            other => WalletTag::Other(other.to_string()),
        }
    }
}

impl fmt::Display for WalletTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for WalletTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for WalletTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(WalletTag::from(tag.as_str()))
    }
}

/// Transaction status.
///
/// Every mutation is synchronous and either completes or fails before a
/// record is written, so `Completed` is the only state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxStatus {
    Completed,
}

impl TxStatus {
    pub fn as_str(&self) -> &str {
        "completed"
    }
}

impl Serialize for TxStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TxStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        match tag.as_str() {
            "completed" => Ok(TxStatus::Completed),
            other => Err(D::Error::custom(format!("unknown status: {}", other))),
        }
    }
}

/// Direction of a transaction relative to a wallet
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionDirection {
    Incoming,
    Outgoing,
}

/// An immutable record of one ledger mutation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    id: TransactionId,
    kind: TxKind,
    amount: Amount,
    description: String,
    from_wallet: WalletTag,
    to_wallet: WalletTag,
    status: TxStatus,
    created_at: DateTime<Utc>,
}

impl Transaction {
    /// Create a transaction stamped with the current time and a fresh ID
    pub fn new(
        kind: TxKind,
        amount: Amount,
        description: String,
        from_wallet: WalletTag,
        to_wallet: WalletTag,
    ) -> Self {
        let created_at = Utc::now();
        let id = Self::generate_id(&kind, amount, &description, &from_wallet, &to_wallet, &created_at);
        Self {
            id,
            kind,
            amount,
            description,
            from_wallet,
            to_wallet,
            status: TxStatus::Completed,
            created_at,
        }
    }

    fn generate_id(
        kind: &TxKind,
        amount: Amount,
        description: &str,
        from_wallet: &WalletTag,
        to_wallet: &WalletTag,
        created_at: &DateTime<Utc>,
    ) -> TransactionId {
        use rand::RngCore;

        let mut hasher = Sha256::new();
        hasher.update(b"txid:");
        hasher.update(kind.as_str().as_bytes());
        hasher.update(amount.minor().to_le_bytes());
        hasher.update(description.as_bytes());
        hasher.update(from_wallet.as_str().as_bytes());
        hasher.update(to_wallet.as_str().as_bytes());
        hasher.update(created_at.timestamp_millis().to_le_bytes());
        // Nonce keeps IDs unique for identical mutations in the same millisecond
        hasher.update(rand::thread_rng().next_u64().to_le_bytes());

        let digest = hasher.finalize();
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        TransactionId::from_bytes(bytes)
    }

    pub fn id(&self) -> &TransactionId {
        &self.id
    }

    pub fn kind(&self) -> &TxKind {
        &self.kind
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn from_wallet(&self) -> &WalletTag {
        &self.from_wallet
    }

    pub fn to_wallet(&self) -> &WalletTag {
        &self.to_wallet
    }

    pub fn status(&self) -> TxStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Direction relative to the wallet identified by `owner`:
    /// incoming when the destination account is the owner's own tag.
    pub fn direction_for(&self, owner: &WalletTag) -> TransactionDirection {
        if self.to_wallet == *owner {
            TransactionDirection::Incoming
        } else {
            TransactionDirection::Outgoing
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deposit(amount: u64) -> Transaction {
        Transaction::new(
            TxKind::Deposit,
            Amount::from_minor(amount),
            "Wallet top-up".to_string(),
            WalletTag::External,
            WalletTag::Personal,
        )
    }

    #[test]
    fn test_ids_are_unique_for_identical_mutations() {
        let a = deposit(5000);
        let b = deposit(5000);

        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_direction_relative_to_owner() {
        let tx = deposit(5000);

        assert_eq!(
            tx.direction_for(&WalletTag::Personal),
            TransactionDirection::Incoming
        );
        assert_eq!(
            tx.direction_for(&WalletTag::Competition),
            TransactionDirection::Outgoing
        );
    }

    #[test]
    fn test_kind_round_trips_unknown_tags() {
        let kind = TxKind::from("bonus");
        assert_eq!(kind, TxKind::Other("bonus".to_string()));
        assert_eq!(kind.as_str(), "bonus");
        assert_eq!(TxKind::from("matchday_payment"), TxKind::MatchdayPayment);
    }

    #[test]
    fn test_transaction_serialization_round_trip() {
        let tx = deposit(1234);
        let bytes = postcard::to_allocvec(&tx).unwrap();
        let decoded: Transaction = postcard::from_bytes(&bytes).unwrap();

        assert_eq!(decoded, tx);
        assert_eq!(decoded.status(), TxStatus::Completed);
    }
}
