// Competition model - Registry records: rules, invite codes, participants

use crate::competition::CompetitionError;
use crate::ledger::Amount;
use crate::wallet::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Unique competition identifier (random, hex-rendered)
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompetitionId(String);

impl CompetitionId {
    /// Generate a fresh random ID
    pub fn generate() -> Self {
        use rand::RngCore;
        let mut bytes = [0u8; 12];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CompetitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Shareable join code: 8 uppercase alphanumeric characters
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InviteCode(String);

impl InviteCode {
    pub const LEN: usize = 8;
    const CHARSET: &'static [u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

    /// Generate a fresh random code
    pub fn generate() -> Self {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        let code: String = (0..Self::LEN)
            .map(|_| Self::CHARSET[rng.gen_range(0..Self::CHARSET.len())] as char)
            .collect();
        Self(code)
    }

    /// Accept a user-entered code, normalizing case
    pub fn parse(code: &str) -> Result<Self, CompetitionError> {
        let normalized = code.trim().to_uppercase();
        if normalized.len() != Self::LEN
            || !normalized.bytes().all(|b| Self::CHARSET.contains(&b))
        {
            return Err(CompetitionError::InvalidInviteCode(code.to_string()));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InviteCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a competition pays out
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleKind {
    /// A fixed prize per matchday winner
    Daily,
    /// A prize pool split at the end of the season
    Final,
    /// Both per-matchday prizes and a final pool
    Mixed,
}

/// One slot of a final prize pool
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizeSlot {
    pub position: u32,
    pub amount: Amount,
    pub description: String,
}

/// Payout scheme for a competition
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetitionRules {
    kind: RuleKind,
    daily_prize: Option<Amount>,
    final_prize_pool: Vec<PrizeSlot>,
}

impl CompetitionRules {
    pub fn daily(prize: Amount) -> Self {
        Self {
            kind: RuleKind::Daily,
            daily_prize: Some(prize),
            final_prize_pool: Vec::new(),
        }
    }

    pub fn final_pool(slots: Vec<PrizeSlot>) -> Self {
        Self {
            kind: RuleKind::Final,
            daily_prize: None,
            final_prize_pool: slots,
        }
    }

    pub fn mixed(daily_prize: Amount, slots: Vec<PrizeSlot>) -> Self {
        Self {
            kind: RuleKind::Mixed,
            daily_prize: Some(daily_prize),
            final_prize_pool: slots,
        }
    }

    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    pub fn daily_prize(&self) -> Option<Amount> {
        self.daily_prize
    }

    pub fn final_prize_pool(&self) -> &[PrizeSlot] {
        &self.final_prize_pool
    }
}

/// A competition: who runs it, who plays in it, and how it pays out.
///
/// The treasury wallet is stored separately as a `LedgerState` keyed by the
/// competition ID; this record never carries a balance of its own.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Competition {
    id: CompetitionId,
    name: String,
    admin: UserId,
    rules: CompetitionRules,
    invite_code: InviteCode,
    participants: Vec<UserId>,
    /// Points per user ID
    standings: HashMap<String, i64>,
    current_matchday: u32,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl Competition {
    /// Create a competition; the admin is the first participant
    pub fn new(name: impl Into<String>, admin: UserId, rules: CompetitionRules) -> Self {
        Self {
            id: CompetitionId::generate(),
            name: name.into(),
            admin: admin.clone(),
            rules,
            invite_code: InviteCode::generate(),
            participants: vec![admin],
            standings: HashMap::new(),
            current_matchday: 1,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &CompetitionId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn admin(&self) -> &UserId {
        &self.admin
    }

    pub fn rules(&self) -> &CompetitionRules {
        &self.rules
    }

    pub fn invite_code(&self) -> &InviteCode {
        &self.invite_code
    }

    pub fn participants(&self) -> &[UserId] {
        &self.participants
    }

    pub fn standings(&self) -> &HashMap<String, i64> {
        &self.standings
    }

    pub fn current_matchday(&self) -> u32 {
        self.current_matchday
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_admin(&self, user: &UserId) -> bool {
        self.admin == *user
    }

    pub fn is_participant(&self, user: &UserId) -> bool {
        self.participants.contains(user)
    }

    /// Add a participant; the caller checks for duplicates first
    pub fn add_participant(&mut self, user: UserId) {
        self.participants.push(user);
    }

    /// Replace the standings and optionally advance the matchday
    pub fn set_standings(&mut self, standings: HashMap<String, i64>, matchday: Option<u32>) {
        self.standings = standings;
        if let Some(matchday) = matchday {
            self.current_matchday = matchday;
        }
    }

    /// Mark the competition as finished
    pub fn deactivate(&mut self) {
        self.is_active = false;
    }

    /// Replace a colliding invite code with a fresh one
    pub(crate) fn regenerate_invite_code(&mut self) {
        self.invite_code = InviteCode::generate();
    }

    /// Serialize to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, CompetitionError> {
        postcard::to_allocvec(self)
            .map_err(|e| CompetitionError::SerializationFailed(e.to_string()))
    }

    /// Deserialize from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CompetitionError> {
        postcard::from_bytes(bytes)
            .map_err(|e| CompetitionError::DeserializationFailed(e.to_string()))
    }
}
