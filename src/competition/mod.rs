// Competition module - Registry, invite codes and treasury bookkeeping

mod model;
mod treasury;

pub use model::{
    Competition, CompetitionId, CompetitionRules, InviteCode, PrizeSlot, RuleKind,
};
pub use treasury::{CompetitionError, CompetitionLedger, TransferReceipt};
