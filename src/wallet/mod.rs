// Wallet module - The per-user wallet ledger and its mutation contract

mod ledger;
mod mutation;
mod user;

pub use ledger::{MutationReceipt, WalletError, WalletLedger};
pub use mutation::Mutation;
pub use user::UserId;
