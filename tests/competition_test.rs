// Competition tests: registry, invite codes, fee payments and prize payouts

use fantapay_ledger::{
    Amount, CompetitionError, CompetitionLedger, CompetitionRules, LedgerStore, Mutation,
    PrizeSlot, TxKind, UserId, WalletLedger,
};
use std::collections::HashMap;
use tempfile::TempDir;

mod common;

fn amount(s: &str) -> Amount {
    s.parse().unwrap()
}

fn setup(temp_dir: &TempDir) -> (WalletLedger, CompetitionLedger) {
    common::init_tracing();
    let store = LedgerStore::open(temp_dir.path()).unwrap();
    (
        WalletLedger::with_store(store.clone()),
        CompetitionLedger::with_store(store),
    )
}

fn daily_rules() -> CompetitionRules {
    CompetitionRules::daily(amount("5.00"))
}

// ============================================================================
// REGISTRY TESTS
// ============================================================================

#[test]
fn test_create_registers_competition_with_zero_treasury() {
    let temp_dir = TempDir::new().unwrap();
    let (_, competitions) = setup(&temp_dir);
    let admin = UserId::from("admin-1");

    let competition = competitions
        .create(&admin, "Serie A Friends", daily_rules())
        .unwrap();

    assert_eq!(competition.invite_code().as_str().len(), 8);
    assert!(competition.is_participant(&admin));
    assert_eq!(
        competitions
            .treasury_balance(competition.id().as_str())
            .unwrap(),
        Amount::ZERO
    );
}

#[test]
fn test_join_by_invite_code() {
    let temp_dir = TempDir::new().unwrap();
    let (_, competitions) = setup(&temp_dir);
    let admin = UserId::from("admin-1");
    let player = UserId::from("player-1");

    let competition = competitions
        .create(&admin, "Serie A Friends", daily_rules())
        .unwrap();

    // Codes are case-insensitive on entry
    let lowered = competition.invite_code().as_str().to_lowercase();
    let joined = competitions.join(&player, &lowered).unwrap();

    assert!(joined.is_participant(&player));
    assert_eq!(joined.participants().len(), 2);
}

#[test]
fn test_duplicate_join_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let (_, competitions) = setup(&temp_dir);
    let admin = UserId::from("admin-1");
    let player = UserId::from("player-1");

    let competition = competitions
        .create(&admin, "Serie A Friends", daily_rules())
        .unwrap();

    competitions
        .join(&player, competition.invite_code().as_str())
        .unwrap();
    let result = competitions.join(&player, competition.invite_code().as_str());

    assert!(matches!(result, Err(CompetitionError::AlreadyJoined)));
}

#[test]
fn test_unknown_invite_code_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let (_, competitions) = setup(&temp_dir);

    let result = competitions.join(&UserId::from("player-1"), "ZZZZ9999");
    assert!(matches!(result, Err(CompetitionError::NotFound)));

    let result = competitions.join(&UserId::from("player-1"), "not a code");
    assert!(matches!(result, Err(CompetitionError::InvalidInviteCode(_))));
}

#[test]
fn test_competitions_of_lists_only_joined() {
    let temp_dir = TempDir::new().unwrap();
    let (_, competitions) = setup(&temp_dir);
    let admin = UserId::from("admin-1");
    let player = UserId::from("player-1");

    let first = competitions
        .create(&admin, "Serie A Friends", daily_rules())
        .unwrap();
    competitions
        .create(&admin, "Champions Pool", daily_rules())
        .unwrap();

    competitions
        .join(&player, first.invite_code().as_str())
        .unwrap();

    let mine = competitions.competitions_of(&player).unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id(), first.id());

    let admins = competitions.competitions_of(&admin).unwrap();
    assert_eq!(admins.len(), 2);
}

#[test]
fn test_update_standings_is_admin_only() {
    let temp_dir = TempDir::new().unwrap();
    let (_, competitions) = setup(&temp_dir);
    let admin = UserId::from("admin-1");
    let player = UserId::from("player-1");

    let competition = competitions
        .create(&admin, "Serie A Friends", daily_rules())
        .unwrap();
    competitions
        .join(&player, competition.invite_code().as_str())
        .unwrap();

    let mut standings = HashMap::new();
    standings.insert("player-1".to_string(), 66i64);

    let result = competitions.update_standings(
        &player,
        competition.id().as_str(),
        standings.clone(),
        Some(2),
    );
    assert!(matches!(result, Err(CompetitionError::NotAdmin)));

    let updated = competitions
        .update_standings(&admin, competition.id().as_str(), standings, Some(2))
        .unwrap();
    assert_eq!(updated.current_matchday(), 2);
    assert_eq!(updated.standings().get("player-1"), Some(&66i64));
}

// ============================================================================
// FEE PAYMENT TESTS
// ============================================================================

#[test]
fn test_matchday_fee_moves_funds_to_treasury() {
    let temp_dir = TempDir::new().unwrap();
    let (wallets, competitions) = setup(&temp_dir);
    let admin = UserId::from("admin-1");
    let player = UserId::from("player-1");

    let competition = competitions
        .create(&admin, "Serie A Friends", daily_rules())
        .unwrap();
    competitions
        .join(&player, competition.invite_code().as_str())
        .unwrap();

    wallets
        .apply(&player, Mutation::deposit(amount("50.00"), "Wallet top-up"))
        .unwrap();

    let receipt = competitions
        .pay_matchday_fee(&player, competition.id().as_str(), amount("10.00"))
        .unwrap();

    assert_eq!(receipt.wallet_balance, amount("40.00"));
    assert_eq!(receipt.treasury_balance, amount("10.00"));
    assert_eq!(receipt.transaction.kind(), &TxKind::MatchdayPayment);

    assert_eq!(wallets.balance(&player).unwrap(), amount("40.00"));
    assert_eq!(
        competitions
            .treasury_balance(competition.id().as_str())
            .unwrap(),
        amount("10.00")
    );

    // The fee is the newest entry on both sides
    let wallet_txs = wallets.transactions(&player).unwrap();
    assert_eq!(wallet_txs[0].kind(), &TxKind::MatchdayPayment);
    let treasury_txs = competitions
        .treasury_transactions(competition.id().as_str())
        .unwrap();
    assert_eq!(treasury_txs.len(), 1);
    assert_eq!(treasury_txs[0].amount(), amount("10.00"));
}

#[test]
fn test_fee_from_non_participant_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let (wallets, competitions) = setup(&temp_dir);
    let admin = UserId::from("admin-1");
    let outsider = UserId::from("outsider");

    let competition = competitions
        .create(&admin, "Serie A Friends", daily_rules())
        .unwrap();
    wallets
        .apply(&outsider, Mutation::deposit(amount("50.00"), "Wallet top-up"))
        .unwrap();

    let result =
        competitions.pay_matchday_fee(&outsider, competition.id().as_str(), amount("10.00"));

    assert!(matches!(result, Err(CompetitionError::NotParticipant)));
    assert_eq!(wallets.balance(&outsider).unwrap(), amount("50.00"));
}

#[test]
fn test_fee_without_funds_leaves_both_sides_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let (wallets, competitions) = setup(&temp_dir);
    let admin = UserId::from("admin-1");
    let player = UserId::from("player-1");

    let competition = competitions
        .create(&admin, "Serie A Friends", daily_rules())
        .unwrap();
    competitions
        .join(&player, competition.invite_code().as_str())
        .unwrap();
    wallets
        .apply(&player, Mutation::deposit(amount("3.00"), "Wallet top-up"))
        .unwrap();

    let result =
        competitions.pay_matchday_fee(&player, competition.id().as_str(), amount("10.00"));

    assert!(matches!(
        result,
        Err(CompetitionError::InsufficientFunds { .. })
    ));
    assert_eq!(wallets.balance(&player).unwrap(), amount("3.00"));
    assert_eq!(
        competitions
            .treasury_balance(competition.id().as_str())
            .unwrap(),
        Amount::ZERO
    );
}

#[test]
fn test_fee_after_close_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let (wallets, competitions) = setup(&temp_dir);
    let admin = UserId::from("admin-1");
    let player = UserId::from("player-1");

    let competition = competitions
        .create(&admin, "Serie A Friends", daily_rules())
        .unwrap();
    competitions
        .join(&player, competition.invite_code().as_str())
        .unwrap();
    wallets
        .apply(&player, Mutation::deposit(amount("50.00"), "Wallet top-up"))
        .unwrap();

    // Only the admin can close
    let result = competitions.close(&player, competition.id().as_str());
    assert!(matches!(result, Err(CompetitionError::NotAdmin)));

    let closed = competitions.close(&admin, competition.id().as_str()).unwrap();
    assert!(!closed.is_active());

    let result =
        competitions.pay_matchday_fee(&player, competition.id().as_str(), amount("5.00"));
    assert!(matches!(result, Err(CompetitionError::Inactive)));
    assert_eq!(wallets.balance(&player).unwrap(), amount("50.00"));
}

// ============================================================================
// PRIZE PAYOUT TESTS
// ============================================================================

#[test]
fn test_prize_payout_credits_the_winner() {
    let temp_dir = TempDir::new().unwrap();
    let (wallets, competitions) = setup(&temp_dir);
    let admin = UserId::from("admin-1");
    let winner = UserId::from("player-1");

    let competition = competitions
        .create(
            &admin,
            "Serie A Friends",
            CompetitionRules::final_pool(vec![PrizeSlot {
                position: 1,
                amount: amount("15.00"),
                description: "Season winner".to_string(),
            }]),
        )
        .unwrap();
    competitions
        .join(&winner, competition.invite_code().as_str())
        .unwrap();

    // Fund the treasury through fees
    wallets
        .apply(&winner, Mutation::deposit(amount("50.00"), "Wallet top-up"))
        .unwrap();
    competitions
        .pay_matchday_fee(&winner, competition.id().as_str(), amount("20.00"))
        .unwrap();

    let receipt = competitions
        .award_prize(&admin, competition.id().as_str(), &winner, amount("15.00"))
        .unwrap();

    assert_eq!(receipt.treasury_balance, amount("5.00"));
    assert_eq!(receipt.wallet_balance, amount("45.00"));
    assert_eq!(receipt.transaction.kind(), &TxKind::PrizeReceived);

    let newest = wallets.transactions(&winner).unwrap();
    assert_eq!(newest[0].kind(), &TxKind::PrizeReceived);
    assert_eq!(newest[0].amount(), amount("15.00"));
}

#[test]
fn test_prize_requires_admin_and_treasury_funds() {
    let temp_dir = TempDir::new().unwrap();
    let (_, competitions) = setup(&temp_dir);
    let admin = UserId::from("admin-1");
    let player = UserId::from("player-1");

    let competition = competitions
        .create(&admin, "Serie A Friends", daily_rules())
        .unwrap();
    competitions
        .join(&player, competition.invite_code().as_str())
        .unwrap();

    // Non-admin cannot award
    let result =
        competitions.award_prize(&player, competition.id().as_str(), &player, amount("5.00"));
    assert!(matches!(result, Err(CompetitionError::NotAdmin)));

    // Empty treasury cannot pay
    let result =
        competitions.award_prize(&admin, competition.id().as_str(), &player, amount("5.00"));
    assert!(matches!(
        result,
        Err(CompetitionError::InsufficientFunds { .. })
    ));
}

#[test]
fn test_prize_to_non_participant_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let (_, competitions) = setup(&temp_dir);
    let admin = UserId::from("admin-1");
    let outsider = UserId::from("outsider");

    let competition = competitions
        .create(&admin, "Serie A Friends", daily_rules())
        .unwrap();

    let result =
        competitions.award_prize(&admin, competition.id().as_str(), &outsider, amount("5.00"));
    assert!(matches!(result, Err(CompetitionError::NotParticipant)));
}
