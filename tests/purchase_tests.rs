//! Purchase flow: balance gate and mutation-call ordering.

mod common;

use common::{sample_game, sample_user, RecordingBackend};
use teloxide::types::ChatId;

use sportstips_bot::bot::purchase::{purchase_tip, PurchaseOutcome};
use sportstips_bot::session::{ContextCache, UserContext};

const CHAT: ChatId = ChatId(42);

async fn cache_for(user_id: &str, balance: f64) -> ContextCache {
    let cache = ContextCache::new();
    cache
        .insert(
            CHAT,
            UserContext {
                user_id: user_id.to_string(),
                balance,
                telegram_id: 1000,
            },
        )
        .await;
    cache
}

#[tokio::test]
async fn test_insufficient_balance_issues_no_mutations() {
    let backend = RecordingBackend::default()
        .with_users(vec![sample_user("u1", 5.0)])
        .with_games(vec![sample_game("g1", 10.0)]);
    // The stale cached balance claims more than the backend will confirm
    let cache = cache_for("u1", 50.0).await;

    let outcome = purchase_tip(&backend, &cache, CHAT, "g1").await.unwrap();
    match outcome {
        PurchaseOutcome::InsufficientBalance { balance, price } => {
            assert_eq!(balance, 5.0);
            assert_eq!(price, 10.0);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    // Only reads happened; no buy, increment, balance or history call
    assert_eq!(backend.recorded_calls(), vec!["get_user", "list_games"]);
    // The refresh corrected the stale cache
    assert_eq!(cache.get(CHAT).await.unwrap().balance, 5.0);
}

#[tokio::test]
async fn test_sufficient_balance_issues_mutations_in_order() {
    let backend = RecordingBackend::default()
        .with_users(vec![sample_user("u1", 50.0)])
        .with_games(vec![sample_game("g1", 10.0)]);
    let cache = cache_for("u1", 50.0).await;

    let outcome = purchase_tip(&backend, &cache, CHAT, "g1").await.unwrap();
    match outcome {
        PurchaseOutcome::Completed { game, new_balance } => {
            assert_eq!(game.id, "g1");
            assert_eq!(new_balance, 40.0);
            assert_eq!(game.purchased_by, vec!["u1"]);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    assert_eq!(
        backend.recorded_calls(),
        vec![
            "get_user",
            "list_games",
            "buy_game",
            "increment_current_limit",
            "update_balance",
            "add_bet_history",
        ]
    );
    assert_eq!(cache.get(CHAT).await.unwrap().balance, 40.0);
}

#[tokio::test]
async fn test_unknown_tip_fails_without_mutations() {
    let backend =
        RecordingBackend::default().with_users(vec![sample_user("u1", 50.0)]);
    let cache = cache_for("u1", 50.0).await;

    assert!(purchase_tip(&backend, &cache, CHAT, "missing").await.is_err());
    assert_eq!(backend.recorded_calls(), vec!["get_user", "list_games"]);
}

#[tokio::test]
async fn test_no_cached_context_is_an_error() {
    let backend = RecordingBackend::default();
    let cache = ContextCache::new();

    assert!(purchase_tip(&backend, &cache, CHAT, "g1").await.is_err());
    assert!(backend.recorded_calls().is_empty());
}
