//! The balance-gated purchase sequence.
//!
//! The backend offers no transaction covering a purchase; the bot issues
//! the mutations as four sequential calls (buy, increment counter, deduct
//! balance, append history) and stops at the first failure. The cached
//! balance is never trusted for the gate: it is re-fetched from the backend
//! right before the price check.

use anyhow::{Context, Result};
use teloxide::types::ChatId;
use tracing::{info, warn};

use crate::backend::BackendApi;
use crate::models::{BetRecord, BetStatus, Game};
use crate::session::ContextCache;

/// Result of a purchase attempt that reached the backend
#[derive(Debug)]
pub enum PurchaseOutcome {
    /// Balance below price; no mutation was issued
    InsufficientBalance { balance: f64, price: f64 },
    /// All four mutations succeeded
    Completed { game: Game, new_balance: f64 },
}

/// Attempt to purchase a tip for the user behind `chat_id`.
///
/// Returns an error if the chat has no cached context (the user never sent
/// `/start`), the tip is unknown, or any backend call fails mid-sequence.
pub async fn purchase_tip(
    backend: &dyn BackendApi,
    cache: &ContextCache,
    chat_id: ChatId,
    game_id: &str,
) -> Result<PurchaseOutcome> {
    let context = cache
        .get(chat_id)
        .await
        .context("no cached user context; /start required")?;

    // Refresh the balance before the gate; the cache may be stale
    let user = backend.get_user(&context.user_id).await?;
    cache.set_balance(chat_id, user.available_balance).await;

    let games = backend.list_games().await?;
    let game = games
        .into_iter()
        .find(|g| g.id == game_id)
        .context("tip not found")?;

    if user.available_balance < game.tip_price {
        warn!(
            %chat_id,
            balance = user.available_balance,
            price = game.tip_price,
            "Purchase rejected: insufficient balance"
        );
        return Ok(PurchaseOutcome::InsufficientBalance {
            balance: user.available_balance,
            price: game.tip_price,
        });
    }

    // Four non-atomic mutations, in this order. A failure mid-sequence
    // leaves the backend partially updated; we stop and surface the error.
    let bought = backend.buy_game(game_id, &context.user_id).await?;
    backend.increment_current_limit(game_id).await?;
    backend
        .update_balance(&context.user_id, bought.tip_price)
        .await?;
    let record = BetRecord {
        game_id: bought.id.clone(),
        game_name: bought.tip_title.clone(),
        tip_name: bought.tip_title.clone(),
        tip_price: bought.tip_price,
        tip_odd: Some(bought.odd_ratio.to_string()),
        image: bought.image.clone(),
        game_date: bought.created_at,
        status: BetStatus::Pending,
    };
    backend.add_bet_history(&context.user_id, &record).await?;

    let new_balance = user.available_balance - bought.tip_price;
    cache.set_balance(chat_id, new_balance).await;
    info!(%chat_id, game_id, new_balance, "Purchase completed");

    Ok(PurchaseOutcome::Completed {
        game: bought,
        new_balance,
    })
}
