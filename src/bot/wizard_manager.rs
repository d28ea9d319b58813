//! Wizard manager: advances the active flow one input at a time.
//!
//! Text input arrives through the message handler, button input (star
//! rating, skip, deposit confirmation) through the callback handler; both
//! feed the same transition functions in [`crate::wizard`].

use anyhow::{Context, Result};
use chrono::Utc;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::{debug, error, info};

use crate::backend::{deposit_order_id, BackendApi};
use crate::countdown::render_countdown;
use crate::models::Game;
use crate::wizard::{parse_amount, AddTipStep, Flow, TipDraft};

use super::ui_builder;
use super::AppDeps;

/// Feed one text message into the chat's active wizard
pub async fn handle_wizard_text(
    bot: &Bot,
    chat_id: ChatId,
    deps: &Arc<AppDeps>,
    text: &str,
    flow: Flow,
) -> Result<()> {
    match flow {
        Flow::AddTip { step, mut draft } => match step.apply(text, &mut draft) {
            Ok(()) => advance_add_tip(bot, chat_id, deps, step, draft).await,
            Err(e) => {
                debug!(%chat_id, step = ?step, error = %e, "Wizard input rejected");
                bot.send_message(chat_id, e.user_message()).await?;
                Ok(())
            }
        },
        Flow::AddBalance { user_id } => {
            let amount = match parse_amount(text) {
                Ok(amount) => amount,
                Err(e) => {
                    bot.send_message(chat_id, e.user_message()).await?;
                    return Ok(());
                }
            };
            // Session ends here whether or not the deposit sticks
            deps.sessions.clear(chat_id).await;
            match deps.backend.deposit(&user_id, amount).await {
                Ok(()) => {
                    info!(%chat_id, user_id, amount, "Balance added");
                    bot.send_message(chat_id, format!("✅ Added ${amount:.2} successfully!"))
                        .await?;
                }
                Err(e) => {
                    error!(%chat_id, user_id, error = %e, "Failed to add balance");
                    bot.send_message(chat_id, "⚠️ Failed to add balance.").await?;
                }
            }
            Ok(())
        }
        Flow::Broadcast => {
            deps.sessions.clear(chat_id).await;
            bot.send_message(chat_id, "📤 Broadcasting message...").await?;
            match deps.backend.list_users().await {
                Ok(users) => {
                    let mut delivered = 0usize;
                    for user in users {
                        let Some(telegram_id) = user.telegram_id else {
                            continue;
                        };
                        // Blocked bots and deleted chats are expected
                        match bot.send_message(ChatId(telegram_id), text).await {
                            Ok(_) => delivered += 1,
                            Err(e) => debug!(telegram_id, error = %e, "Broadcast send failed"),
                        }
                    }
                    info!(%chat_id, delivered, "Broadcast complete");
                    bot.send_message(
                        chat_id,
                        format!("✅ Broadcast delivered to {delivered} users."),
                    )
                    .await?;
                }
                Err(e) => {
                    error!(%chat_id, error = %e, "Broadcast failed to fetch users");
                    bot.send_message(chat_id, "⚠️ Failed to broadcast.").await?;
                }
            }
            Ok(())
        }
        Flow::Deposit { .. } => {
            let amount = match parse_amount(text) {
                Ok(amount) => amount,
                Err(e) => {
                    bot.send_message(chat_id, e.user_message()).await?;
                    return Ok(());
                }
            };
            deps.sessions
                .update(chat_id, Flow::Deposit { amount: Some(amount) })
                .await;
            bot.send_message(
                chat_id,
                format!("💳 Deposit ${amount:.2} via crypto?"),
            )
            .reply_markup(ui_builder::deposit_confirm_keyboard())
            .await?;
            Ok(())
        }
    }
}

/// Button entry point: star rating pressed during the add-tip wizard.
///
/// Ignored when the chat is not at the confidence step (stale button).
pub async fn apply_confidence(
    bot: &Bot,
    chat_id: ChatId,
    deps: &Arc<AppDeps>,
    level: u8,
) -> Result<()> {
    let Some(Flow::AddTip {
        step: AddTipStep::Confidence,
        mut draft,
    }) = deps.sessions.get(chat_id).await
    else {
        debug!(%chat_id, "Confidence button outside add-tip wizard, ignoring");
        return Ok(());
    };
    if let Err(e) = AddTipStep::Confidence.apply(&level.to_string(), &mut draft) {
        bot.send_message(chat_id, e.user_message()).await?;
        return Ok(());
    }
    advance_add_tip(bot, chat_id, deps, AddTipStep::Confidence, draft).await
}

/// Button entry point: the optional image step skipped
pub async fn apply_skip_image(bot: &Bot, chat_id: ChatId, deps: &Arc<AppDeps>) -> Result<()> {
    let Some(Flow::AddTip {
        step: AddTipStep::ImageUrl,
        draft,
    }) = deps.sessions.get(chat_id).await
    else {
        debug!(%chat_id, "Skip button outside add-tip wizard, ignoring");
        return Ok(());
    };
    // Image stays unset; move on as if the step had been answered
    advance_add_tip(bot, chat_id, deps, AddTipStep::ImageUrl, draft).await
}

/// Button entry point: pending deposit confirmed
pub async fn confirm_deposit(bot: &Bot, chat_id: ChatId, deps: &Arc<AppDeps>) -> Result<()> {
    let Some(Flow::Deposit {
        amount: Some(amount),
    }) = deps.sessions.get(chat_id).await
    else {
        bot.send_message(chat_id, "❌ No pending deposit. Press Deposit Funds to start.")
            .await?;
        return Ok(());
    };
    deps.sessions.clear(chat_id).await;

    let context = deps
        .cache
        .get(chat_id)
        .await
        .context("no cached user context; /start required")?;
    let order_id = deposit_order_id(&context.user_id, Utc::now().timestamp());
    match deps.backend.create_payment(amount, &order_id).await {
        Ok(link) => {
            info!(%chat_id, order_id, amount, "Payment created");
            let text = match link.pay_link {
                Some(url) => format!("💳 Complete your ${amount:.2} deposit here:\n{url}"),
                None => "💳 Payment created. Follow the gateway instructions to finish."
                    .to_string(),
            };
            bot.send_message(chat_id, text).await?;
        }
        Err(e) => {
            error!(%chat_id, order_id, error = %e, "Payment creation failed");
            bot.send_message(chat_id, "⚠️ Failed to create payment. Please try again.")
                .await?;
        }
    }
    Ok(())
}

/// Move the add-tip wizard past a completed step: either prompt the next
/// step or, after the last one, submit the draft and clear the session.
async fn advance_add_tip(
    bot: &Bot,
    chat_id: ChatId,
    deps: &Arc<AppDeps>,
    step: AddTipStep,
    draft: TipDraft,
) -> Result<()> {
    if let Some(next) = step.next() {
        deps.sessions
            .update(chat_id, Flow::AddTip { step: next, draft })
            .await;
        let prompt = bot.send_message(chat_id, next.prompt());
        match next {
            AddTipStep::ImageUrl => {
                prompt.reply_markup(ui_builder::skip_image_keyboard()).await?;
            }
            AddTipStep::Confidence => {
                prompt.reply_markup(ui_builder::confidence_keyboard()).await?;
            }
            _ => {
                prompt.await?;
            }
        }
        return Ok(());
    }

    // Terminal step: one submission, session gone regardless of outcome
    deps.sessions.clear(chat_id).await;
    match submit_tip(deps.backend.as_ref(), draft).await {
        Ok(game) => {
            info!(%chat_id, game_id = %game.id, "Tip created");
            bot.send_message(
                chat_id,
                format!(
                    "✅ Tip added successfully!\n\n\
                     Title: {}\nPrice: ${:.2}\nOdd: {}",
                    game.tip_title, game.tip_price, game.odd_ratio
                ),
            )
            .await?;
            start_listing_countdown(bot, chat_id, deps, &game).await?;
        }
        Err(e) => {
            error!(%chat_id, error = %e, "Failed to add tip");
            bot.send_message(chat_id, "⚠️ Error adding tip. Please try again.")
                .await?;
        }
    }
    Ok(())
}

/// Submit a completed draft to the backend exactly once
pub async fn submit_tip(backend: &dyn BackendApi, draft: TipDraft) -> Result<Game> {
    let new_game = draft.into_new_game().context("incomplete tip draft")?;
    Ok(backend.add_game(&new_game).await?)
}

/// Post the live countdown message for a freshly created listing and hand
/// it to the scheduler.
async fn start_listing_countdown(
    bot: &Bot,
    chat_id: ChatId,
    deps: &Arc<AppDeps>,
    game: &Game,
) -> Result<()> {
    if game.duration == 0 {
        return Ok(());
    }
    let total_secs = (game.duration * 60) as i64;
    let end_time = Utc::now() + chrono::Duration::seconds(total_secs);
    let frame = render_countdown(&game.tip_title, total_secs, total_secs);
    let sent = bot.send_message(chat_id, frame).await?;
    deps.countdowns
        .track(&game.id, &game.tip_title, chat_id, sent.id, end_time, total_secs)
        .await;
    Ok(())
}
