//! Callback Handler module for processing inline keyboard callback queries.
//!
//! The raw `callback_data` string is decoded into an [`Action`] at the
//! boundary, authorized against the admin set, then dispatched. Whatever
//! happens inside a handler, the callback query is answered exactly once at
//! the end so the client's button spinner always stops.

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::InputFile;
use tracing::{debug, error, warn};

use crate::action::Action;
use crate::wizard::{AddTipStep, Flow};

use super::message_handler::send_main_menu;
use super::purchase::{purchase_tip, PurchaseOutcome};
use super::ui_builder;
use super::wizard_manager;
use super::AppDeps;

pub async fn callback_handler(bot: Bot, q: CallbackQuery, deps: Arc<AppDeps>) -> Result<()> {
    debug!(user_id = %q.from.id, data = ?q.data, "Received callback query");

    let Some(action) = q.data.as_deref().and_then(Action::parse) else {
        warn!(user_id = %q.from.id, data = ?q.data, "Unrecognized callback data");
        bot.answer_callback_query(q.id).await?;
        return Ok(());
    };

    // Admin gating happens before any side effect
    if !action.is_authorized(&deps.config.admin_ids, q.from.id.0) {
        warn!(user_id = %q.from.id, action = ?action, "Unauthorized admin action");
        bot.answer_callback_query(q.id).text("Unauthorized").await?;
        return Ok(());
    }

    let Some(chat_id) = q.message.as_ref().map(|m| m.chat().id) else {
        bot.answer_callback_query(q.id).await?;
        return Ok(());
    };

    if let Err(e) = dispatch(&bot, chat_id, action, &deps).await {
        error!(user_id = %q.from.id, %chat_id, error = %e, "Callback handler failed");
        let _ = bot
            .send_message(chat_id, "❌ Something went wrong. Please try again.")
            .await;
    }

    // Always stop the client spinner, also after a handler error
    if let Err(e) = bot.answer_callback_query(q.id).await {
        warn!(error = %e, "Failed to answer callback query");
    }
    Ok(())
}

async fn dispatch(bot: &Bot, chat_id: ChatId, action: Action, deps: &Arc<AppDeps>) -> Result<()> {
    match action {
        Action::MainMenu => {
            let Some(context) = deps.cache.get(chat_id).await else {
                bot.send_message(chat_id, "ℹ️ Use /start to open the menu.")
                    .await?;
                return Ok(());
            };
            let user = deps.backend.get_user(&context.user_id).await?;
            send_main_menu(bot, chat_id, &user, &deps.config.menu_image_url).await
        }
        Action::Back { user_id } => {
            let user = deps.backend.get_user(&user_id).await?;
            send_main_menu(bot, chat_id, &user, &deps.config.menu_image_url).await
        }
        Action::Balance { user_id } => {
            let user = deps.backend.get_user(&user_id).await?;
            bot.send_message(chat_id, ui_builder::balance_text(&user))
                .reply_markup(ui_builder::balance_keyboard(&user.id))
                .await?;
            Ok(())
        }
        Action::Tips => {
            let games: Vec<_> = deps
                .backend
                .list_games()
                .await?
                .into_iter()
                .filter(|g| g.active)
                .collect();
            if games.is_empty() {
                bot.send_message(
                    chat_id,
                    "⚠ No active tips available at the moment.\n⌛ Wait for new tips from our experts.",
                )
                .await?;
                return Ok(());
            }
            bot.send_message(chat_id, ui_builder::tips_list_text(&games))
                .reply_markup(ui_builder::tips_list_keyboard(&games))
                .await?;
            Ok(())
        }
        Action::Buy { game_id } => {
            match purchase_tip(deps.backend.as_ref(), &deps.cache, chat_id, &game_id).await? {
                PurchaseOutcome::InsufficientBalance { balance, price } => {
                    bot.send_message(
                        chat_id,
                        ui_builder::insufficient_balance_text(balance, price),
                    )
                    .reply_markup(ui_builder::deposit_prompt_keyboard())
                    .await?;
                }
                PurchaseOutcome::Completed { game, new_balance } => {
                    bot.send_message(
                        chat_id,
                        ui_builder::purchase_success_text(&game, new_balance),
                    )
                    .await?;
                }
            }
            Ok(())
        }
        Action::Deposit => {
            deps.sessions
                .start(chat_id, Flow::Deposit { amount: None })
                .await;
            bot.send_message(chat_id, "💳 Enter the amount to deposit (USD):")
                .await?;
            Ok(())
        }
        Action::ConfirmDeposit => wizard_manager::confirm_deposit(bot, chat_id, deps).await,
        Action::CancelDeposit => {
            deps.sessions.clear(chat_id).await;
            bot.send_message(chat_id, "❌ Deposit cancelled.").await?;
            Ok(())
        }
        Action::Purchases => {
            let Some(context) = deps.cache.get(chat_id).await else {
                bot.send_message(chat_id, "ℹ️ Use /start to open the menu.")
                    .await?;
                return Ok(());
            };
            let user = deps.backend.get_user(&context.user_id).await?;
            bot.send_message(chat_id, ui_builder::purchases_text(&user))
                .await?;
            Ok(())
        }
        Action::History => {
            let games = deps.backend.list_games().await?;
            bot.send_message(chat_id, ui_builder::history_text(&games))
                .await?;
            Ok(())
        }
        Action::Support => {
            bot.send_message(
                chat_id,
                "🆘 Support: message @SportsTipsSupport and we'll get back to you.",
            )
            .await?;
            Ok(())
        }
        Action::UpdateChannel => {
            bot.send_message(
                chat_id,
                "📣 Follow our update channel: https://t.me/SportsTipsUpdates",
            )
            .await?;
            Ok(())
        }

        Action::AdminPanel => {
            let stats = deps.backend.stats().await.unwrap_or_else(|e| {
                warn!(error = %e, "Failed to fetch admin stats");
                Default::default()
            });
            bot.send_message(chat_id, ui_builder::admin_panel_text(&stats))
                .reply_markup(ui_builder::admin_panel_keyboard())
                .await?;
            Ok(())
        }
        Action::AddTip => {
            deps.sessions.start(chat_id, Flow::add_tip()).await;
            bot.send_message(chat_id, "🎮 Let's add a new tip!").await?;
            bot.send_message(chat_id, AddTipStep::FIRST.prompt()).await?;
            Ok(())
        }
        Action::Confidence { level } => {
            wizard_manager::apply_confidence(bot, chat_id, deps, level).await
        }
        Action::SkipImage => wizard_manager::apply_skip_image(bot, chat_id, deps).await,
        Action::ViewStats => {
            let stats = deps.backend.stats().await?;
            let users = deps.backend.list_users().await?;
            bot.send_message(chat_id, ui_builder::detailed_stats_text(&stats, &users))
                .await?;
            Ok(())
        }
        Action::ManageTips => {
            let games = deps.backend.list_games().await?;
            if games.is_empty() {
                bot.send_message(chat_id, "⚠️ No tips available.").await?;
                return Ok(());
            }
            bot.send_message(chat_id, ui_builder::manage_tips_text(&games))
                .reply_markup(ui_builder::manage_tips_keyboard(&games))
                .await?;
            Ok(())
        }
        Action::ManageTip { game_id } => {
            let games = deps.backend.list_games().await?;
            let Some(game) = games.into_iter().find(|g| g.id == game_id) else {
                bot.send_message(chat_id, "⚠️ Tip not found.").await?;
                return Ok(());
            };
            let text = ui_builder::tip_detail_text(&game);
            let keyboard = ui_builder::tip_detail_keyboard(&game);
            let image_url = game
                .image
                .as_deref()
                .and_then(|raw| reqwest::Url::parse(raw).ok());
            match image_url {
                Some(url) => {
                    bot.send_photo(chat_id, InputFile::url(url))
                        .caption(text)
                        .reply_markup(keyboard)
                        .await?;
                }
                None => {
                    bot.send_message(chat_id, text)
                        .reply_markup(keyboard)
                        .await?;
                }
            }
            Ok(())
        }
        Action::ToggleTip { game_id } => {
            let game = deps.backend.toggle_game(&game_id).await?;
            if !game.active {
                // Manual deactivation also retires the live countdown
                deps.countdowns.cancel(&game.id).await;
            }
            bot.send_message(
                chat_id,
                format!(
                    "✅ Tip \"{}\" is now {}",
                    game.tip_title,
                    if game.active {
                        "🟢 Active"
                    } else {
                        "🔴 Inactive"
                    }
                ),
            )
            .await?;
            Ok(())
        }
        Action::ExtendTip { game_id } => {
            deps.backend.increment_current_limit(&game_id).await?;
            bot.send_message(chat_id, "⏰ Tip purchase limit extended.")
                .await?;
            Ok(())
        }
        Action::NotifyBuyers { game_id } => {
            let games = deps.backend.list_games().await?;
            let Some(game) = games.into_iter().find(|g| g.id == game_id) else {
                bot.send_message(chat_id, "⚠️ Tip not found.").await?;
                return Ok(());
            };
            if game.purchased_by.is_empty() {
                bot.send_message(chat_id, "⚠️ No buyers yet.").await?;
                return Ok(());
            }
            let users = deps.backend.list_users().await?;
            let mut notified = 0usize;
            for buyer_id in &game.purchased_by {
                let telegram_id = users
                    .iter()
                    .find(|u| &u.id == buyer_id)
                    .and_then(|u| u.telegram_id);
                let Some(telegram_id) = telegram_id else {
                    continue;
                };
                let text = format!(
                    "📢 Update on your purchased tip:\n\n🏆 {}\n\nStay tuned for more updates!",
                    game.tip_title
                );
                match bot.send_message(ChatId(telegram_id), text).await {
                    Ok(_) => notified += 1,
                    Err(e) => debug!(telegram_id, error = %e, "Buyer notification failed"),
                }
            }
            bot.send_message(
                chat_id,
                format!("✅ Notification sent to {notified} buyers."),
            )
            .await?;
            Ok(())
        }
        Action::ManageUsers => {
            let users = deps.backend.list_users().await?;
            if users.is_empty() {
                bot.send_message(chat_id, "No users found yet.").await?;
                return Ok(());
            }
            bot.send_message(chat_id, ui_builder::users_summary_text(&users))
                .await?;
            bot.send_message(chat_id, "👥 Select a user to manage:")
                .reply_markup(ui_builder::user_list_keyboard(&users, |u| {
                    Action::ManageUser {
                        user_id: u.id.clone(),
                    }
                }))
                .await?;
            Ok(())
        }
        Action::ManageUser { user_id } => {
            let user = deps.backend.get_user(&user_id).await?;
            bot.send_message(chat_id, ui_builder::user_detail_text(&user))
                .reply_markup(ui_builder::user_detail_keyboard(&user))
                .await?;
            Ok(())
        }
        Action::ToggleUser { user_id } => {
            let user = deps.backend.get_user(&user_id).await?;
            if user.active {
                deps.backend.deactivate_user(&user_id).await?;
                bot.send_message(chat_id, format!("🚫 {} has been blocked.", user.user_name))
                    .await?;
            } else {
                deps.backend.reactivate_user(&user_id).await?;
                bot.send_message(
                    chat_id,
                    format!("✅ {} has been unblocked.", user.user_name),
                )
                .await?;
            }
            Ok(())
        }
        Action::DeleteUser { user_id } => {
            deps.backend.delete_user(&user_id).await?;
            bot.send_message(chat_id, "🗑 User deleted successfully.")
                .await?;
            Ok(())
        }
        Action::AddBalance => {
            let users = deps.backend.list_users().await?;
            if users.is_empty() {
                bot.send_message(chat_id, "No users found.").await?;
                return Ok(());
            }
            bot.send_message(chat_id, "Select a user to add balance:")
                .reply_markup(ui_builder::user_list_keyboard(&users, |u| {
                    Action::SelectUser {
                        user_id: u.id.clone(),
                    }
                }))
                .await?;
            Ok(())
        }
        Action::SelectUser { user_id } => {
            deps.sessions
                .start(chat_id, Flow::AddBalance { user_id })
                .await;
            bot.send_message(chat_id, "💰 Enter amount to add to this user:")
                .await?;
            Ok(())
        }
        Action::Broadcast => {
            deps.sessions.start(chat_id, Flow::Broadcast).await;
            bot.send_message(chat_id, "📢 Enter the message to broadcast:")
                .await?;
            Ok(())
        }
    }
}
