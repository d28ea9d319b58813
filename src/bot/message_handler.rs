//! Message Handler module for commands and wizard text input

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::InputFile;
use tracing::{debug, error, warn};

use crate::models::User;
use crate::session::UserContext;

use super::ui_builder;
use super::wizard_manager;
use super::AppDeps;

pub async fn message_handler(bot: Bot, msg: Message, deps: Arc<AppDeps>) -> Result<()> {
    let Some(text) = msg.text() else {
        // Photos, stickers and the rest have no meaning here
        return Ok(());
    };
    let chat_id = msg.chat.id;
    debug!(%chat_id, message_length = text.len(), "Received text message");

    match text {
        "/start" => return handle_start(&bot, &msg, &deps).await,
        "/admin" => return handle_admin(&bot, &msg, &deps).await,
        "/help" => {
            bot.send_message(
                chat_id,
                "🏆 Sports Tips Bot\n\n\
                 /start — open the main menu\n\
                 /admin — admin panel (restricted)\n\n\
                 Use the menu buttons to browse tips, deposit funds and view \
                 your purchases.",
            )
            .await?;
            return Ok(());
        }
        _ => {}
    }

    // Commands never feed a wizard
    if text.starts_with('/') {
        bot.send_message(chat_id, "❓ Unknown command. Try /start.")
            .await?;
        return Ok(());
    }

    if let Some(flow) = deps.sessions.get(chat_id).await {
        return wizard_manager::handle_wizard_text(&bot, chat_id, &deps, text, flow).await;
    }

    bot.send_message(chat_id, "ℹ️ Use /start to open the menu.")
        .await?;
    Ok(())
}

/// Find-or-create the backend user for this Telegram identity, cache the
/// context and show the main menu.
async fn handle_start(bot: &Bot, msg: &Message, deps: &Arc<AppDeps>) -> Result<()> {
    let chat_id = msg.chat.id;
    let Some(from) = msg.from.as_ref() else {
        return Ok(());
    };
    let user_name = if from.first_name.is_empty() {
        "User".to_string()
    } else {
        from.first_name.clone()
    };
    // Telegram accounts have no email; the backend requires one
    let email = format!(
        "{}@telegram.local",
        from.username.as_deref().unwrap_or("unknown")
    );
    let telegram_id = from.id.0 as i64;

    match deps
        .backend
        .telegram_signup(telegram_id, &user_name, &email)
        .await
    {
        Ok(user) => {
            deps.cache
                .insert(
                    chat_id,
                    UserContext {
                        user_id: user.id.clone(),
                        balance: user.available_balance,
                        telegram_id,
                    },
                )
                .await;
            debug!(%chat_id, user_id = %user.id, "Stored user context");
            send_main_menu(bot, chat_id, &user, &deps.config.menu_image_url).await?;
        }
        Err(e) => {
            error!(%chat_id, error = %e, "Failed to sync Telegram user");
            bot.send_message(chat_id, "❌ Failed to load menu.").await?;
        }
    }
    Ok(())
}

async fn handle_admin(bot: &Bot, msg: &Message, deps: &Arc<AppDeps>) -> Result<()> {
    let chat_id = msg.chat.id;
    let caller = msg.from.as_ref().map(|u| u.id.0).unwrap_or_default();
    if !deps.config.is_admin(caller) {
        bot.send_message(
            chat_id,
            "🚫 You are not authorized to access the admin panel.",
        )
        .await?;
        return Ok(());
    }

    // The panel still renders when the stats endpoint is down
    let stats = deps.backend.stats().await.unwrap_or_else(|e| {
        warn!(error = %e, "Failed to fetch admin stats");
        Default::default()
    });
    bot.send_message(chat_id, ui_builder::admin_panel_text(&stats))
        .reply_markup(ui_builder::admin_panel_keyboard())
        .await?;
    Ok(())
}

/// Photo-with-caption main menu; falls back to plain text when the menu
/// image URL is unusable.
pub async fn send_main_menu(
    bot: &Bot,
    chat_id: ChatId,
    user: &User,
    menu_image_url: &str,
) -> Result<()> {
    let caption = ui_builder::main_menu_caption(user);
    let keyboard = ui_builder::main_menu_keyboard(user);
    match reqwest::Url::parse(menu_image_url) {
        Ok(url) => {
            bot.send_photo(chat_id, InputFile::url(url))
                .caption(caption)
                .reply_markup(keyboard)
                .await?;
        }
        Err(e) => {
            warn!(error = %e, "Menu image URL invalid, sending text menu");
            bot.send_message(chat_id, caption)
                .reply_markup(keyboard)
                .await?;
        }
    }
    Ok(())
}
