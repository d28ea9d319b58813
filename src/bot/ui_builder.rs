//! UI Builder module for creating keyboards and formatting messages

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::action::Action;
use crate::models::{BetStatus, Game, Stats, User};

/// Most user buttons shown per list to stay inside Telegram's limits
pub const MAX_USER_BUTTONS: usize = 30;

/// Render a 1-5 confidence level as filled stars
pub fn render_stars(level: u8) -> String {
    "⭐".repeat(level.min(5) as usize)
}

/// Caption above the main menu photo
pub fn main_menu_caption(user: &User) -> String {
    format!(
        "🏆 Welcome to the Sports Tips System\n\n\
         👋 Welcome {}!\n\n\
         🎯 Professional sports tips from the best experts\n\n\
         💰 Your balance: ${:.2}\n\n\
         ⚠ Important: Betting is done on betting sites\n\n\
         🎲 We only provide professional recommendations",
        user.user_name, user.available_balance
    )
}

/// Main menu buttons; the admin panel row is appended for backend admins
pub fn main_menu_keyboard(user: &User) -> InlineKeyboardMarkup {
    let mut buttons = vec![
        vec![
            InlineKeyboardButton::callback(
                "💰 My Balance",
                Action::Balance {
                    user_id: user.id.clone(),
                }
                .encode(),
            ),
            InlineKeyboardButton::callback("🏆 Available Tips", Action::Tips.encode()),
        ],
        vec![InlineKeyboardButton::callback(
            "💳 Deposit Funds",
            Action::Deposit.encode(),
        )],
        vec![
            InlineKeyboardButton::callback("🧾 My Purchases", Action::Purchases.encode()),
            InlineKeyboardButton::callback("📈 All Tips History", Action::History.encode()),
        ],
        vec![
            InlineKeyboardButton::callback("🆘 Support", Action::Support.encode()),
            InlineKeyboardButton::callback("📣 Update Channel", Action::UpdateChannel.encode()),
        ],
    ];
    if user.is_backend_admin() {
        buttons.push(vec![InlineKeyboardButton::callback(
            "👤 Admin Panel",
            Action::AdminPanel.encode(),
        )]);
    }
    InlineKeyboardMarkup::new(buttons)
}

pub fn admin_panel_text(stats: &Stats) -> String {
    format!(
        "👨‍💼 Admin Panel\n\n\
         📊 Quick Statistics:\n\
         👥 Users: {}\n\
         🏆 Tips: {} (Active: {})\n\
         💵 Revenue: ${:.2}\n\n\
         🔥 Active tips right now: {}\n\n\
         Choose an action below:",
        stats.users, stats.tips, stats.active_tips, stats.revenue, stats.active_tips
    )
}

pub fn admin_panel_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            InlineKeyboardButton::callback("➕ Add Tip", Action::AddTip.encode()),
            InlineKeyboardButton::callback("📈 Statistics", Action::ViewStats.encode()),
        ],
        vec![
            InlineKeyboardButton::callback("🧾 Manage Tips", Action::ManageTips.encode()),
            InlineKeyboardButton::callback("👥 Manage Users", Action::ManageUsers.encode()),
        ],
        vec![
            InlineKeyboardButton::callback("💰 Add Balance", Action::AddBalance.encode()),
            InlineKeyboardButton::callback("📢 Broadcast Message", Action::Broadcast.encode()),
        ],
        vec![InlineKeyboardButton::callback(
            "⬅️ Back to Main Menu",
            Action::MainMenu.encode(),
        )],
    ])
}

pub fn detailed_stats_text(stats: &Stats, users: &[User]) -> String {
    let total_users = users.len();
    let active_users = users.iter().filter(|u| u.active).count();
    let blocked_users = total_users - active_users;
    let total_purchases: usize = users.iter().map(|u| u.bet_history.len()).sum();
    let total_balance: f64 = users.iter().map(|u| u.available_balance).sum();

    format!(
        "📊 Detailed Statistics\n\n\
         👥 Users:\n\
         - Total users: {total_users}\n\
         - Blocked users: {blocked_users}\n\
         - Active users: {active_users}\n\n\
         🏆 Tips:\n\
         - Total tips: {}\n\
         - Active tips: {}\n\n\
         💰 Revenue:\n\
         - Total purchases: {total_purchases}\n\
         - Total revenue: ${:.2}\n\n\
         💳 Balances:\n\
         - Total system balance: ${total_balance:.2}",
        stats.tips, stats.active_tips, stats.revenue
    )
}

/// List of purchasable tips shown to customers
pub fn tips_list_text(games: &[Game]) -> String {
    let mut text = String::new();
    for game in games {
        text.push_str(&format!(
            "🏆 Title: {}\n\
             💰 Price: ${:.2}\n\
             📊 Odds ratio: {}\n\
             🎯 Confidence level: {}\n\
             ⏰ Availability: {} minutes\n\
             📦 Purchase limit: {}\n\
             ------------------------\n",
            game.tip_title,
            game.tip_price,
            game.odd_ratio,
            render_stars(game.confidence_level),
            game.duration,
            game.purchase_limit,
        ));
    }
    text
}

pub fn tips_list_keyboard(games: &[Game]) -> InlineKeyboardMarkup {
    let buttons: Vec<Vec<InlineKeyboardButton>> = games
        .iter()
        .map(|game| {
            vec![InlineKeyboardButton::callback(
                format!("Buy {} - ${:.2}", game.tip_title, game.tip_price),
                Action::Buy {
                    game_id: game.id.clone(),
                }
                .encode(),
            )]
        })
        .collect();
    InlineKeyboardMarkup::new(buttons)
}

/// Admin view of all tips with per-tip manage buttons
pub fn manage_tips_text(games: &[Game]) -> String {
    let mut text = String::from("🧾 Tips:\n\n");
    for (i, game) in games.iter().enumerate() {
        text.push_str(&format!(
            "{}. {}\n💵 ${:.2}\n🎯 {} | {}\n📈 Odds: {}\nStatus: {}\n\n\
             ⚽️━━━━━━━━━━━━━━━⚽️\n\n",
            i + 1,
            game.tip_title,
            game.tip_price,
            render_stars(game.confidence_level),
            game.betting_sites.join(", "),
            game.odd_ratio,
            active_label(game.active),
        ));
    }
    text
}

pub fn manage_tips_keyboard(games: &[Game]) -> InlineKeyboardMarkup {
    let mut buttons: Vec<Vec<InlineKeyboardButton>> = games
        .iter()
        .map(|game| {
            vec![InlineKeyboardButton::callback(
                format!("📊 Manage {}", game.tip_title),
                Action::ManageTip {
                    game_id: game.id.clone(),
                }
                .encode(),
            )]
        })
        .collect();
    buttons.push(vec![InlineKeyboardButton::callback(
        "⬅️ Back to Admin",
        Action::AdminPanel.encode(),
    )]);
    InlineKeyboardMarkup::new(buttons)
}

pub fn tip_detail_text(game: &Game) -> String {
    format!(
        "🏆 {}\n\n\
         💵 Price: ${:.2}\n\
         📈 Odds: {}\n\
         🎯 Confidence: {}\n\
         🏦 Betting Site: {}\n\
         📅 Duration: {} Minutes\n\
         🛒 Purchases: {}\n\
         ⚙️ Status: {}\n\n\
         📝 Full Content:\n{}",
        game.tip_title,
        game.tip_price,
        game.odd_ratio,
        render_stars(game.confidence_level),
        game.betting_sites.join(", "),
        game.duration,
        game.purchased_by.len(),
        active_label(game.active),
        game.content_after_purchase
            .as_deref()
            .unwrap_or("No description provided."),
    )
}

pub fn tip_detail_keyboard(game: &Game) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            InlineKeyboardButton::callback(
                if game.active {
                    "🔴 Deactivate"
                } else {
                    "🟢 Activate"
                },
                Action::ToggleTip {
                    game_id: game.id.clone(),
                }
                .encode(),
            ),
            InlineKeyboardButton::callback(
                "📢 Notify Buyers",
                Action::NotifyBuyers {
                    game_id: game.id.clone(),
                }
                .encode(),
            ),
        ],
        vec![
            InlineKeyboardButton::callback(
                "⏰ Extend Limit",
                Action::ExtendTip {
                    game_id: game.id.clone(),
                }
                .encode(),
            ),
            InlineKeyboardButton::callback("⬅️ Back to Tips", Action::ManageTips.encode()),
        ],
    ])
}

pub fn users_summary_text(users: &[User]) -> String {
    let total_users = users.len();
    let active_users = users.iter().filter(|u| u.active).count();
    let blocked_users = total_users - active_users;
    let total_balance: f64 = users.iter().map(|u| u.available_balance).sum();
    let avg_balance = if total_users > 0 {
        total_balance / total_users as f64
    } else {
        0.0
    };
    format!(
        "📊 User Summary Overview\n\n\
         👥 Total Users: {total_users}\n\
         🟢 Active Users: {active_users}\n\
         🔴 Blocked Users: {blocked_users}\n\n\
         💰 Total System Balance: ${total_balance:.2}\n\
         📈 Average Balance/User: ${avg_balance:.2}"
    )
}

/// Keyboard of per-user buttons; `select` builds the action for each user
pub fn user_list_keyboard<F>(users: &[User], select: F) -> InlineKeyboardMarkup
where
    F: Fn(&User) -> Action,
{
    let mut buttons: Vec<Vec<InlineKeyboardButton>> = users
        .iter()
        .take(MAX_USER_BUTTONS)
        .map(|user| {
            vec![InlineKeyboardButton::callback(
                format!("{} ({})", user.user_name, user.email),
                select(user).encode(),
            )]
        })
        .collect();
    buttons.push(vec![InlineKeyboardButton::callback(
        "⬅️ Back to Admin",
        Action::AdminPanel.encode(),
    )]);
    InlineKeyboardMarkup::new(buttons)
}

pub fn user_detail_text(user: &User) -> String {
    format!(
        "👤 {}\n📧 {}\n💰 Balance: ${:.2}\nStatus: {}",
        user.user_name,
        user.email,
        user.available_balance,
        if user.active {
            "🟢 Active"
        } else {
            "🔴 Blocked"
        }
    )
}

pub fn user_detail_keyboard(user: &User) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            if user.active {
                "🚫 Block User"
            } else {
                "✅ Unblock User"
            },
            Action::ToggleUser {
                user_id: user.id.clone(),
            }
            .encode(),
        )],
        vec![InlineKeyboardButton::callback(
            "🗑 Delete User",
            Action::DeleteUser {
                user_id: user.id.clone(),
            }
            .encode(),
        )],
        vec![InlineKeyboardButton::callback(
            "⬅️ Back to Admin",
            Action::AdminPanel.encode(),
        )],
    ])
}

pub fn balance_text(user: &User) -> String {
    format!("💰 Your Balance: ${:.2}", user.available_balance)
}

pub fn balance_keyboard(user_id: &str) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            "💳 Add Funds",
            Action::Deposit.encode(),
        )],
        vec![InlineKeyboardButton::callback(
            "⬅ Back",
            Action::Back {
                user_id: user_id.to_string(),
            }
            .encode(),
        )],
    ])
}

/// The user's purchase history
pub fn purchases_text(user: &User) -> String {
    if user.bet_history.is_empty() {
        return "🧾 You haven't purchased any tips yet.".to_string();
    }
    let mut text = String::from("🧾 Your Purchases:\n\n");
    for record in &user.bet_history {
        text.push_str(&format!(
            "🎯 {}\n💵 ${:.2} | 📈 {}\nStatus: {}\n\n",
            record.tip_name,
            record.tip_price,
            record.tip_odd.as_deref().unwrap_or("N/A"),
            record.status.label(),
        ));
    }
    text
}

/// Past tips with their published results
pub fn history_text(games: &[Game]) -> String {
    if games.is_empty() {
        return "📈 No tips history yet.".to_string();
    }
    let mut text = String::from("📈 All Tips History:\n\n");
    for game in games {
        let result = game
            .result
            .map(|status| status.label())
            .unwrap_or(BetStatus::Pending.label());
        text.push_str(&format!(
            "🏆 {} | 📊 {} | {}\n",
            game.tip_title, game.odd_ratio, result
        ));
    }
    text
}

/// Star-rating buttons for the add-tip confidence step
pub fn confidence_keyboard() -> InlineKeyboardMarkup {
    let row: Vec<InlineKeyboardButton> = (1..=5)
        .map(|level| {
            InlineKeyboardButton::callback(
                render_stars(level),
                Action::Confidence { level }.encode(),
            )
        })
        .collect();
    InlineKeyboardMarkup::new(vec![row])
}

pub fn skip_image_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "⏭ Skip",
        Action::SkipImage.encode(),
    )]])
}

/// Shown after a rejected purchase: top up or go back to the tips list
pub fn deposit_prompt_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            "💳 Deposit Funds",
            Action::Deposit.encode(),
        )],
        vec![InlineKeyboardButton::callback(
            "🔙 Back to Tips",
            Action::Tips.encode(),
        )],
    ])
}

pub fn deposit_confirm_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback("✅ Confirm", Action::ConfirmDeposit.encode()),
        InlineKeyboardButton::callback("❌ Cancel", Action::CancelDeposit.encode()),
    ]])
}

pub fn purchase_success_text(game: &Game, new_balance: f64) -> String {
    format!(
        "✅ Purchase Successful!\n\n\
         🎯 Tip: {}\n\
         💵 Price: ${:.2}\n\
         💰 Your remaining balance: ${new_balance:.2}\n\n\
         📝 Unlocked content:\n{}",
        game.tip_title,
        game.tip_price,
        game.content_after_purchase
            .as_deref()
            .unwrap_or("No content provided."),
    )
}

pub fn insufficient_balance_text(balance: f64, price: f64) -> String {
    format!(
        "❌ Insufficient balance.\n\n\
         💵 Tip price: ${price:.2}\n\
         💰 Your balance: ${balance:.2}\n\n\
         💳 Deposit funds to unlock this tip."
    )
}

fn active_label(active: bool) -> &'static str {
    if active {
        "🟢 Active"
    } else {
        "🔴 Inactive"
    }
}
