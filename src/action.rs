//! Typed callback actions.
//!
//! Inline-keyboard buttons carry opaque `verb` or `verb_arg` strings. They
//! are decoded once, at the edge, into an [`Action`] so the dispatch in the
//! callback handler is a plain `match` instead of a prefix chain. Argument
//! values are Mongo-style hex ids and therefore never contain underscores,
//! which keeps the `_` framing unambiguous.

/// A decoded callback-button action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // Customer actions
    MainMenu,
    Balance { user_id: String },
    Tips,
    Deposit,
    ConfirmDeposit,
    CancelDeposit,
    Purchases,
    History,
    Support,
    UpdateChannel,
    Buy { game_id: String },
    Back { user_id: String },

    // Admin panel
    AdminPanel,
    AddTip,
    ViewStats,
    ManageTips,
    ManageUsers,
    AddBalance,
    Broadcast,
    SelectUser { user_id: String },
    ManageTip { game_id: String },
    ToggleTip { game_id: String },
    ExtendTip { game_id: String },
    NotifyBuyers { game_id: String },
    ManageUser { user_id: String },
    ToggleUser { user_id: String },
    DeleteUser { user_id: String },

    // Add-tip wizard button entry points
    Confidence { level: u8 },
    SkipImage,
}

impl Action {
    /// Decode a raw `callback_data` string.
    ///
    /// Exact verbs are matched before prefixed ones, so `tips` can never be
    /// shadowed by `tip_<id>` and `back_main` never by `back_<id>`.
    pub fn parse(data: &str) -> Option<Action> {
        let exact = match data {
            "main_menu" | "back_main" => Some(Action::MainMenu),
            "tips" => Some(Action::Tips),
            "deposit" => Some(Action::Deposit),
            "confirm_deposit" => Some(Action::ConfirmDeposit),
            "cancel_deposit" => Some(Action::CancelDeposit),
            "purchases" => Some(Action::Purchases),
            "history" => Some(Action::History),
            "support" => Some(Action::Support),
            "update_channel" => Some(Action::UpdateChannel),
            "admin_panel" | "back_admin" => Some(Action::AdminPanel),
            "add_tip" => Some(Action::AddTip),
            "view_stats" => Some(Action::ViewStats),
            "manage_tips" => Some(Action::ManageTips),
            "manage_users" => Some(Action::ManageUsers),
            "add_balance" => Some(Action::AddBalance),
            "broadcast" => Some(Action::Broadcast),
            "skip_image" => Some(Action::SkipImage),
            _ => None,
        };
        if exact.is_some() {
            return exact;
        }

        if let Some(level) = data.strip_prefix("conf_") {
            let level: u8 = level.parse().ok()?;
            if (1..=5).contains(&level) {
                return Some(Action::Confidence { level });
            }
            return None;
        }
        if let Some(id) = data.strip_prefix("select_user_") {
            return non_empty(id).map(|user_id| Action::SelectUser { user_id });
        }
        if let Some(id) = data.strip_prefix("toggleUser_") {
            return non_empty(id).map(|user_id| Action::ToggleUser { user_id });
        }
        if let Some(id) = data.strip_prefix("deleteUser_") {
            return non_empty(id).map(|user_id| Action::DeleteUser { user_id });
        }
        if let Some(id) = data.strip_prefix("user_") {
            return non_empty(id).map(|user_id| Action::ManageUser { user_id });
        }
        if let Some(id) = data.strip_prefix("balance_") {
            return non_empty(id).map(|user_id| Action::Balance { user_id });
        }
        if let Some(id) = data.strip_prefix("buy_") {
            return non_empty(id).map(|game_id| Action::Buy { game_id });
        }
        if let Some(id) = data.strip_prefix("tip_") {
            return non_empty(id).map(|game_id| Action::ManageTip { game_id });
        }
        if let Some(id) = data.strip_prefix("toggle_") {
            return non_empty(id).map(|game_id| Action::ToggleTip { game_id });
        }
        if let Some(id) = data.strip_prefix("extend_") {
            return non_empty(id).map(|game_id| Action::ExtendTip { game_id });
        }
        if let Some(id) = data.strip_prefix("notify_") {
            return non_empty(id).map(|game_id| Action::NotifyBuyers { game_id });
        }
        if let Some(id) = data.strip_prefix("back_") {
            return non_empty(id).map(|user_id| Action::Back { user_id });
        }

        None
    }

    /// Encode back into the wire form used by keyboard builders
    pub fn encode(&self) -> String {
        match self {
            Action::MainMenu => "main_menu".to_string(),
            Action::Balance { user_id } => format!("balance_{user_id}"),
            Action::Tips => "tips".to_string(),
            Action::Deposit => "deposit".to_string(),
            Action::ConfirmDeposit => "confirm_deposit".to_string(),
            Action::CancelDeposit => "cancel_deposit".to_string(),
            Action::Purchases => "purchases".to_string(),
            Action::History => "history".to_string(),
            Action::Support => "support".to_string(),
            Action::UpdateChannel => "update_channel".to_string(),
            Action::Buy { game_id } => format!("buy_{game_id}"),
            Action::Back { user_id } => format!("back_{user_id}"),
            Action::AdminPanel => "admin_panel".to_string(),
            Action::AddTip => "add_tip".to_string(),
            Action::ViewStats => "view_stats".to_string(),
            Action::ManageTips => "manage_tips".to_string(),
            Action::ManageUsers => "manage_users".to_string(),
            Action::AddBalance => "add_balance".to_string(),
            Action::Broadcast => "broadcast".to_string(),
            Action::SelectUser { user_id } => format!("select_user_{user_id}"),
            Action::ManageTip { game_id } => format!("tip_{game_id}"),
            Action::ToggleTip { game_id } => format!("toggle_{game_id}"),
            Action::ExtendTip { game_id } => format!("extend_{game_id}"),
            Action::NotifyBuyers { game_id } => format!("notify_{game_id}"),
            Action::ManageUser { user_id } => format!("user_{user_id}"),
            Action::ToggleUser { user_id } => format!("toggleUser_{user_id}"),
            Action::DeleteUser { user_id } => format!("deleteUser_{user_id}"),
            Action::Confidence { level } => format!("conf_{level}"),
            Action::SkipImage => "skip_image".to_string(),
        }
    }

    /// Whether `caller` may perform this action given the admin set
    pub fn is_authorized(&self, admin_ids: &[u64], caller: u64) -> bool {
        !self.requires_admin() || admin_ids.contains(&caller)
    }

    /// Whether this action is restricted to the configured admin set
    pub fn requires_admin(&self) -> bool {
        matches!(
            self,
            Action::AdminPanel
                | Action::AddTip
                | Action::ViewStats
                | Action::ManageTips
                | Action::ManageUsers
                | Action::AddBalance
                | Action::Broadcast
                | Action::SelectUser { .. }
                | Action::ManageTip { .. }
                | Action::ToggleTip { .. }
                | Action::ExtendTip { .. }
                | Action::NotifyBuyers { .. }
                | Action::ManageUser { .. }
                | Action::ToggleUser { .. }
                | Action::DeleteUser { .. }
                | Action::Confidence { .. }
                | Action::SkipImage
        )
    }
}

fn non_empty(arg: &str) -> Option<String> {
    if arg.is_empty() {
        None
    } else {
        Some(arg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_verbs_win_over_prefixes() {
        // "tips" must never be captured by the "tip_" family
        assert_eq!(Action::parse("tips"), Some(Action::Tips));
        assert_eq!(
            Action::parse("tip_64f1a2b3"),
            Some(Action::ManageTip {
                game_id: "64f1a2b3".to_string()
            })
        );
        // "back_main" is the menu verb, any other "back_" arg is a user id
        assert_eq!(Action::parse("back_main"), Some(Action::MainMenu));
        assert_eq!(
            Action::parse("back_64f1a2b3"),
            Some(Action::Back {
                user_id: "64f1a2b3".to_string()
            })
        );
    }

    #[test]
    fn test_camel_case_verbs_do_not_collide() {
        assert_eq!(
            Action::parse("toggleUser_abc"),
            Some(Action::ToggleUser {
                user_id: "abc".to_string()
            })
        );
        assert_eq!(
            Action::parse("toggle_abc"),
            Some(Action::ToggleTip {
                game_id: "abc".to_string()
            })
        );
    }

    #[test]
    fn test_confidence_bounds() {
        assert_eq!(Action::parse("conf_1"), Some(Action::Confidence { level: 1 }));
        assert_eq!(Action::parse("conf_5"), Some(Action::Confidence { level: 5 }));
        assert_eq!(Action::parse("conf_0"), None);
        assert_eq!(Action::parse("conf_6"), None);
        assert_eq!(Action::parse("conf_x"), None);
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(Action::parse(""), None);
        assert_eq!(Action::parse("buy_"), None);
        assert_eq!(Action::parse("nonsense"), None);
    }

    #[test]
    fn test_encode_parse_round_trip() {
        let actions = [
            Action::Tips,
            Action::Buy {
                game_id: "64f1a2b3".to_string(),
            },
            Action::SelectUser {
                user_id: "64f1a2b3".to_string(),
            },
            Action::Confidence { level: 3 },
            Action::AdminPanel,
        ];
        for action in actions {
            assert_eq!(Action::parse(&action.encode()), Some(action));
        }
    }

    #[test]
    fn test_admin_gating_allowlist() {
        assert!(Action::AddTip.requires_admin());
        assert!(Action::Broadcast.requires_admin());
        assert!(Action::DeleteUser {
            user_id: "x".to_string()
        }
        .requires_admin());
        assert!(!Action::Tips.requires_admin());
        assert!(!Action::Buy {
            game_id: "x".to_string()
        }
        .requires_admin());
        assert!(!Action::Deposit.requires_admin());
    }
}
