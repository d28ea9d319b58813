//! Backend data models shared by the HTTP client and the bot handlers.
//!
//! Field names follow the backend's JSON (camelCase, Mongo `_id` keys).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A backend user record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_name: String,
    pub email: String,
    #[serde(default)]
    pub available_balance: f64,
    #[serde(default)]
    pub telegram_id: Option<i64>,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub bet_history: Vec<BetRecord>,
}

fn default_role() -> String {
    "customer".to_string()
}

fn default_active() -> bool {
    true
}

impl User {
    pub fn is_backend_admin(&self) -> bool {
        self.role == "admin"
    }
}

/// A tip listing ("game") as stored by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    #[serde(rename = "_id")]
    pub id: String,
    pub tip_title: String,
    pub tip_price: f64,
    #[serde(default)]
    pub odd_ratio: f64,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub confidence_level: u8,
    /// Minutes the tip stays purchasable
    #[serde(default)]
    pub duration: u64,
    #[serde(default)]
    pub betting_sites: Vec<String>,
    #[serde(default)]
    pub content_after_purchase: Option<String>,
    #[serde(default)]
    pub purchase_limit: u32,
    #[serde(default, rename = "CurrentLimit")]
    pub current_limit: u32,
    #[serde(default)]
    pub purchased_by: Vec<String>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub result: Option<BetStatus>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Payload for creating a new tip listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGame {
    pub tip_title: String,
    pub tip_price: f64,
    pub odd_ratio: f64,
    pub image: Option<String>,
    pub confidence_level: u8,
    pub duration: u64,
    pub betting_sites: Vec<String>,
    pub content_after_purchase: String,
    pub purchase_limit: u32,
}

/// Canonical outcome vocabulary for purchased tips
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BetStatus {
    Pending,
    Won,
    Lost,
}

impl BetStatus {
    /// User-facing label with the status emoji
    pub fn label(&self) -> &'static str {
        match self {
            BetStatus::Pending => "⏳ Pending",
            BetStatus::Won => "✅ Won",
            BetStatus::Lost => "❌ Lost",
        }
    }
}

/// One entry of a user's purchase history
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BetRecord {
    pub game_id: String,
    pub game_name: String,
    pub tip_name: String,
    pub tip_price: f64,
    #[serde(default)]
    pub tip_odd: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub game_date: Option<DateTime<Utc>>,
    pub status: BetStatus,
}

/// Aggregated backend statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    #[serde(default)]
    pub users: u64,
    #[serde(default)]
    pub tips: u64,
    #[serde(default)]
    pub active_tips: u64,
    #[serde(default)]
    pub purchases: u64,
    #[serde(default)]
    pub revenue: f64,
}

/// Response from the payment gateway's create-payment endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentLink {
    #[serde(default)]
    pub pay_link: Option<String>,
    #[serde(default)]
    pub track_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_deserializes_backend_shape() {
        let json = r#"{
            "_id": "64f1a2b3c4d5e6f7a8b9c0d1",
            "userName": "alice",
            "email": "alice@example.com",
            "availableBalance": 42.5,
            "telegramId": 123456,
            "role": "customer",
            "active": true,
            "betHistory": []
        }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, "64f1a2b3c4d5e6f7a8b9c0d1");
        assert_eq!(user.available_balance, 42.5);
        assert_eq!(user.telegram_id, Some(123456));
        assert!(!user.is_backend_admin());
    }

    #[test]
    fn test_user_defaults_for_missing_fields() {
        let json = r#"{"_id": "abc", "userName": "bob", "email": "b@x.com"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.available_balance, 0.0);
        assert!(user.active);
        assert!(user.bet_history.is_empty());
    }

    #[test]
    fn test_new_game_serializes_camel_case() {
        let game = NewGame {
            tip_title: "Derby special".to_string(),
            tip_price: 9.99,
            odd_ratio: 2.5,
            image: None,
            confidence_level: 4,
            duration: 90,
            betting_sites: vec!["Bet9ja".to_string(), "1xbet".to_string()],
            content_after_purchase: "Over 2.5 goals".to_string(),
            purchase_limit: 100,
        };
        let value = serde_json::to_value(&game).unwrap();
        assert_eq!(value["tipTitle"], "Derby special");
        assert_eq!(value["oddRatio"], 2.5);
        assert_eq!(value["purchaseLimit"], 100);
        assert_eq!(value["contentAfterPurchase"], "Over 2.5 goals");
    }

    #[test]
    fn test_bet_status_round_trip() {
        for status in [BetStatus::Pending, BetStatus::Won, BetStatus::Lost] {
            let json = serde_json::to_string(&status).unwrap();
            let back: BetStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(status, back);
        }
        // Wire form is the bare canonical word
        assert_eq!(serde_json::to_string(&BetStatus::Won).unwrap(), "\"Won\"");
    }
}
