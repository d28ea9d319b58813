//! HTTP proxy to the REST backend.
//!
//! Every bot handler mutates state through this client rather than touching
//! storage. [`BackendApi`] is the seam: production uses [`HttpBackend`] over
//! `reqwest`, tests substitute recording fakes.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::models::{BetRecord, Game, NewGame, PaymentLink, Stats, User};

/// Failure taxonomy for backend calls
#[derive(Debug, Clone)]
pub enum BackendError {
    /// Transport-level failure (connect, timeout, TLS)
    Http(String),
    /// Non-2xx response, with the backend's `message` when present
    Status { code: u16, message: String },
    /// Body did not match the expected JSON shape
    Decode(String),
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::Http(msg) => write!(f, "http error: {msg}"),
            BackendError::Status { code, message } => {
                write!(f, "backend returned {code}: {message}")
            }
            BackendError::Decode(msg) => write!(f, "decode error: {msg}"),
        }
    }
}

impl std::error::Error for BackendError {}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BackendError::Decode(err.to_string())
        } else {
            BackendError::Http(err.to_string())
        }
    }
}

/// The backend operations the bot depends on
#[async_trait]
pub trait BackendApi: Send + Sync {
    async fn telegram_signup(
        &self,
        telegram_id: i64,
        user_name: &str,
        email: &str,
    ) -> Result<User, BackendError>;
    async fn get_user(&self, user_id: &str) -> Result<User, BackendError>;
    async fn list_users(&self) -> Result<Vec<User>, BackendError>;
    async fn deposit(&self, user_id: &str, amount: f64) -> Result<(), BackendError>;
    async fn deactivate_user(&self, user_id: &str) -> Result<(), BackendError>;
    async fn reactivate_user(&self, user_id: &str) -> Result<(), BackendError>;
    async fn delete_user(&self, user_id: &str) -> Result<(), BackendError>;

    async fn stats(&self) -> Result<Stats, BackendError>;
    async fn list_games(&self) -> Result<Vec<Game>, BackendError>;
    async fn add_game(&self, game: &NewGame) -> Result<Game, BackendError>;
    async fn toggle_game(&self, game_id: &str) -> Result<Game, BackendError>;
    /// Idempotent: deactivating an already-inactive game is a no-op
    async fn deactivate_game(&self, game_id: &str) -> Result<(), BackendError>;
    async fn buy_game(&self, game_id: &str, user_id: &str) -> Result<Game, BackendError>;
    async fn increment_current_limit(&self, game_id: &str) -> Result<(), BackendError>;
    async fn update_balance(&self, user_id: &str, amount: f64) -> Result<(), BackendError>;
    async fn add_bet_history(
        &self,
        user_id: &str,
        record: &BetRecord,
    ) -> Result<(), BackendError>;

    async fn create_payment(
        &self,
        amount: f64,
        order_id: &str,
    ) -> Result<PaymentLink, BackendError>;
}

#[derive(Deserialize)]
struct UserEnvelope {
    user: User,
}

#[derive(Deserialize)]
struct UsersEnvelope {
    users: Vec<User>,
}

#[derive(Deserialize)]
struct GameEnvelope {
    game: Game,
}

/// `reqwest`-based implementation of [`BackendApi`]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        // Best-effort extraction of the backend's {message} body
        let message = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
            .unwrap_or_else(|| status.to_string());
        Err(BackendError::Status {
            code: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl BackendApi for HttpBackend {
    async fn telegram_signup(
        &self,
        telegram_id: i64,
        user_name: &str,
        email: &str,
    ) -> Result<User, BackendError> {
        debug!(telegram_id, "Syncing Telegram user with backend");
        let response = self
            .client
            .post(self.url("/api/auth/telegram-signup"))
            .json(&json!({
                "telegramId": telegram_id,
                "userName": user_name,
                "email": email,
            }))
            .send()
            .await?;
        let envelope: UserEnvelope = Self::check(response).await?.json().await?;
        Ok(envelope.user)
    }

    async fn get_user(&self, user_id: &str) -> Result<User, BackendError> {
        let response = self
            .client
            .get(self.url(&format!("/api/auth/getUserById/{user_id}")))
            .send()
            .await?;
        let envelope: UserEnvelope = Self::check(response).await?.json().await?;
        Ok(envelope.user)
    }

    async fn list_users(&self) -> Result<Vec<User>, BackendError> {
        let response = self
            .client
            .get(self.url("/api/auth/getUsers"))
            .send()
            .await?;
        let envelope: UsersEnvelope = Self::check(response).await?.json().await?;
        Ok(envelope.users)
    }

    async fn deposit(&self, user_id: &str, amount: f64) -> Result<(), BackendError> {
        let response = self
            .client
            .post(self.url("/api/auth/deposit"))
            .json(&json!({ "userId": user_id, "amount": amount }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn deactivate_user(&self, user_id: &str) -> Result<(), BackendError> {
        let response = self
            .client
            .put(self.url(&format!("/api/auth/deactivateUser/{user_id}")))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn reactivate_user(&self, user_id: &str) -> Result<(), BackendError> {
        let response = self
            .client
            .put(self.url(&format!("/api/auth/reactivateUser/{user_id}")))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn delete_user(&self, user_id: &str) -> Result<(), BackendError> {
        let response = self
            .client
            .delete(self.url(&format!("/api/auth/deleteUser/{user_id}")))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn stats(&self) -> Result<Stats, BackendError> {
        let response = self
            .client
            .get(self.url("/api/games/stats"))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn list_games(&self) -> Result<Vec<Game>, BackendError> {
        let response = self
            .client
            .get(self.url("/api/games/allGame"))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn add_game(&self, game: &NewGame) -> Result<Game, BackendError> {
        let response = self
            .client
            .post(self.url("/api/games/add"))
            .json(game)
            .send()
            .await?;
        let envelope: GameEnvelope = Self::check(response).await?.json().await?;
        Ok(envelope.game)
    }

    async fn toggle_game(&self, game_id: &str) -> Result<Game, BackendError> {
        let response = self
            .client
            .put(self.url(&format!("/api/games/{game_id}/toggle-active")))
            .send()
            .await?;
        let envelope: GameEnvelope = Self::check(response).await?.json().await?;
        Ok(envelope.game)
    }

    async fn deactivate_game(&self, game_id: &str) -> Result<(), BackendError> {
        let response = self
            .client
            .put(self.url(&format!("/api/games/{game_id}/deactivate")))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn buy_game(&self, game_id: &str, user_id: &str) -> Result<Game, BackendError> {
        let response = self
            .client
            .put(self.url(&format!("/api/games/{game_id}/buy")))
            .json(&json!({ "userId": user_id }))
            .send()
            .await?;
        let envelope: GameEnvelope = Self::check(response).await?.json().await?;
        Ok(envelope.game)
    }

    async fn increment_current_limit(&self, game_id: &str) -> Result<(), BackendError> {
        let response = self
            .client
            .put(self.url(&format!("/api/games/{game_id}/increment-current-limit")))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn update_balance(&self, user_id: &str, amount: f64) -> Result<(), BackendError> {
        let response = self
            .client
            .post(self.url("/api/games/updateBalance"))
            .json(&json!({ "userId": user_id, "amount": amount }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn add_bet_history(
        &self,
        user_id: &str,
        record: &BetRecord,
    ) -> Result<(), BackendError> {
        let response = self
            .client
            .put(self.url(&format!("/api/games/addBetHistory/{user_id}")))
            .json(record)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn create_payment(
        &self,
        amount: f64,
        order_id: &str,
    ) -> Result<PaymentLink, BackendError> {
        let response = self
            .client
            .post(self.url("/api/payment/create-payment"))
            .json(&json!({ "amount": amount, "orderId": order_id }))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }
}

/// Build a deposit order id in the conventional `deposit_<userId>_<timestamp>`
/// shape. User ids are underscore-free hex, so the framing is reversible.
pub fn deposit_order_id(user_id: &str, timestamp: i64) -> String {
    format!("deposit_{user_id}_{timestamp}")
}

/// Parse an order id produced by [`deposit_order_id`]
pub fn parse_deposit_order_id(order_id: &str) -> Option<(&str, i64)> {
    let mut parts = order_id.split('_');
    if parts.next()? != "deposit" {
        return None;
    }
    let user_id = parts.next()?;
    let timestamp: i64 = parts.next()?.parse().ok()?;
    if user_id.is_empty() || parts.next().is_some() {
        return None;
    }
    Some((user_id, timestamp))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deposit_order_id_round_trip() {
        let order_id = deposit_order_id("64f1a2b3c4d5e6f7a8b9c0d1", 1700000000);
        assert_eq!(order_id, "deposit_64f1a2b3c4d5e6f7a8b9c0d1_1700000000");
        assert_eq!(
            parse_deposit_order_id(&order_id),
            Some(("64f1a2b3c4d5e6f7a8b9c0d1", 1700000000))
        );
    }

    #[test]
    fn test_parse_rejects_malformed_order_ids() {
        assert_eq!(parse_deposit_order_id("withdraw_abc_1"), None);
        assert_eq!(parse_deposit_order_id("deposit_abc"), None);
        assert_eq!(parse_deposit_order_id("deposit__1700000000"), None);
        assert_eq!(parse_deposit_order_id("deposit_abc_notatime"), None);
        assert_eq!(parse_deposit_order_id("deposit_abc_1_extra"), None);
    }
}
