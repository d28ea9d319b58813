//! Shared test doubles: a recording backend and a recording countdown
//! surface.

#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Mutex;
use teloxide::types::{ChatId, MessageId};

use sportstips_bot::backend::{BackendApi, BackendError};
use sportstips_bot::countdown::CountdownSurface;
use sportstips_bot::models::{BetRecord, Game, NewGame, PaymentLink, Stats, User};

pub fn sample_user(id: &str, balance: f64) -> User {
    User {
        id: id.to_string(),
        user_name: format!("user-{id}"),
        email: format!("{id}@example.com"),
        available_balance: balance,
        telegram_id: Some(1000),
        role: "customer".to_string(),
        active: true,
        bet_history: vec![],
    }
}

pub fn sample_game(id: &str, price: f64) -> Game {
    Game {
        id: id.to_string(),
        tip_title: format!("tip-{id}"),
        tip_price: price,
        odd_ratio: 2.5,
        image: None,
        confidence_level: 4,
        duration: 90,
        betting_sites: vec!["Bet9ja".to_string()],
        content_after_purchase: Some("Over 2.5 goals".to_string()),
        purchase_limit: 100,
        current_limit: 0,
        purchased_by: vec![],
        active: true,
        result: None,
        created_at: None,
    }
}

/// [`BackendApi`] double that records every call in order
#[derive(Default)]
pub struct RecordingBackend {
    pub calls: Mutex<Vec<String>>,
    pub users: Mutex<Vec<User>>,
    pub games: Mutex<Vec<Game>>,
    pub added_games: Mutex<Vec<NewGame>>,
    pub deactivated: Mutex<Vec<String>>,
    /// When set, `deactivate_game` fails with this message
    pub fail_deactivate: Option<String>,
}

impl RecordingBackend {
    pub fn with_users(self, users: Vec<User>) -> Self {
        *self.users.lock().unwrap() = users;
        self
    }

    pub fn with_games(self, games: Vec<Game>) -> Self {
        *self.games.lock().unwrap() = games;
        self
    }

    pub fn recorded_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }

    fn not_found(what: &str) -> BackendError {
        BackendError::Status {
            code: 404,
            message: format!("{what} not found"),
        }
    }
}

#[async_trait]
impl BackendApi for RecordingBackend {
    async fn telegram_signup(
        &self,
        telegram_id: i64,
        user_name: &str,
        email: &str,
    ) -> Result<User, BackendError> {
        self.record("telegram_signup");
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter().find(|u| u.telegram_id == Some(telegram_id)) {
            return Ok(user.clone());
        }
        let mut user = sample_user(&format!("tg{telegram_id}"), 0.0);
        user.user_name = user_name.to_string();
        user.email = email.to_string();
        user.telegram_id = Some(telegram_id);
        users.push(user.clone());
        Ok(user)
    }

    async fn get_user(&self, user_id: &str) -> Result<User, BackendError> {
        self.record("get_user");
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or_else(|| Self::not_found("user"))
    }

    async fn list_users(&self) -> Result<Vec<User>, BackendError> {
        self.record("list_users");
        Ok(self.users.lock().unwrap().clone())
    }

    async fn deposit(&self, _user_id: &str, _amount: f64) -> Result<(), BackendError> {
        self.record("deposit");
        Ok(())
    }

    async fn deactivate_user(&self, _user_id: &str) -> Result<(), BackendError> {
        self.record("deactivate_user");
        Ok(())
    }

    async fn reactivate_user(&self, _user_id: &str) -> Result<(), BackendError> {
        self.record("reactivate_user");
        Ok(())
    }

    async fn delete_user(&self, _user_id: &str) -> Result<(), BackendError> {
        self.record("delete_user");
        Ok(())
    }

    async fn stats(&self) -> Result<Stats, BackendError> {
        self.record("stats");
        Ok(Stats::default())
    }

    async fn list_games(&self) -> Result<Vec<Game>, BackendError> {
        self.record("list_games");
        Ok(self.games.lock().unwrap().clone())
    }

    async fn add_game(&self, game: &NewGame) -> Result<Game, BackendError> {
        self.record("add_game");
        self.added_games.lock().unwrap().push(game.clone());
        let mut created = sample_game("created", game.tip_price);
        created.tip_title = game.tip_title.clone();
        created.duration = game.duration;
        Ok(created)
    }

    async fn toggle_game(&self, game_id: &str) -> Result<Game, BackendError> {
        self.record("toggle_game");
        let mut games = self.games.lock().unwrap();
        let game = games
            .iter_mut()
            .find(|g| g.id == game_id)
            .ok_or_else(|| Self::not_found("game"))?;
        game.active = !game.active;
        Ok(game.clone())
    }

    async fn deactivate_game(&self, game_id: &str) -> Result<(), BackendError> {
        self.record("deactivate_game");
        if let Some(message) = &self.fail_deactivate {
            return Err(BackendError::Http(message.clone()));
        }
        self.deactivated.lock().unwrap().push(game_id.to_string());
        Ok(())
    }

    async fn buy_game(&self, game_id: &str, user_id: &str) -> Result<Game, BackendError> {
        self.record("buy_game");
        let mut games = self.games.lock().unwrap();
        let game = games
            .iter_mut()
            .find(|g| g.id == game_id)
            .ok_or_else(|| Self::not_found("game"))?;
        game.purchased_by.push(user_id.to_string());
        Ok(game.clone())
    }

    async fn increment_current_limit(&self, _game_id: &str) -> Result<(), BackendError> {
        self.record("increment_current_limit");
        Ok(())
    }

    async fn update_balance(&self, _user_id: &str, _amount: f64) -> Result<(), BackendError> {
        self.record("update_balance");
        Ok(())
    }

    async fn add_bet_history(
        &self,
        _user_id: &str,
        _record: &BetRecord,
    ) -> Result<(), BackendError> {
        self.record("add_bet_history");
        Ok(())
    }

    async fn create_payment(
        &self,
        _amount: f64,
        _order_id: &str,
    ) -> Result<PaymentLink, BackendError> {
        self.record("create_payment");
        Ok(PaymentLink {
            pay_link: Some("https://pay.example.com/xyz".to_string()),
            track_id: Some("xyz".to_string()),
        })
    }
}

/// [`CountdownSurface`] double that records rendered frames
#[derive(Default)]
pub struct RecordingSurface {
    pub frames: Mutex<Vec<(ChatId, MessageId, String)>>,
    pub fail_redraw: bool,
}

#[async_trait]
impl CountdownSurface for RecordingSurface {
    async fn redraw(&self, chat_id: ChatId, message_id: MessageId, text: String) -> Result<()> {
        if self.fail_redraw {
            anyhow::bail!("message to edit not found");
        }
        self.frames.lock().unwrap().push((chat_id, message_id, text));
        Ok(())
    }
}
