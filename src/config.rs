//! # Bot Configuration Module
//!
//! Collects everything the bot reads from the environment: the Telegram
//! token, the backend base URL, the admin identity set and the tuning knobs
//! for the countdown scheduler and session eviction.

use anyhow::{Context, Result};
use std::env;

// Constants for scheduler and session tuning
pub const DEFAULT_COUNTDOWN_TICK_SECS: u64 = 15;
pub const DEFAULT_SESSION_TTL_SECS: u64 = 30 * 60; // 30 minutes
pub const DEFAULT_MENU_IMAGE_URL: &str =
    "https://raw.githubusercontent.com/Favour-111/my-asset/main/image.jpg";

/// Runtime configuration for the sports-tips bot
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram bot token
    pub bot_token: String,
    /// Base URL of the REST backend (no trailing slash)
    pub backend_url: String,
    /// Telegram user ids allowed to use admin actions
    pub admin_ids: Vec<u64>,
    /// Seconds between countdown scheduler ticks
    pub countdown_tick_secs: u64,
    /// Seconds an abandoned wizard session survives before eviction
    pub session_ttl_secs: u64,
    /// Image shown above the main menu caption
    pub menu_image_url: String,
}

impl Config {
    /// Build the configuration from environment variables.
    ///
    /// `TELEGRAM_BOT_TOKEN` and `SERVER` are required; `ADMIN_CHAT_IDS` is a
    /// comma-separated list of Telegram user ids.
    pub fn from_env() -> Result<Self> {
        let bot_token =
            env::var("TELEGRAM_BOT_TOKEN").context("TELEGRAM_BOT_TOKEN must be set")?;
        let backend_url = env::var("SERVER").context("SERVER must be set")?;
        let admin_ids = parse_admin_ids(&env::var("ADMIN_CHAT_IDS").unwrap_or_default());

        let countdown_tick_secs = parse_secs(
            env::var("COUNTDOWN_TICK_SECS").ok(),
            DEFAULT_COUNTDOWN_TICK_SECS,
        );
        let session_ttl_secs =
            parse_secs(env::var("SESSION_TTL_SECS").ok(), DEFAULT_SESSION_TTL_SECS);
        let menu_image_url =
            env::var("MENU_IMAGE_URL").unwrap_or_else(|_| DEFAULT_MENU_IMAGE_URL.to_string());

        Ok(Self {
            bot_token,
            backend_url: backend_url.trim_end_matches('/').to_string(),
            admin_ids,
            countdown_tick_secs,
            session_ttl_secs,
            menu_image_url,
        })
    }

    /// Whether a Telegram user id belongs to the admin set
    pub fn is_admin(&self, telegram_id: u64) -> bool {
        self.admin_ids.contains(&telegram_id)
    }
}

/// Parse a comma-separated list of Telegram ids, ignoring malformed entries
pub fn parse_admin_ids(raw: &str) -> Vec<u64> {
    raw.split(',')
        .filter_map(|part| part.trim().parse::<u64>().ok())
        .collect()
}

/// Parse a seconds knob, falling back to the default on malformed input and
/// clamping to at least one second. `tokio::time::interval` panics on a zero
/// period, and a zero TTL would evict live sessions instantly.
pub fn parse_secs(raw: Option<String>, default: u64) -> u64 {
    raw.and_then(|v| v.parse().ok()).unwrap_or(default).max(1)
}
