//! Countdown scheduler for time-boxed tip listings.
//!
//! One scheduler owns every active countdown and redraws them all on a
//! shared slow tick (default 15s) instead of spinning one 1-second timer
//! per listing. A countdown message shows a block progress bar and the time
//! remaining; when a listing crosses its end time the scheduler issues the
//! backend deactivate call exactly once and drops the entry. Edit failures
//! (the owning message may have been deleted) are logged and swallowed.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::MessageId;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::backend::BackendApi;

const PROGRESS_SLOTS: usize = 10;

/// Where countdown redraws land. Production edits Telegram messages in
/// place; tests record the rendered frames.
#[async_trait]
pub trait CountdownSurface: Send + Sync {
    async fn redraw(&self, chat_id: ChatId, message_id: MessageId, text: String) -> Result<()>;
}

/// [`CountdownSurface`] that edits the tracked Telegram message
pub struct TelegramSurface {
    bot: Bot,
}

impl TelegramSurface {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl CountdownSurface for TelegramSurface {
    async fn redraw(&self, chat_id: ChatId, message_id: MessageId, text: String) -> Result<()> {
        self.bot
            .edit_message_text(chat_id, message_id, text)
            .await?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct CountdownEntry {
    title: String,
    chat_id: ChatId,
    message_id: MessageId,
    end_time: DateTime<Utc>,
    total_secs: i64,
}

/// Shared scheduler for all active listing countdowns
pub struct CountdownScheduler {
    entries: RwLock<HashMap<String, CountdownEntry>>,
    backend: Arc<dyn BackendApi>,
    surface: Arc<dyn CountdownSurface>,
    tick: tokio::time::Duration,
}

impl CountdownScheduler {
    pub fn new(
        backend: Arc<dyn BackendApi>,
        surface: Arc<dyn CountdownSurface>,
        tick_secs: u64,
    ) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            backend,
            surface,
            tick: tokio::time::Duration::from_secs(tick_secs.max(1)),
        }
    }

    /// Start tracking a listing's countdown message.
    ///
    /// Re-tracking the same listing replaces the previous entry.
    pub async fn track(
        &self,
        game_id: &str,
        title: &str,
        chat_id: ChatId,
        message_id: MessageId,
        end_time: DateTime<Utc>,
        total_secs: i64,
    ) {
        info!(game_id, %chat_id, "Tracking countdown");
        self.entries.write().await.insert(
            game_id.to_string(),
            CountdownEntry {
                title: title.to_string(),
                chat_id,
                message_id,
                end_time,
                total_secs: total_secs.max(1),
            },
        );
    }

    /// Stop tracking without deactivating (manual admin toggle)
    pub async fn cancel(&self, game_id: &str) {
        if self.entries.write().await.remove(game_id).is_some() {
            info!(game_id, "Countdown cancelled");
        }
    }

    pub async fn active_count(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Redraw every active countdown and expire the ones past their end.
    ///
    /// Expired entries are removed from the registry before any await, so a
    /// listing's deactivate call can fire at most once however many ticks
    /// observe the expiry.
    pub async fn tick_once(&self, now: DateTime<Utc>) {
        let (expired, active): (Vec<_>, Vec<_>) = {
            let mut entries = self.entries.write().await;
            let expired_ids: Vec<String> = entries
                .iter()
                .filter(|(_, entry)| entry.end_time <= now)
                .map(|(id, _)| id.clone())
                .collect();
            let expired: Vec<(String, CountdownEntry)> = expired_ids
                .into_iter()
                .filter_map(|id| entries.remove(&id).map(|entry| (id, entry)))
                .collect();
            let active: Vec<(String, CountdownEntry)> = entries
                .iter()
                .map(|(id, entry)| (id.clone(), entry.clone()))
                .collect();
            (expired, active)
        };

        for (game_id, entry) in expired {
            info!(game_id, "Countdown expired, deactivating listing");
            let final_text = format!("⌛ {} — tip expired.", entry.title);
            if let Err(e) = self
                .surface
                .redraw(entry.chat_id, entry.message_id, final_text)
                .await
            {
                warn!(game_id, error = %e, "Failed to draw final countdown frame");
            }
            if let Err(e) = self.backend.deactivate_game(&game_id).await {
                error!(game_id, error = %e, "Failed to deactivate expired listing");
            }
        }

        for (game_id, entry) in active {
            let remaining = (entry.end_time - now).num_seconds();
            let text = render_countdown(&entry.title, remaining, entry.total_secs);
            if let Err(e) = self
                .surface
                .redraw(entry.chat_id, entry.message_id, text)
                .await
            {
                // The owning message may have been deleted; keep ticking
                // until natural expiry.
                warn!(game_id, error = %e, "Countdown redraw failed");
            }
        }
    }

    /// Run the shared tick loop until the process shuts down
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.tick);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                self.tick_once(Utc::now()).await;
            }
        })
    }
}

/// Render one countdown frame: title, 10-slot progress bar, time remaining
pub fn render_countdown(title: &str, remaining_secs: i64, total_secs: i64) -> String {
    let total = total_secs.max(1);
    let remaining = remaining_secs.clamp(0, total);
    let elapsed_fraction = (total - remaining) as f64 / total as f64;
    let filled = ((elapsed_fraction * PROGRESS_SLOTS as f64) as usize).min(PROGRESS_SLOTS);

    let mut bar = String::new();
    for slot in 0..PROGRESS_SLOTS {
        bar.push(if slot < filled { '█' } else { '░' });
    }

    format!(
        "⏳ {title}\n[{bar}] {} left",
        format_remaining(remaining)
    )
}

fn format_remaining(secs: i64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_fresh_countdown() {
        let text = render_countdown("Derby special", 600, 600);
        assert!(text.contains("Derby special"));
        assert!(text.contains("░░░░░░░░░░"));
        assert!(text.contains("10:00 left"));
    }

    #[test]
    fn test_render_halfway() {
        let text = render_countdown("Derby", 300, 600);
        assert!(text.contains("█████░░░░░"));
        assert!(text.contains("05:00 left"));
    }

    #[test]
    fn test_render_clamps_out_of_range() {
        // Past expiry and over-long remainders render without panicking
        let done = render_countdown("Derby", -5, 600);
        assert!(done.contains("██████████"));
        assert!(done.contains("00:00 left"));
        let fresh = render_countdown("Derby", 700, 600);
        assert!(fresh.contains("░░░░░░░░░░"));
    }

    #[test]
    fn test_render_hours() {
        let text = render_countdown("Derby", 3 * 3600 + 62, 4 * 3600);
        assert!(text.contains("3:01:02 left"));
    }
}
