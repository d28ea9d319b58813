//! Per-chat state held in process memory: the active wizard session and the
//! cached backend user context.
//!
//! Both stores are `Arc`-shared and guarded by `tokio::sync::RwLock`. The
//! session store enforces the single-active-flow rule (starting a wizard
//! silently replaces whatever was in progress) and evicts abandoned
//! sessions after a TTL instead of keeping them forever.

use std::collections::HashMap;
use teloxide::types::ChatId;
use tokio::sync::RwLock;
use tokio::time::{Duration, Instant};
use tracing::debug;

use crate::wizard::Flow;

struct SessionEntry {
    flow: Flow,
    touched: Instant,
}

/// Store of active wizard sessions, keyed by chat id
pub struct SessionStore {
    inner: RwLock<HashMap<ChatId, SessionEntry>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Begin a flow for a chat, discarding any flow already in progress
    pub async fn start(&self, chat_id: ChatId, flow: Flow) {
        let mut sessions = self.inner.write().await;
        if sessions.contains_key(&chat_id) {
            debug!(chat_id = %chat_id, "Replacing active wizard session");
        }
        sessions.insert(
            chat_id,
            SessionEntry {
                flow,
                touched: Instant::now(),
            },
        );
    }

    /// The chat's active flow, if any
    pub async fn get(&self, chat_id: ChatId) -> Option<Flow> {
        self.inner
            .read()
            .await
            .get(&chat_id)
            .map(|entry| entry.flow.clone())
    }

    /// Replace the flow state of an existing session, refreshing its TTL.
    ///
    /// A no-op if the session was cleared in the meantime (e.g. evicted
    /// between the read and the write of a handler).
    pub async fn update(&self, chat_id: ChatId, flow: Flow) {
        let mut sessions = self.inner.write().await;
        if let Some(entry) = sessions.get_mut(&chat_id) {
            entry.flow = flow;
            entry.touched = Instant::now();
        }
    }

    /// Terminate the chat's session, if any
    pub async fn clear(&self, chat_id: ChatId) {
        self.inner.write().await.remove(&chat_id);
    }

    /// Drop sessions untouched for longer than the TTL; returns how many
    pub async fn evict_stale(&self) -> usize {
        let mut sessions = self.inner.write().await;
        let before = sessions.len();
        let now = Instant::now();
        sessions.retain(|_, entry| now.duration_since(entry.touched) < self.ttl);
        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!(evicted, "Evicted stale wizard sessions");
        }
        evicted
    }
}

/// Cached backend identity for a chat
#[derive(Debug, Clone, PartialEq)]
pub struct UserContext {
    pub user_id: String,
    pub balance: f64,
    pub telegram_id: i64,
}

/// Lazily populated cache of backend user records, keyed by chat id.
///
/// Never expires; the balance may go stale and is re-fetched before
/// purchase-critical checks.
#[derive(Default)]
pub struct ContextCache {
    inner: RwLock<HashMap<ChatId, UserContext>>,
}

impl ContextCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, chat_id: ChatId) -> Option<UserContext> {
        self.inner.read().await.get(&chat_id).cloned()
    }

    pub async fn insert(&self, chat_id: ChatId, context: UserContext) {
        self.inner.write().await.insert(chat_id, context);
    }

    /// Overwrite the cached balance after a backend refresh or purchase
    pub async fn set_balance(&self, chat_id: ChatId, balance: f64) {
        if let Some(context) = self.inner.write().await.get_mut(&chat_id) {
            context.balance = balance;
        }
    }
}
