//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules for better organization:
//! - `message_handler`: Handles commands and wizard text input
//! - `callback_handler`: Decodes and dispatches inline keyboard callbacks
//! - `wizard_manager`: Advances the add-tip, add-balance, broadcast and
//!   deposit wizards
//! - `purchase`: The balance-gated purchase sequence
//! - `ui_builder`: Creates keyboards and formats messages

pub mod callback_handler;
pub mod message_handler;
pub mod purchase;
pub mod ui_builder;
pub mod wizard_manager;

use std::sync::Arc;

use crate::backend::BackendApi;
use crate::config::Config;
use crate::countdown::CountdownScheduler;
use crate::session::{ContextCache, SessionStore};

// Re-export main handler functions for use in main.rs
pub use callback_handler::callback_handler;
pub use message_handler::message_handler;

/// Shared dependencies handed to every handler
pub struct AppDeps {
    pub config: Config,
    pub backend: Arc<dyn BackendApi>,
    pub sessions: SessionStore,
    pub cache: ContextCache,
    pub countdowns: Arc<CountdownScheduler>,
}
