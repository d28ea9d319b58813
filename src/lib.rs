//! # Sports Tips Telegram Bot
//!
//! A Telegram front-end for a sports-tips sales backend: users browse paid
//! tips, top up a balance and unlock content; admins manage listings, users
//! and broadcasts through chat wizards. All persistent state lives in the
//! REST backend; the bot keeps only wizard sessions, a user-context cache
//! and the countdown registry in memory.

pub mod action;
pub mod backend;
pub mod bot;
pub mod config;
pub mod countdown;
pub mod models;
pub mod session;
pub mod wizard;
