use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::info;

use sportstips_bot::backend::HttpBackend;
use sportstips_bot::bot::{self, AppDeps};
use sportstips_bot::config::Config;
use sportstips_bot::countdown::{CountdownScheduler, TelegramSurface};
use sportstips_bot::session::{ContextCache, SessionStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    info!("Starting Sports Tips Telegram Bot");

    let config = Config::from_env()?;
    let bot = Bot::new(&config.bot_token);

    let backend: Arc<dyn sportstips_bot::backend::BackendApi> =
        Arc::new(HttpBackend::new(&config.backend_url));

    let countdowns = Arc::new(CountdownScheduler::new(
        Arc::clone(&backend),
        Arc::new(TelegramSurface::new(bot.clone())),
        config.countdown_tick_secs,
    ));
    Arc::clone(&countdowns).spawn();

    let session_ttl = tokio::time::Duration::from_secs(config.session_ttl_secs);
    let deps = Arc::new(AppDeps {
        config,
        backend,
        sessions: SessionStore::new(session_ttl),
        cache: ContextCache::new(),
        countdowns,
    });

    // Sweep abandoned wizard sessions in the background
    {
        let deps = Arc::clone(&deps);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(session_ttl / 2);
            loop {
                interval.tick().await;
                deps.sessions.evict_stale().await;
            }
        });
    }

    info!("Bot initialized, starting dispatcher");

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint({
            let deps = Arc::clone(&deps);
            move |bot: Bot, msg: Message| {
                let deps = Arc::clone(&deps);
                async move { bot::message_handler(bot, msg, deps).await }
            }
        }))
        .branch(Update::filter_callback_query().endpoint({
            let deps = Arc::clone(&deps);
            move |bot: Bot, q: CallbackQuery| {
                let deps = Arc::clone(&deps);
                async move { bot::callback_handler(bot, q, deps).await }
            }
        }));

    Dispatcher::builder(bot, handler)
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
