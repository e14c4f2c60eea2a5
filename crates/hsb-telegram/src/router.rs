use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};

use hsb_core::{cache::CardCache, config::Config, domain::UserId, ports::CardSource};

use crate::handlers;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub cache: Arc<CardCache>,
    pub source: Arc<dyn CardSource>,
    /// The bot's own user id, used to ignore self-authored messages.
    pub me: Option<UserId>,
}

pub async fn run_polling(cfg: Arc<Config>, source: Arc<dyn CardSource>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    let me = match bot.get_me().await {
        Ok(me) => {
            tracing::info!(username = %me.username(), id = me.id.0, "bot logged in");
            Some(UserId(me.id.0))
        }
        Err(e) => {
            tracing::warn!(error = %e, "could not resolve own identity");
            None
        }
    };

    let state = Arc::new(AppState {
        cache: Arc::new(CardCache::new(cfg.cache_max_bytes, cfg.cache_ttl)),
        cfg,
        source,
        me,
    });

    let handler = dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    Ok(())
}
