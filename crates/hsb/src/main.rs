use std::sync::Arc;

use hsb_core::{config::Config, ports::CardSource};
use hsb_hearthstone::HearthstoneClient;

#[tokio::main]
async fn main() -> Result<(), hsb_core::Error> {
    hsb_core::logging::init("hsb")?;

    let cfg = Arc::new(Config::load()?);

    let source: Arc<dyn CardSource> = Arc::new(HearthstoneClient::new(
        &cfg.api_base_url,
        &cfg.api_host,
        &cfg.api_key,
        cfg.http_timeout,
    )?);

    hsb_telegram::router::run_polling(cfg, source)
        .await
        .map_err(|e| hsb_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
