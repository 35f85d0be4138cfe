use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;

use hwbot_core::{
    config::{Config, LogSettings},
    notifier::Notifier,
    ports::{HomeworkSource, MessagingPort},
    watcher::{now_unix, Watcher},
};
use hwbot_praktikum::PraktikumClient;
use hwbot_telegram::TelegramMessenger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    hwbot_core::logging::init("hwbot", &LogSettings::from_env())?;

    let cfg = match Config::load() {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            tracing::error!("bot stopped, missing credentials: {e}");
            return Err(e.into());
        }
    };

    let source: Arc<dyn HomeworkSource> = Arc::new(
        PraktikumClient::new(
            cfg.api_url.clone(),
            cfg.praktikum_token.clone(),
            cfg.http_timeout,
        )
        .context("failed to build review API client")?,
    );

    let telegram = TelegramMessenger::new(teloxide::Bot::new(cfg.telegram_token.clone()));
    if let Some(name) = telegram.username().await {
        tracing::info!("hwbot started: @{name}");
    }
    let messenger: Arc<dyn MessagingPort> = Arc::new(telegram);
    let notifier = Notifier::new(messenger, cfg.chat_id);

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("shutdown requested");
                cancel.cancel();
            }
        });
    }

    let mut watcher = Watcher::new(cfg, source, notifier, now_unix());
    watcher.run(cancel).await;

    Ok(())
}
