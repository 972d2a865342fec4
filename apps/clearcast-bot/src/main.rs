//! ClearCast bot: Telegram front end for the video denoising pipeline.
//!
//! Wires the dependency graph together (config, enhancement engine, media
//! backend, transport) and drives the long-polling loop. Each incoming
//! update is handled in its own task; jobs share only the enhancement
//! engine.

use std::sync::Arc;
use std::time::Duration;

use clearcast_common::config::{require_env, AppConfig};
use clearcast_enhance::{
    DeepFilterCliBackend, EngineTimeouts, EnhancementBackend, EnhancementEngine,
};
use clearcast_pipeline::{DenoisePipeline, FfmpegMedia, MediaOps};

mod handlers;
mod telegram;
mod transport;

use handlers::BotContext;
use telegram::TelegramClient;
use transport::ChatTransport;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load();
    clearcast_common::logging::init_logging(&config.logging);

    let token = require_env("BOT_TOKEN")?;

    if !FfmpegMedia::is_available() {
        anyhow::bail!("ffmpeg and ffprobe must be installed and on PATH");
    }

    let backend = DeepFilterCliBackend::new(config.media.audio_sample_rate);
    if !backend.is_available() {
        // Jobs will fail at model initialization; matches the behavior of
        // running without the enhancement dependency installed.
        tracing::warn!("deep-filter binary not found on PATH; videos cannot be enhanced");
    }

    let engine = Arc::new(EnhancementEngine::new(
        Arc::new(backend),
        EngineTimeouts {
            init: Duration::from_secs(config.limits.model_init_timeout_secs),
            enhance: Duration::from_secs(config.limits.enhancement_timeout_secs),
        },
    ));

    let media: Arc<dyn MediaOps> = Arc::new(FfmpegMedia);
    let pipeline = Arc::new(DenoisePipeline::new(
        media,
        engine,
        config.limits.clone(),
        config.media.clone(),
    ));

    let client = Arc::new(TelegramClient::new(&token));
    let ctx = Arc::new(BotContext {
        transport: Arc::clone(&client) as Arc<dyn ChatTransport>,
        pipeline,
    });

    tracing::info!("Bot starting");

    let mut offset = 0i64;
    loop {
        match client.get_updates(offset).await {
            Ok(updates) => {
                for update in updates {
                    offset = offset.max(update.update_id + 1);
                    tokio::spawn(handlers::handle_update(Arc::clone(&ctx), update));
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "getUpdates failed; backing off");
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
        }
    }
}
