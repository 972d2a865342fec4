//! Update handlers: the glue between the chat transport and the pipeline.

use std::sync::Arc;

use clearcast_pipeline::{DenoisePipeline, JobNotice, JobStage, PipelineHooks, TempWorkspace};

use crate::telegram::{Update, Video};
use crate::transport::ChatTransport;

const WELCOME: &str = "🎬 Video Noise Reduction Bot\n\n\
    Send me a video and I'll remove noise from its audio track.";

const RESULT_CAPTION: &str = "✨ Your video with noise-reduced audio is ready!";

/// Shared handler context, one per process.
pub struct BotContext {
    pub transport: Arc<dyn ChatTransport>,
    pub pipeline: Arc<DenoisePipeline>,
}

/// Route one update. Never returns an error: every failure is converted to
/// a chat reply and logged, so nothing propagates past the job boundary.
pub async fn handle_update(ctx: Arc<BotContext>, update: Update) {
    let Some(message) = update.message else {
        return;
    };
    let chat_id = message.chat.id;

    if let Some(text) = &message.text {
        if text.trim() == "/start" {
            if let Err(e) = ctx.transport.send_message(chat_id, WELCOME).await {
                tracing::warn!(chat_id, error = %e, "Failed to send welcome");
            }
            return;
        }
    }

    if let Some(video) = message.video {
        handle_video(ctx, chat_id, video).await;
    }
}

async fn handle_video(ctx: Arc<BotContext>, chat_id: i64, video: Video) {
    tracing::info!(
        chat_id,
        file_id = %video.file_id,
        file_name = video.file_name.as_deref().unwrap_or("video.mp4"),
        size = video.file_size,
        "Received video"
    );

    let mut workspace = match TempWorkspace::create() {
        Ok(ws) => ws,
        Err(e) => {
            tracing::error!(chat_id, error = %e, "Failed to create job workspace");
            reply(&ctx, chat_id, &e.user_message()).await;
            return;
        }
    };
    let input_path = workspace.register("input.mp4");
    let output_path = workspace.register("output.mp4");

    reply(&ctx, chat_id, "⬇️ Downloading video...").await;
    if let Err(e) = ctx
        .transport
        .download_file(&video.file_id, &input_path)
        .await
    {
        tracing::error!(chat_id, error = %e, "Download failed");
        reply(&ctx, chat_id, &e.user_message()).await;
        workspace.cleanup();
        return;
    }

    ctx.transport.send_chat_action(chat_id, "upload_video").await;

    // Stage notices arrive on a sync callback; bridge them onto the async
    // transport through a channel.
    let (notice_tx, mut notice_rx) = tokio::sync::mpsc::unbounded_channel::<JobNotice>();
    let relay = {
        let transport = Arc::clone(&ctx.transport);
        tokio::spawn(async move {
            while let Some(notice) = notice_rx.recv().await {
                if let Some(text) = notice_text(&notice) {
                    if let Err(e) = transport.send_message(chat_id, text).await {
                        tracing::debug!(chat_id, error = %e, "Stage notice send failed");
                    }
                }
            }
        })
    };

    let hooks = PipelineHooks {
        progress: None,
        notice: Some(Arc::new(move |notice| {
            let _ = notice_tx.send(notice);
        })),
    };

    let result = ctx
        .pipeline
        .denoise_video(&input_path, &output_path, &hooks)
        .await;

    // Dropping the hooks closes the channel and ends the relay.
    drop(hooks);
    let _ = relay.await;

    match result {
        Ok(path) => {
            reply(&ctx, chat_id, "✅ Video processing complete! Sending...").await;
            if let Err(e) = ctx.transport.send_video(chat_id, &path, RESULT_CAPTION).await {
                tracing::error!(chat_id, error = %e, "Failed to send processed video");
                reply(&ctx, chat_id, &e.user_message()).await;
            }
        }
        Err(e) => {
            reply(&ctx, chat_id, &e.user_message()).await;
        }
    }

    workspace.cleanup();
}

async fn reply(ctx: &BotContext, chat_id: i64, text: &str) {
    if let Err(e) = ctx.transport.send_message(chat_id, text).await {
        tracing::warn!(chat_id, error = %e, "Failed to send message");
    }
}

fn notice_text(notice: &JobNotice) -> Option<&'static str> {
    match notice {
        JobNotice::Stage(JobStage::Extracting) => Some("🔊 Extracting audio..."),
        JobNotice::Stage(JobStage::Enhancing) => Some("🎧 Applying noise reduction..."),
        JobNotice::Stage(JobStage::Remuxing) => Some("🎬 Merging enhanced audio with video..."),
        JobNotice::Stage(_) => None,
        JobNotice::LongInput { .. } => {
            Some("⏳ That's a long video, processing may take several minutes.")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use clearcast_common::error::ClearcastResult;
    use clearcast_enhance::{EngineTimeouts, EnhancementEngine, PassthroughBackend};
    use clearcast_pipeline::{FfmpegMedia, MediaOps};
    use std::path::Path;
    use std::sync::Mutex;

    struct RecordingTransport {
        messages: Mutex<Vec<(i64, String)>>,
    }

    #[async_trait]
    impl ChatTransport for RecordingTransport {
        async fn download_file(&self, _file_id: &str, _dest: &Path) -> ClearcastResult<()> {
            Err(clearcast_common::error::ClearcastError::download(
                "no network in tests",
            ))
        }

        async fn send_message(&self, chat_id: i64, text: &str) -> ClearcastResult<()> {
            self.messages.lock().unwrap().push((chat_id, text.to_string()));
            Ok(())
        }

        async fn send_video(&self, _chat_id: i64, _path: &Path, _caption: &str) -> ClearcastResult<()> {
            Ok(())
        }

        async fn send_chat_action(&self, _chat_id: i64, _action: &str) {}
    }

    fn test_context(transport: Arc<RecordingTransport>) -> Arc<BotContext> {
        let engine = Arc::new(EnhancementEngine::new(
            Arc::new(PassthroughBackend::new(48_000)),
            EngineTimeouts::default(),
        ));
        let media: Arc<dyn MediaOps> = Arc::new(FfmpegMedia);
        let pipeline = Arc::new(DenoisePipeline::new(
            media,
            engine,
            Default::default(),
            Default::default(),
        ));
        Arc::new(BotContext {
            transport,
            pipeline,
        })
    }

    #[tokio::test]
    async fn start_command_sends_welcome() {
        let transport = Arc::new(RecordingTransport {
            messages: Mutex::new(Vec::new()),
        });
        let ctx = test_context(Arc::clone(&transport));

        let update: Update = serde_json::from_str(
            r#"{"update_id": 1, "message": {"chat": {"id": 9}, "text": "/start"}}"#,
        )
        .unwrap();
        handle_update(ctx, update).await;

        let messages = transport.messages.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].0, 9);
        assert!(messages[0].1.contains("Video Noise Reduction"));
    }

    #[tokio::test]
    async fn failed_download_reports_user_facing_error() {
        let transport = Arc::new(RecordingTransport {
            messages: Mutex::new(Vec::new()),
        });
        let ctx = test_context(Arc::clone(&transport));

        let update: Update = serde_json::from_str(
            r#"{"update_id": 2, "message": {"chat": {"id": 9}, "video": {"file_id": "f1"}}}"#,
        )
        .unwrap();
        handle_update(ctx, update).await;

        let messages = transport.messages.lock().unwrap();
        let last = &messages.last().unwrap().1;
        assert!(last.contains("Failed to download"), "got: {last}");
    }

    #[tokio::test]
    async fn non_command_text_is_ignored() {
        let transport = Arc::new(RecordingTransport {
            messages: Mutex::new(Vec::new()),
        });
        let ctx = test_context(Arc::clone(&transport));

        let update: Update = serde_json::from_str(
            r#"{"update_id": 3, "message": {"chat": {"id": 9}, "text": "hello"}}"#,
        )
        .unwrap();
        handle_update(ctx, update).await;

        assert!(transport.messages.lock().unwrap().is_empty());
    }

    #[test]
    fn stage_notices_map_to_user_messages() {
        assert!(notice_text(&JobNotice::Stage(JobStage::Extracting)).is_some());
        assert!(notice_text(&JobNotice::Stage(JobStage::Validating)).is_none());
        assert!(notice_text(&JobNotice::LongInput { duration_secs: 400.0 }).is_some());
    }
}
