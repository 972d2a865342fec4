//! The chat-transport capability consumed by the handlers.

use std::path::Path;

use async_trait::async_trait;
use clearcast_common::error::ClearcastResult;

/// Narrow interface over the chat platform. Handlers only see this, so
/// tests can substitute a recording mock.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Fetch a platform-hosted file to a local path.
    async fn download_file(&self, file_id: &str, dest: &Path) -> ClearcastResult<()>;

    /// Send a plain text message.
    async fn send_message(&self, chat_id: i64, text: &str) -> ClearcastResult<()>;

    /// Send a video file with a caption.
    async fn send_video(&self, chat_id: i64, path: &Path, caption: &str) -> ClearcastResult<()>;

    /// Best-effort UX hint ("typing", "upload_video", ...); failures are
    /// swallowed.
    async fn send_chat_action(&self, chat_id: i64, action: &str);
}
