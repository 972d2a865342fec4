//! Minimal Telegram Bot API client.
//!
//! Long-polled `getUpdates` plus the handful of methods the handlers need.
//! Only the fields we read are modeled.

use std::path::Path;

use async_trait::async_trait;
use clearcast_common::error::{ClearcastError, ClearcastResult};
use serde::Deserialize;

use crate::transport::ChatTransport;

const POLL_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub video: Option<Video>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct Video {
    pub file_id: String,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub duration: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FileInfo {
    #[serde(default)]
    file_path: Option<String>,
}

pub struct TelegramClient {
    http: reqwest::Client,
    api_base: String,
    file_base: String,
}

impl TelegramClient {
    pub fn new(token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: format!("https://api.telegram.org/bot{token}"),
            file_base: format!("https://api.telegram.org/file/bot{token}"),
        }
    }

    /// Long-poll for new updates starting at `offset`.
    pub async fn get_updates(&self, offset: i64) -> ClearcastResult<Vec<Update>> {
        let url = format!(
            "{}/getUpdates?timeout={POLL_TIMEOUT_SECS}&offset={offset}",
            self.api_base
        );
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ClearcastError::transport(format!("getUpdates failed: {e}")))?;
        let body: ApiResponse<Vec<Update>> = response
            .json()
            .await
            .map_err(|e| ClearcastError::transport(format!("getUpdates returned bad JSON: {e}")))?;
        unwrap_response(body, "getUpdates")
    }

    async fn call_method<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        payload: serde_json::Value,
    ) -> ClearcastResult<T> {
        let url = format!("{}/{method}", self.api_base);
        let response = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ClearcastError::transport(format!("{method} failed: {e}")))?;
        let body: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| ClearcastError::transport(format!("{method} returned bad JSON: {e}")))?;
        unwrap_response(body, method)
    }
}

fn unwrap_response<T>(body: ApiResponse<T>, method: &str) -> ClearcastResult<T> {
    if !body.ok {
        return Err(ClearcastError::transport(format!(
            "{method} rejected: {}",
            body.description.unwrap_or_else(|| "no description".to_string())
        )));
    }
    body.result
        .ok_or_else(|| ClearcastError::transport(format!("{method} returned no result")))
}

#[async_trait]
impl ChatTransport for TelegramClient {
    async fn download_file(&self, file_id: &str, dest: &Path) -> ClearcastResult<()> {
        let info: FileInfo = self
            .call_method("getFile", serde_json::json!({ "file_id": file_id }))
            .await
            .map_err(|e| ClearcastError::download(e.to_string()))?;
        let file_path = info
            .file_path
            .ok_or_else(|| ClearcastError::download("getFile returned no file_path"))?;

        let url = format!("{}/{file_path}", self.file_base);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ClearcastError::download(format!("File download failed: {e}")))?;
        if !response.status().is_success() {
            return Err(ClearcastError::download(format!(
                "File download returned HTTP {}",
                response.status()
            )));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClearcastError::download(format!("File download aborted: {e}")))?;
        tokio::fs::write(dest, &bytes).await?;

        tracing::info!(file_id, dest = %dest.display(), bytes = bytes.len(), "Downloaded file");
        Ok(())
    }

    async fn send_message(&self, chat_id: i64, text: &str) -> ClearcastResult<()> {
        let _: serde_json::Value = self
            .call_method(
                "sendMessage",
                serde_json::json!({ "chat_id": chat_id, "text": text }),
            )
            .await?;
        Ok(())
    }

    async fn send_video(&self, chat_id: i64, path: &Path, caption: &str) -> ClearcastResult<()> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "video.mp4".to_string());

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("video/mp4")
            .map_err(|e| ClearcastError::transport(format!("Bad mime type: {e}")))?;
        let form = reqwest::multipart::Form::new()
            .text("chat_id", chat_id.to_string())
            .text("caption", caption.to_string())
            .part("video", part);

        let url = format!("{}/sendVideo", self.api_base);
        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ClearcastError::transport(format!("sendVideo failed: {e}")))?;
        let body: ApiResponse<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| ClearcastError::transport(format!("sendVideo returned bad JSON: {e}")))?;
        unwrap_response(body, "sendVideo").map(|_| ())
    }

    async fn send_chat_action(&self, chat_id: i64, action: &str) {
        let result: ClearcastResult<serde_json::Value> = self
            .call_method(
                "sendChatAction",
                serde_json::json!({ "chat_id": chat_id, "action": action }),
            )
            .await;
        if let Err(e) = result {
            tracing::debug!(chat_id, action, error = %e, "sendChatAction failed (ignored)");
        }
    }
}
