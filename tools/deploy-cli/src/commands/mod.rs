//! Subcommand implementations and the shared Render API client.

pub mod deploy;
pub mod deploys;
pub mod env;
pub mod logs;
pub mod service;
pub mod services;
pub mod trigger;
pub mod whoami;

const DEFAULT_BASE_URL: &str = "https://api.render.com/v1";

/// Thin bearer-authenticated client for the Render API.
pub struct RenderClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl RenderClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            base_url,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn get(&self, path: &str) -> anyhow::Result<(reqwest::StatusCode, String)> {
        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        Ok((status, body))
    }

    pub async fn post(&self, path: &str) -> anyhow::Result<(reqwest::StatusCode, String)> {
        let response = self
            .http
            .post(self.url(path))
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        Ok((status, body))
    }
}

/// Cap a response body for terminal output.
pub fn truncate_body(body: &str, max_chars: usize) -> &str {
    match body.char_indices().nth(max_chars) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
