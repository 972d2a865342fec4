//! Fetch recent service logs.

use super::{truncate_body, RenderClient};

const MAX_PRINTED_CHARS: usize = 3000;

pub async fn run(client: &RenderClient, id: &str, limit: u32) -> anyhow::Result<()> {
    let (status, body) = client
        .get(&format!("/services/{id}/logs?limit={limit}"))
        .await?;
    println!("Status: {status}");
    println!("Response: {}", truncate_body(&body, MAX_PRINTED_CHARS));
    Ok(())
}
