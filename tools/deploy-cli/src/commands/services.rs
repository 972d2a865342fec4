//! List all services visible to the API key.

use super::RenderClient;

pub async fn run(client: &RenderClient) -> anyhow::Result<()> {
    let (status, body) = client.get("/services").await?;
    println!("Services Status: {status}");
    println!("Services Response: {body}");
    Ok(())
}
