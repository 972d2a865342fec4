//! Trigger a new deploy.

use super::RenderClient;

pub async fn run(client: &RenderClient, id: &str) -> anyhow::Result<()> {
    let (status, body) = client.post(&format!("/services/{id}/deploys")).await?;
    println!("Deploy Status: {status}");
    println!("Deploy Response: {body}");
    Ok(())
}
