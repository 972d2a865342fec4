//! Show a single deploy's status.

use super::RenderClient;

pub async fn run(client: &RenderClient, id: &str) -> anyhow::Result<()> {
    let (status, body) = client.get(&format!("/deploys/{id}")).await?;
    println!("Deploy Status: {status}");
    println!("Deploy Response: {body}");
    Ok(())
}
