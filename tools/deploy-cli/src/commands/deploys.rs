//! List recent deploys for a service.

use super::RenderClient;

pub async fn run(client: &RenderClient, id: &str) -> anyhow::Result<()> {
    let (status, body) = client.get(&format!("/services/{id}/deploys")).await?;
    println!("Deploys Status: {status}");
    println!("Deploys Response: {body}");
    Ok(())
}
