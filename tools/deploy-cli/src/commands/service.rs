//! Show a service's current status.

use super::RenderClient;

pub async fn run(client: &RenderClient, id: &str) -> anyhow::Result<()> {
    let (status, body) = client.get(&format!("/services/{id}")).await?;
    println!("Service Status: {status}");
    println!("Service Response: {body}");
    Ok(())
}
