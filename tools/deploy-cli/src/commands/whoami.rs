//! Show the authenticated owner.

use super::RenderClient;

pub async fn run(client: &RenderClient) -> anyhow::Result<()> {
    let (status, body) = client.get("/owners/me").await?;
    println!("Owner Status: {status}");
    println!("Owner Response: {body}");
    Ok(())
}
