//! Show an environment's details.

use super::{truncate_body, RenderClient};

const MAX_PRINTED_CHARS: usize = 3000;

pub async fn run(client: &RenderClient, id: &str) -> anyhow::Result<()> {
    let (status, body) = client.get(&format!("/environments/{id}")).await?;
    println!("Env Status: {status}");
    println!("Env Response: {}", truncate_body(&body, MAX_PRINTED_CHARS));
    Ok(())
}
