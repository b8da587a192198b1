use anyhow::Result;

use threadline_api::{bootstrap, Config};

pub async fn run(config: &Config, thread_id: &str) -> Result<()> {
    let store = bootstrap::connect_store(config).await?;
    let client = bootstrap::chat_client(config)?;
    let tools = bootstrap::tool_registry(config)?;
    let agent = bootstrap::agent_service(config, store, client, tools)?;

    let outcome = agent.chat(thread_id).await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
