use anyhow::Result;

use threadline_api::{bootstrap, Config};

pub async fn run(config: &Config, thread_id: &str) -> Result<()> {
    let store = bootstrap::connect_store(config).await?;
    let client = bootstrap::chat_client(config)?;
    let compactor = bootstrap::memory_compactor(config, store, client);

    match compactor.compact(thread_id).await? {
        Some(memory) => {
            println!("Memorized until: {}", memory.memorized_until.to_rfc3339());
            println!("{}", memory.summary);
        }
        None => println!("Nothing new to summarize in {}", thread_id),
    }
    Ok(())
}
