use anyhow::{bail, Result};

use threadline_api::{bootstrap, Config};
use threadline_persist::{ChatStore, MessageStatus, NewMessage, NewThread};

use crate::seeds::{self, SeedData};

pub fn list() {
    for seed in seeds::registry() {
        println!(
            "{:<10} {} ({} messages{})",
            seed.name,
            seed.thread_id,
            seed.messages.len(),
            if seed.is_private { ", private" } else { "" }
        );
    }
}

pub async fn run(config: &Config, name: &str) -> Result<()> {
    let selected = if name == "all" {
        seeds::registry()
    } else {
        match seeds::find(name) {
            Some(seed) => vec![seed],
            None => bail!("Seed '{}' not found, try --list", name),
        }
    };

    let store = bootstrap::connect_store(config).await?;
    for seed in &selected {
        match apply(store.as_ref(), seed).await? {
            0 => println!("[{}] already exists, skipped", seed.thread_id),
            n => println!("Successfully seeded {} messages for thread: {}", n, seed.thread_id),
        }
    }
    Ok(())
}

/// Writes the fixture unless its thread already exists. Returns the number of
/// messages written.
pub async fn apply(store: &dyn ChatStore, seed: &SeedData) -> Result<usize> {
    if store.get_thread(seed.thread_id).await?.is_some() {
        return Ok(0);
    }

    store
        .create_thread(
            NewThread::new(seed.user_id)
                .with_id(seed.thread_id)
                .private(seed.is_private),
        )
        .await?;

    for msg in &seed.messages {
        let id = store
            .save_message(
                NewMessage::new(seed.thread_id, msg.role, msg.content)
                    .with_status(MessageStatus::Completed)
                    .with_created_at(msg.created_at),
            )
            .await?;
        tracing::debug!(thread_id = %seed.thread_id, message_id = %id, "Seeded message");
    }

    Ok(seed.messages.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use threadline_persist::InMemoryChatStore;

    #[tokio::test]
    async fn test_apply_is_idempotent() {
        let store = InMemoryChatStore::new();
        let seed = seeds::find("basic").unwrap();

        assert_eq!(apply(&store, &seed).await.unwrap(), 6);
        assert_eq!(apply(&store, &seed).await.unwrap(), 0);

        let messages = store.get_messages("basic-thread").await.unwrap();
        assert_eq!(messages.len(), 6);
        assert!(messages.iter().all(|m| m.has_status(MessageStatus::Completed)));

        let thread = store.get_thread("basic-thread").await.unwrap().unwrap();
        assert_eq!(thread.first_message, "こんにちは！");
        assert_eq!(thread.reply_count, 3);
    }

    #[tokio::test]
    async fn test_private_fixture() {
        let store = InMemoryChatStore::new();
        apply(&store, &seeds::find("private").unwrap()).await.unwrap();

        let thread = store.get_thread("private-project-thread").await.unwrap().unwrap();
        assert!(thread.is_private);
    }
}
