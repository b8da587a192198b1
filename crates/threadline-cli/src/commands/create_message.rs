use anyhow::Result;
use chrono::Utc;

use threadline_api::{bootstrap, Config};
use threadline_persist::{ChatStore, NewMessage, NewThread};

pub async fn run(config: &Config, message: &str, thread_id: Option<String>, user_id: &str) -> Result<()> {
    let store = bootstrap::connect_store(config).await?;
    let posted = post(store.as_ref(), message, thread_id, user_id).await?;

    if posted.created_thread {
        println!("✅ Thread created: {}", posted.thread_id);
    }
    println!("✅ Message created");
    println!("   Thread ID:  {}", posted.thread_id);
    println!("   Message ID: {}", posted.message_id);
    println!("   Content:    {}", message);
    Ok(())
}

#[derive(Debug)]
pub struct Posted {
    pub thread_id: String,
    pub message_id: String,
    pub created_thread: bool,
}

pub async fn post(store: &dyn ChatStore, message: &str, thread_id: Option<String>, user_id: &str) -> Result<Posted> {
    anyhow::ensure!(!message.trim().is_empty(), "--message must not be empty");

    let (thread_id, created_thread) = match thread_id.filter(|id| !id.is_empty()) {
        Some(id) => (id, false),
        None => {
            let id = format!("thread-{}", Utc::now().timestamp());
            store.create_thread(NewThread::new(user_id).with_id(id.clone())).await?;
            (id, true)
        }
    };

    let message_id = store.save_message(NewMessage::user(thread_id.clone(), message)).await?;

    Ok(Posted {
        thread_id,
        message_id,
        created_thread,
    })
}
