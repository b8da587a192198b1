use anyhow::Result;

use threadline_api::{bootstrap, Config};
use threadline_persist::{ChatStore, Message, MessageStatus};

pub async fn run(config: &Config, thread_id: &str) -> Result<()> {
    let store = bootstrap::connect_store(config).await?;
    let messages = store.get_messages(thread_id).await?;

    println!("--- Conversation History for {} ---", thread_id);
    for msg in &messages {
        println!("{}", format_line(msg));
    }
    println!("---------------------------------------");
    Ok(())
}

/// `[HH:MM:SS] role (status) ID:<id> : content`
pub fn format_line(msg: &Message) -> String {
    format!(
        "[{}] {} ({}) ID:{} : {}",
        msg.created_at.format("%H:%M:%S"),
        msg.role,
        msg.status.as_ref().map(MessageStatus::as_str).unwrap_or(""),
        msg.id,
        msg.content
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use threadline_persist::MessageRole;

    #[test]
    fn test_format_line() {
        let msg = Message {
            id: "m1".to_string(),
            thread_id: "T1".to_string(),
            role: MessageRole::User,
            content: "hello".to_string(),
            attachments: vec![],
            ai_metadata: None,
            status: Some(MessageStatus::Unread),
            created_at: Utc.with_ymd_and_hms(2025, 12, 20, 5, 0, 7).unwrap(),
        };

        assert_eq!(format_line(&msg), "[05:00:07] user (unread) ID:m1 : hello");

        let legacy = Message { status: None, ..msg };
        assert_eq!(format_line(&legacy), "[05:00:07] user () ID:m1 : hello");
    }
}
