use threadline_persist::{Message, MessageStatus};

/// Decides which stored message triggered an invocation.
///
/// Selection only decides whose status transitions the loop owns; every
/// message in the context window still reaches the model.
pub trait PendingMessageSelector: Send + Sync {
    fn select<'a>(&self, history: &'a [Message]) -> Option<&'a Message>;
}

/// Newest `user` message still `unread`, scanning from the end of the history
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusSelector;

impl PendingMessageSelector for StatusSelector {
    fn select<'a>(&self, history: &'a [Message]) -> Option<&'a Message> {
        history
            .iter()
            .rev()
            .find(|m| m.is_user() && m.has_status(MessageStatus::Unread))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use threadline_persist::MessageRole;

    fn msg(id: &str, role: MessageRole, status: Option<MessageStatus>) -> Message {
        Message {
            id: id.into(),
            thread_id: "t1".into(),
            role,
            content: id.into(),
            attachments: Vec::new(),
            ai_metadata: None,
            status,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn finds_single_unread_regardless_of_position() {
        for position in 0..4 {
            let mut history: Vec<Message> = (0..3)
                .map(|i| msg(&format!("done-{i}"), MessageRole::User, Some(MessageStatus::Completed)))
                .collect();
            history.insert(position, msg("target", MessageRole::User, Some(MessageStatus::Unread)));

            let picked = StatusSelector.select(&history).map(|m| m.id.as_str());
            assert_eq!(picked, Some("target"), "position {position}");
        }
    }

    #[test]
    fn picks_most_recent_of_several_unread() {
        let history = vec![
            msg("old", MessageRole::User, Some(MessageStatus::Unread)),
            msg("reply", MessageRole::Assistant, Some(MessageStatus::Completed)),
            msg("new", MessageRole::User, Some(MessageStatus::Unread)),
        ];
        assert_eq!(StatusSelector.select(&history).unwrap().id, "new");
    }

    #[test]
    fn ignores_assistant_and_legacy_messages() {
        let history = vec![
            msg("a", MessageRole::Assistant, Some(MessageStatus::Unread)),
            msg("legacy", MessageRole::User, None),
            msg("busy", MessageRole::User, Some(MessageStatus::Generating)),
        ];
        assert!(StatusSelector.select(&history).is_none());
    }

    #[test]
    fn empty_history_has_no_trigger() {
        assert!(StatusSelector.select(&[]).is_none());
    }
}
