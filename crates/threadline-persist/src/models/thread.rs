use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PersistError, Result};

/// Conversation container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub first_message: String,
    #[serde(default)]
    pub reply_count: u32,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<ThreadMemory>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Thread {
    pub fn summary(&self) -> Option<&str> {
        self.memory
            .as_ref()
            .map(|m| m.summary.as_str())
            .filter(|s| !s.trim().is_empty())
    }

    pub fn memorized_until(&self) -> Option<DateTime<Utc>> {
        self.memory.as_ref().map(|m| m.memorized_until)
    }
}

/// Rolling summary of everything up to `memorized_until`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadMemory {
    pub summary: String,
    pub memorized_until: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewThread {
    pub user_id: String,
    pub is_private: bool,
    /// Caller-chosen id; generated when absent
    pub id: Option<String>,
}

impl NewThread {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn private(mut self, is_private: bool) -> Self {
        self.is_private = is_private;
        self
    }
}

/// Watermarks never move backwards and never pass the current time.
pub fn validate_watermark(
    current: Option<DateTime<Utc>>,
    next: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<()> {
    if next > now {
        return Err(PersistError::InvalidWatermark(format!(
            "{} is in the future",
            next.to_rfc3339()
        )));
    }
    if let Some(current) = current {
        if next < current {
            return Err(PersistError::InvalidWatermark(format!(
                "{} is before the current watermark {}",
                next.to_rfc3339(),
                current.to_rfc3339()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn watermark_must_not_move_backwards() {
        let now = Utc::now();
        let current = now - Duration::minutes(5);
        assert!(validate_watermark(Some(current), current, now).is_ok());
        assert!(validate_watermark(Some(current), now, now).is_ok());
        assert!(matches!(
            validate_watermark(Some(current), current - Duration::seconds(1), now),
            Err(PersistError::InvalidWatermark(_))
        ));
    }

    #[test]
    fn watermark_must_not_be_in_the_future() {
        let now = Utc::now();
        assert!(validate_watermark(None, now + Duration::seconds(1), now).is_err());
    }

    #[test]
    fn blank_summary_is_treated_as_absent() {
        let now = Utc::now();
        let mut thread = Thread {
            id: "t".into(),
            user_id: "u".into(),
            first_message: String::new(),
            reply_count: 0,
            is_private: false,
            is_archived: false,
            memory: Some(ThreadMemory { summary: "  ".into(), memorized_until: now }),
            created_at: now,
            updated_at: now,
        };
        assert_eq!(thread.summary(), None);
        assert_eq!(thread.memorized_until(), Some(now));

        thread.memory = None;
        assert_eq!(thread.memorized_until(), None);
    }
}
