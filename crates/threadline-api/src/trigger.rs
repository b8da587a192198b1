//! Trigger payloads and the decision of whether a notification runs the agent.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

use threadline_agent::AgentService;

/// Body of `POST /v1/agent/chat`. Schedulers may send an empty body.
#[derive(Debug, Default, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentChatRequest {
    #[serde(default)]
    pub thread_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TriggerResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
}

impl TriggerResponse {
    pub fn new(status: &str, thread_id: Option<&str>) -> Self {
        Self {
            status: status.to_string(),
            thread_id: thread_id.map(str::to_string),
        }
    }
}

/// Document change notification, either bare or wrapped in a `data` envelope
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ChangeNotification {
    Wrapped { data: DocumentEventData },
    Bare(DocumentEventData),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentEventData {
    #[serde(default)]
    pub value: Option<Document>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Document {
    /// Full document path, e.g. `projects/p/databases/(default)/documents/threads/T1/messages/M1`
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub fields: HashMap<String, FieldValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldValue {
    #[serde(default)]
    pub string_value: Option<String>,
}

impl ChangeNotification {
    pub fn document(&self) -> Option<&Document> {
        match self {
            Self::Wrapped { data } => data.value.as_ref(),
            Self::Bare(data) => data.value.as_ref(),
        }
    }
}

impl Document {
    /// `None` when the document has no role field at all
    pub fn role(&self) -> Option<&str> {
        self.fields
            .get("role")
            .map(|f| f.string_value.as_deref().unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookDecision {
    /// Path carries no thread id
    NotApplicable,
    /// Written by someone other than the user
    SkipRole(String),
    Dispatch(String),
}

pub fn classify(notification: &ChangeNotification) -> HookDecision {
    let Some(document) = notification.document() else {
        return HookDecision::NotApplicable;
    };
    let Some(thread_id) = extract_thread_id_from_path(&document.name) else {
        return HookDecision::NotApplicable;
    };
    match document.role() {
        Some(role) if role != "user" => HookDecision::SkipRole(role.to_string()),
        _ => HookDecision::Dispatch(thread_id.to_string()),
    }
}

/// The segment following the first `threads` component
pub fn extract_thread_id_from_path(path: &str) -> Option<&str> {
    let mut parts = path.split('/');
    parts.find(|part| *part == "threads")?;
    parts.next().filter(|id| !id.is_empty())
}

/// Run one agent turn detached from the request. The outcome is only
/// observable through logs and the trigger message status.
pub fn spawn_agent_turn(agent: AgentService, thread_id: String) {
    tokio::spawn(async move {
        match agent.chat(&thread_id).await {
            Ok(outcome) => tracing::info!(
                thread_id = %thread_id,
                reply_id = %outcome.reply_message_id,
                model_calls = outcome.model_calls,
                "Background agent turn finished"
            ),
            Err(e) => tracing::error!(
                thread_id = %thread_id,
                retriable = e.is_retriable(),
                error = %e,
                "Background agent turn failed"
            ),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> ChangeNotification {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_extract_thread_id() {
        assert_eq!(
            extract_thread_id_from_path("projects/p/databases/(default)/documents/threads/T1/messages/M1"),
            Some("T1")
        );
        assert_eq!(extract_thread_id_from_path("threads/abc"), Some("abc"));
        assert_eq!(extract_thread_id_from_path("users/u1/profile"), None);
        assert_eq!(extract_thread_id_from_path("documents/threads"), None);
        assert_eq!(extract_thread_id_from_path("documents/threads//messages"), None);
        assert_eq!(extract_thread_id_from_path(""), None);
    }

    #[test]
    fn test_bare_and_wrapped_payloads() {
        let bare = parse(json!({
            "value": {"name": "documents/threads/T1/messages/M1", "fields": {"role": {"stringValue": "user"}}}
        }));
        let wrapped = parse(json!({
            "data": {"value": {"name": "documents/threads/T2/messages/M1"}}
        }));

        assert_eq!(classify(&bare), HookDecision::Dispatch("T1".to_string()));
        assert_eq!(classify(&wrapped), HookDecision::Dispatch("T2".to_string()));
    }

    #[test]
    fn test_non_user_role_is_skipped() {
        let notification = parse(json!({
            "value": {"name": "documents/threads/T1/messages/M2", "fields": {"role": {"stringValue": "assistant"}}}
        }));

        assert_eq!(classify(&notification), HookDecision::SkipRole("assistant".to_string()));
    }

    #[test]
    fn test_unrelated_documents_are_not_applicable() {
        assert_eq!(classify(&parse(json!({}))), HookDecision::NotApplicable);
        assert_eq!(
            classify(&parse(json!({"value": {"name": "documents/users/u1"}}))),
            HookDecision::NotApplicable
        );
    }

    #[test]
    fn test_chat_request_accepts_missing_thread_id() {
        let req: AgentChatRequest = serde_json::from_value(json!({})).unwrap();
        assert!(req.thread_id.is_empty());

        let req: AgentChatRequest = serde_json::from_value(json!({"threadId": "T1"})).unwrap();
        assert_eq!(req.thread_id, "T1");
    }
}
