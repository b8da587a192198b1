use threadline_llm::{Message, Tool, ToolCall, ToolChoice, ToolResponse};
use serde_json::json;

#[test]
fn test_message_roles() {
    assert_eq!(Message::system("You are helpful").role(), "system");
    assert_eq!(Message::human("Hello").role(), "user");
    assert_eq!(Message::ai("Hi there!").role(), "assistant");
    assert_eq!(Message::tool_results(vec![]).role(), "tool");
}

#[test]
fn test_message_text() {
    assert_eq!(Message::human("Hello").text(), Some("Hello"));
    assert_eq!(Message::ai_with_tools(None, vec![]).text(), None);
    assert_eq!(
        Message::tool_results(vec![ToolResponse::new("c", "t", "out")]).text(),
        None
    );
}

#[test]
fn test_message_serialization_human() {
    let json = serde_json::to_string(&Message::human("Hello")).unwrap();
    assert!(json.contains("\"role\":\"user\""));
    assert!(json.contains("Hello"));
}

#[test]
fn test_ai_message_without_tool_calls_omits_field() {
    let json = serde_json::to_value(Message::ai("Response")).unwrap();
    assert_eq!(json["role"], "assistant");
    assert!(json.get("tool_calls").is_none());
}

#[test]
fn test_message_deserialization() {
    let msg: Message = serde_json::from_str(r#"{"role":"assistant","content":"Test"}"#).unwrap();
    assert_eq!(msg, Message::ai("Test"));
}

#[test]
fn test_tool_creation() {
    let tool = Tool::new(
        "query_notion_database",
        "Query a Notion database",
        json!({
            "type": "object",
            "properties": {"database_id": {"type": "string"}},
            "required": ["database_id"]
        }),
    );

    assert_eq!(tool.name(), "query_notion_database");
    assert_eq!(tool.tool_type, "function");
    assert!(tool.function.description.is_some());
}

#[test]
fn test_tool_choice_serialization() {
    assert_eq!(serde_json::to_value(ToolChoice::Auto).unwrap(), "auto");
    assert_eq!(serde_json::to_value(ToolChoice::None).unwrap(), "none");
    assert_eq!(serde_json::to_value(ToolChoice::Required).unwrap(), "required");
}

#[test]
fn test_tool_call_arguments_value() {
    let call = ToolCall::new("call_123", "get_calendar", json!({"time_range": "today"}));
    assert_eq!(call.name(), "get_calendar");
    assert_eq!(call.arguments_value().unwrap()["time_range"], "today");
}

#[test]
fn test_tool_call_empty_arguments_is_empty_object() {
    let mut call = ToolCall::new("call_1", "get_calendar", json!({}));
    call.function.arguments = String::new();
    assert_eq!(call.arguments_value().unwrap(), json!({}));
}

#[test]
fn test_tool_call_malformed_arguments() {
    let mut call = ToolCall::new("call_1", "get_calendar", json!({}));
    call.function.arguments = "{not json".to_string();
    assert!(call.arguments_value().is_err());
}
