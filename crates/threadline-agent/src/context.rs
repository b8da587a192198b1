//! Maps thread memory and stored history to the turn sequence sent to the model.

use threadline_llm::Message as Turn;
use threadline_persist::{Message, MessageRole};

pub const SUMMARY_HEADER: &str = "[Prior summary]";

/// One system turn followed by one turn per message, `user` to user and
/// anything else to assistant. Content is passed through untouched.
///
/// Pure: the same inputs always produce the same turns.
pub fn build_turns(summary: Option<&str>, messages: &[Message], base_instructions: &str) -> Vec<Turn> {
    let mut turns = Vec::with_capacity(messages.len() + 1);
    turns.push(Turn::system(system_prompt(summary, base_instructions)));

    turns.extend(messages.iter().map(|msg| match msg.role {
        MessageRole::User => Turn::human(msg.content.clone()),
        _ => Turn::ai(msg.content.clone()),
    }));

    turns
}

fn system_prompt(summary: Option<&str>, base_instructions: &str) -> String {
    match summary.filter(|s| !s.is_empty()) {
        Some(summary) => format!("{}\n{}\n\n{}", SUMMARY_HEADER, summary, base_instructions),
        None => base_instructions.to_string(),
    }
}
