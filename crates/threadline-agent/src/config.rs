use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_TURNS: usize = 5;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

pub const DEFAULT_SYSTEM_PROMPT: &str = "あなたは業務自動化アシスタントです。
ユーザーの業務を支援するために、次のツールを利用できます。
- Notion データベース（タスクの検索と登録）
- カレンダー（予定の確認）

必要なときだけツールを使い、結果をもとに回答してください。
回答は日本語で、簡潔に。";

/// Reply saved when the turn budget runs out without a final answer
pub const DEFAULT_FALLBACK_REPLY: &str = "申し訳ありません、処理を完了できませんでした (Max turns reached).";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub model: String,
    /// Upper bound on model calls per invocation
    pub max_turns: usize,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub system_prompt: String,
    pub fallback_reply: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_turns: DEFAULT_MAX_TURNS,
            temperature: None,
            max_tokens: None,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            fallback_reply: DEFAULT_FALLBACK_REPLY.to_string(),
        }
    }
}

impl AgentConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_fallback_reply(mut self, reply: impl Into<String>) -> Self {
        self.fallback_reply = reply.into();
        self
    }
}
