use chrono::FixedOffset;
use config::{Config as ConfigLoader, ConfigBuilder, ConfigError, File};
use config::builder::DefaultState;
use serde::Deserialize;
use std::path::Path;

use threadline_agent::AgentConfig;
use threadline_llm::{ProviderConfig, ProviderType};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    #[serde(default)]
    pub agent: AgentSection,
    #[serde(default)]
    pub tools: ToolsConfig,
    pub mongodb: MongoDbConfig,
    #[serde(default)]
    pub trigger: TriggerConfig,
    pub logging: LoggingConfig,

    // Secrets (from ENV only)
    #[serde(default)]
    pub mongodb_uri: Option<String>,
    #[serde(default)]
    pub llm_api_key: Option<String>,
    #[serde(default)]
    pub notion_token: Option<String>,
    #[serde(default)]
    pub google_calendar_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    120
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: ProviderType,
    pub model: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentSection {
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,
    #[serde(default)]
    pub fallback_reply: Option<String>,
    #[serde(default)]
    pub system_prompt: Option<String>,
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
            fallback_reply: None,
            system_prompt: None,
        }
    }
}

fn default_max_turns() -> usize {
    threadline_agent::config::DEFAULT_MAX_TURNS
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToolsConfig {
    #[serde(default = "default_tool_sets")]
    pub enabled: Vec<String>,
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,
    /// Offset used when a tool call names a timezone we cannot resolve
    #[serde(default = "default_utc_offset_minutes")]
    pub default_utc_offset_minutes: i32,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            enabled: default_tool_sets(),
            calendar_id: default_calendar_id(),
            default_utc_offset_minutes: default_utc_offset_minutes(),
        }
    }
}

impl ToolsConfig {
    pub fn is_enabled(&self, set: &str) -> bool {
        self.enabled.iter().any(|s| s == set)
    }

    pub fn default_offset(&self) -> Result<FixedOffset, ConfigError> {
        FixedOffset::east_opt(self.default_utc_offset_minutes * 60).ok_or_else(|| {
            ConfigError::Message(format!(
                "tools.default_utc_offset_minutes out of range: {}",
                self.default_utc_offset_minutes
            ))
        })
    }
}

fn default_tool_sets() -> Vec<String> {
    threadline_tools::factory::DEFAULT_TOOL_SETS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_calendar_id() -> String {
    "primary".to_string()
}

fn default_utc_offset_minutes() -> i32 {
    9 * 60
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoDbConfig {
    pub database: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TriggerConfig {
    #[serde(default)]
    pub dispatch: DispatchMode,
}

/// How the change-notification hook runs the agent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// Run the turn inside the request
    #[default]
    Inline,
    /// Detach the turn and acknowledge with 202
    Background,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

/// Environment variables that override single keys of the file config
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("SERVER_HOST", "server.host"),
    ("SERVER_PORT", "server.port"),
    ("PORT", "server.port"),
    ("SERVER_REQUEST_TIMEOUT_SECS", "server.request_timeout_secs"),
    ("LLM_PROVIDER", "llm.provider"),
    ("LLM_MODEL", "llm.model"),
    ("LLM_BASE_URL", "llm.base_url"),
    ("LLM_TEMPERATURE", "llm.temperature"),
    ("LLM_MAX_TOKENS", "llm.max_tokens"),
    ("AGENT_MAX_TURNS", "agent.max_turns"),
    ("AGENT_FALLBACK_REPLY", "agent.fallback_reply"),
    ("AGENT_SYSTEM_PROMPT", "agent.system_prompt"),
    ("TOOLS_CALENDAR_ID", "tools.calendar_id"),
    ("TOOLS_DEFAULT_UTC_OFFSET_MINUTES", "tools.default_utc_offset_minutes"),
    ("MONGODB_DATABASE", "mongodb.database"),
    ("TRIGGER_DISPATCH", "trigger.dispatch"),
    ("LOG_LEVEL", "logging.level"),
    ("LOG_FORMAT", "logging.format"),
];

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. Environment variables (SERVER_, LLM_, AGENT_, MONGODB_, LOG_, TRIGGER_ prefixes)
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());
        let dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

        let builder = ConfigLoader::builder()
            .add_source(File::with_name(&format!("{}/default", dir)).required(false))
            .add_source(File::with_name(&format!("{}/{}", dir, env)).required(false));

        let mut cfg: Config = apply_env_overrides(builder)?.build()?.try_deserialize()?;

        if let Ok(enabled) = std::env::var("TOOLS_ENABLED") {
            cfg.tools.enabled = enabled
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Secrets are never read from files
        cfg.mongodb_uri = secret("MONGODB_URI");
        cfg.llm_api_key = secret("LLM_API_KEY");
        cfg.notion_token = secret("NOTION_TOKEN");
        cfg.google_calendar_token = secret("GOOGLE_CALENDAR_TOKEN");

        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = ConfigLoader::builder().add_source(File::from(path.as_ref()));

        let config = builder.build()?;
        config.try_deserialize()
    }

    pub fn require_mongodb_uri(&self) -> Result<&str, ConfigError> {
        required(&self.mongodb_uri, "MONGODB_URI")
    }

    pub fn provider_config(&self) -> Result<ProviderConfig, ConfigError> {
        let api_key = required(&self.llm_api_key, "LLM_API_KEY")?;
        let provider = ProviderConfig {
            provider: self.llm.provider,
            api_key: api_key.to_string(),
            base_url: None,
        };
        Ok(match &self.llm.base_url {
            Some(url) if !url.is_empty() => provider.with_base_url(url.clone()),
            _ => provider,
        })
    }

    pub fn agent_config(&self) -> AgentConfig {
        let mut agent = AgentConfig::new(self.llm.model.clone()).with_max_turns(self.agent.max_turns);
        if let Some(temperature) = self.llm.temperature {
            agent = agent.with_temperature(temperature);
        }
        if let Some(max_tokens) = self.llm.max_tokens {
            agent = agent.with_max_tokens(max_tokens);
        }
        if let Some(prompt) = self.agent.system_prompt.as_deref().filter(|p| !p.trim().is_empty()) {
            agent = agent.with_system_prompt(prompt);
        }
        if let Some(reply) = self.agent.fallback_reply.as_deref().filter(|r| !r.trim().is_empty()) {
            agent = agent.with_fallback_reply(reply);
        }
        agent
    }
}

fn apply_env_overrides(
    mut builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    for (var, key) in ENV_OVERRIDES {
        if let Ok(value) = std::env::var(var) {
            builder = builder.set_override(*key, value)?;
        }
    }
    Ok(builder)
}

fn secret(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, ConfigError> {
    value
        .as_deref()
        .ok_or_else(|| ConfigError::Message(format!("{} environment variable is required", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [server]
        host = "127.0.0.1"
        port = 8081

        [llm]
        provider = "gemini"
        model = "gemini-2.0-flash"

        [mongodb]
        database = "threadline"

        [logging]
        level = "debug"
        format = "json"
    "#;

    #[test]
    fn test_config_structure() {
        let config: Config = toml::from_str(MINIMAL).unwrap();

        assert_eq!(config.server.port, 8081);
        assert_eq!(config.server.request_timeout_secs, 120);
        assert_eq!(config.llm.provider, ProviderType::Gemini);
        assert_eq!(config.agent.max_turns, 5);
        assert_eq!(config.tools.enabled, vec!["notion".to_string()]);
        assert_eq!(config.trigger.dispatch, DispatchMode::Inline);
        assert!(config.mongodb_uri.is_none());
    }

    #[test]
    fn test_agent_config_overrides() {
        let toml = format!(
            "{}\n[agent]\nmax_turns = 3\nfallback_reply = \"sorry\"\n\n[trigger]\ndispatch = \"background\"\n",
            MINIMAL
        );
        let config: Config = toml::from_str(&toml).unwrap();
        let agent = config.agent_config();

        assert_eq!(agent.model, "gemini-2.0-flash");
        assert_eq!(agent.max_turns, 3);
        assert_eq!(agent.fallback_reply, "sorry");
        assert_eq!(agent.system_prompt, threadline_agent::config::DEFAULT_SYSTEM_PROMPT);
        assert_eq!(config.trigger.dispatch, DispatchMode::Background);
    }

    #[test]
    fn test_missing_secrets_are_reported() {
        let config: Config = toml::from_str(MINIMAL).unwrap();

        let err = config.provider_config().unwrap_err();
        assert!(err.to_string().contains("LLM_API_KEY"));
        assert!(config.require_mongodb_uri().is_err());
    }

    #[test]
    fn test_provider_config_uses_base_url() {
        let mut config: Config = toml::from_str(MINIMAL).unwrap();
        config.llm_api_key = Some("key".to_string());
        config.llm.base_url = Some("http://localhost:9000/v1".to_string());

        let provider = config.provider_config().unwrap();
        assert_eq!(provider.resolved_base_url(), "http://localhost:9000/v1");
    }

    #[test]
    fn test_default_offset_is_validated() {
        let mut tools = ToolsConfig::default();
        assert_eq!(tools.default_offset().unwrap().local_minus_utc(), 9 * 3600);

        tools.default_utc_offset_minutes = 24 * 60;
        assert!(tools.default_offset().is_err());
    }
}
