// Provider selection for the chat client. Both providers speak the
// chat completions wire format, so the factory only differs in base URL.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::openai::{OpenAIClient, OPENAI_API_BASE};
use crate::traits::ChatClient;

/// OpenAI-compatible endpoint exposed by the Gemini API
pub const GEMINI_OPENAI_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    #[default]
    OpenAI,
    Gemini,
}

impl std::str::FromStr for ProviderType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "gemini" | "google" => Ok(Self::Gemini),
            other => anyhow::bail!("Unknown LLM provider: {}", other),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub provider: ProviderType,
    pub api_key: String,
    /// Overrides the provider's default endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl ProviderConfig {
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self {
            provider: ProviderType::OpenAI,
            api_key: api_key.into(),
            base_url: None,
        }
    }

    pub fn gemini(api_key: impl Into<String>) -> Self {
        Self {
            provider: ProviderType::Gemini,
            api_key: api_key.into(),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn resolved_base_url(&self) -> &str {
        match (&self.base_url, self.provider) {
            (Some(url), _) => url,
            (None, ProviderType::OpenAI) => OPENAI_API_BASE,
            (None, ProviderType::Gemini) => GEMINI_OPENAI_BASE,
        }
    }
}

/// Builds chat clients from provider configuration
pub struct ClientFactory;

impl ClientFactory {
    pub fn create_client(config: &ProviderConfig) -> Result<Arc<dyn ChatClient>> {
        if config.api_key.trim().is_empty() {
            anyhow::bail!("Missing API key for provider {:?}", config.provider);
        }
        let client = OpenAIClient::with_base_url(config.api_key.clone(), config.resolved_base_url())?;
        tracing::info!(provider = ?config.provider, base_url = %client.base_url(), "Chat client created");
        Ok(Arc::new(client))
    }
}
