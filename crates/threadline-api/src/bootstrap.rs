//! Wiring shared by the server and the CLI.

use anyhow::{Context, Result};
use std::sync::Arc;

use threadline_agent::{AgentService, MemoryCompactor};
use threadline_llm::{ChatClient, ClientFactory};
use threadline_persist::{ChatStore, MongoChatStore};
use threadline_tools::{GoogleCalendarClient, NotionClient, ToolFactory, ToolRegistry};

use crate::config::Config;
use crate::state::AppState;

pub async fn connect_store(config: &Config) -> Result<Arc<dyn ChatStore>> {
    let uri = config.require_mongodb_uri()?;
    tracing::info!(database = %config.mongodb.database, "Connecting to MongoDB");
    let store = MongoChatStore::connect(uri, &config.mongodb.database)
        .await
        .context("Failed to connect to MongoDB")?;
    Ok(Arc::new(store))
}

pub fn chat_client(config: &Config) -> Result<Arc<dyn ChatClient>> {
    let provider = config.provider_config()?;
    tracing::info!(provider = ?provider.provider, model = %config.llm.model, "Initializing LLM client");
    ClientFactory::create_client(&provider)
}

/// Registry for `tools.enabled`. A set without its token is a startup error.
pub fn tool_registry(config: &Config) -> Result<ToolRegistry> {
    let mut factory = ToolFactory::new(config.tools.default_offset()?);

    if config.tools.is_enabled("notion") {
        let token = config
            .notion_token
            .as_deref()
            .context("NOTION_TOKEN environment variable is required when the notion tool set is enabled")?;
        factory = factory.with_task_database(Arc::new(NotionClient::new(token)?));
    }
    if config.tools.is_enabled("calendar") {
        let token = config
            .google_calendar_token
            .as_deref()
            .context("GOOGLE_CALENDAR_TOKEN environment variable is required when the calendar tool set is enabled")?;
        factory = factory.with_calendar(Arc::new(GoogleCalendarClient::new(
            token,
            config.tools.calendar_id.clone(),
        )?));
    }

    let registry = factory.create_tools(&config.tools.enabled)?;
    tracing::info!(tools = ?registry.names(), "Tools registered");
    Ok(registry)
}

pub fn agent_service(
    config: &Config,
    store: Arc<dyn ChatStore>,
    client: Arc<dyn ChatClient>,
    tools: ToolRegistry,
) -> Result<AgentService> {
    AgentService::builder()
        .store(store)
        .client(client)
        .tools(tools)
        .config(config.agent_config())
        .build()
}

pub fn memory_compactor(config: &Config, store: Arc<dyn ChatStore>, client: Arc<dyn ChatClient>) -> MemoryCompactor {
    MemoryCompactor::new(store, client, config.llm.model.clone())
}

/// Everything the server needs, connected and ready
pub async fn build_state(config: Config) -> Result<Arc<AppState>> {
    let store = connect_store(&config).await?;
    let client = chat_client(&config)?;
    let tools = tool_registry(&config)?;
    let agent = agent_service(&config, store.clone(), client, tools)?;

    Ok(Arc::new(AppState::new(config, store, agent)))
}
