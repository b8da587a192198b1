use anyhow::{anyhow, Result};
use std::sync::Arc;

use threadline_llm::ChatClient;
use threadline_persist::ChatStore;
use threadline_tools::ToolRegistry;

use crate::config::AgentConfig;
use crate::pending::{PendingMessageSelector, StatusSelector};
use crate::service::AgentService;

/// Builder for an `AgentService`
pub struct AgentServiceBuilder {
    store: Option<Arc<dyn ChatStore>>,
    client: Option<Arc<dyn ChatClient>>,
    tools: ToolRegistry,
    selector: Arc<dyn PendingMessageSelector>,
    config: AgentConfig,
}

impl AgentServiceBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            client: None,
            tools: ToolRegistry::new(),
            selector: Arc::new(StatusSelector),
            config: AgentConfig::default(),
        }
    }

    pub fn store(mut self, store: Arc<dyn ChatStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn client(mut self, client: Arc<dyn ChatClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn selector(mut self, selector: Arc<dyn PendingMessageSelector>) -> Self {
        self.selector = selector;
        self
    }

    pub fn config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<AgentService> {
        let store = self.store.ok_or_else(|| anyhow!("Chat store is required"))?;
        let client = self.client.ok_or_else(|| anyhow!("Chat client is required"))?;
        if self.config.max_turns == 0 {
            return Err(anyhow!("max_turns must be at least 1"));
        }

        Ok(AgentService {
            store,
            client,
            tools: Arc::new(self.tools),
            selector: self.selector,
            config: Arc::new(self.config),
        })
    }
}

impl Default for AgentServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}
