use std::sync::Arc;

use threadline_agent::AgentService;
use threadline_persist::ChatStore;

use crate::config::Config;

/// Shared application state passed to all handlers
///
/// The agent service is stateless between invocations and built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn ChatStore>,
    pub agent: AgentService,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn ChatStore>, agent: AgentService) -> Self {
        Self {
            config: Arc::new(config),
            store,
            agent,
        }
    }
}
