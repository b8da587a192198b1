pub mod bootstrap;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod telemetry;
pub mod trigger;

pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use routes::build_router;
pub use state::AppState;
