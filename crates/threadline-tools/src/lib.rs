pub mod error;
pub mod tool;
pub mod notion;
pub mod calendar;
pub mod factory;

pub use error::ToolError;
pub use tool::{Tool, ToolCallRecord, ToolRegistry};
pub use notion::{CreateNotionPageTool, NotionClient, NotionPage, QueryNotionDatabaseTool, TaskDatabase};
pub use calendar::{CalendarEvent, CalendarSource, EventStart, EventWindow, GetCalendarTool, GoogleCalendarClient, TimeRange};
pub use factory::ToolFactory;
