mod client;
mod tools;

pub use client::{NotionClient, NotionPage, TaskDatabase, NOTION_API_BASE, NOTION_VERSION};
pub use tools::{CreateNotionPageTool, QueryNotionDatabaseTool};
