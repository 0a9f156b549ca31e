//! Jira Cloud adapter: worklogs, JQL search, issues, comments and
//! workflow transitions exposed as MCP tools.

pub mod client;
pub mod config;
pub mod document;
pub mod error;
pub mod model;
pub mod started;
pub mod tools;

pub use client::{JiraClient, JiraConnection};
pub use config::JiraSettings;
pub use error::{JiraError, JiraResult};
pub use tools::register_all;
