//! Read-only MySQL and PostgreSQL access exposed as MCP tools.
//!
//! Both adapters share the tool set, the read-only policy and the lazily
//! opened [`SessionHandle`]; a [`Dialect`] supplies the per-backend SQL.

pub mod dialect;
pub mod error;
pub mod mysql;
pub mod policy;
pub mod postgres;
pub mod rows;
pub mod server;
pub mod session;
pub mod tools;

pub use dialect::Dialect;
pub use error::{SqlError, SqlResult};
pub use session::{Connector, JsonRow, SessionHandle, SqlSession};
