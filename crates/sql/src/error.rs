//! Error types for the database adapters.

use toolrelay_mcp::ConfigError;

pub type SqlResult<T> = Result<T, SqlError>;

#[derive(Debug, thiserror::Error)]
pub enum SqlError {
    /// Connection settings are absent or malformed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The statement was refused before reaching the database.
    #[error("{0}")]
    Policy(String),

    /// Connecting or executing failed on the database side.
    #[error("{0}")]
    Database(#[from] sqlx::Error),
}
