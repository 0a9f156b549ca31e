//! PostgreSQL connector and session.

use crate::error::SqlResult;
use crate::rows::pg_row;
use crate::session::{Connector, JsonRow, SqlSession};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgSslMode};
use std::fmt;
use toolrelay_mcp::ConfigSource;
use tracing::{debug, error, info};

pub const HOST_VAR: &str = "POSTGRES_HOST";
pub const PORT_VAR: &str = "POSTGRES_PORT";
pub const USER_VAR: &str = "POSTGRES_USER";
pub const PASSWORD_VAR: &str = "POSTGRES_PASSWORD";
pub const DATABASE_VAR: &str = "POSTGRES_DATABASE";
pub const SSL_VAR: &str = "POSTGRES_SSL";

pub const DEFAULT_PORT: u16 = 5432;

#[derive(Clone)]
pub struct PgSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    /// TLS is required but the server certificate is not verified.
    pub ssl: bool,
}

impl PgSettings {
    pub fn from_source(source: &ConfigSource) -> SqlResult<Self> {
        let values = source.require(&[HOST_VAR, USER_VAR, DATABASE_VAR])?;
        let (host, user, database) = (values[0], values[1], values[2]);

        Ok(Self {
            host: host.to_string(),
            port: source.port_or(PORT_VAR, DEFAULT_PORT)?,
            user: user.to_string(),
            password: source.get(PASSWORD_VAR).unwrap_or_default().to_string(),
            database: database.to_string(),
            ssl: source.flag(SSL_VAR),
        })
    }

    fn connect_options(&self) -> PgConnectOptions {
        let options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .database(&self.database)
            .ssl_mode(if self.ssl {
                PgSslMode::Require
            } else {
                PgSslMode::Disable
            });

        if self.password.is_empty() {
            options
        } else {
            options.password(&self.password)
        }
    }
}

impl fmt::Debug for PgSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("database", &self.database)
            .field("ssl", &self.ssl)
            .field(
                "password",
                &if self.password.is_empty() { "<unset>" } else { "***" },
            )
            .finish()
    }
}

/// Opens a single-connection pool from `POSTGRES_*` settings.
pub struct PgConnector {
    source: ConfigSource,
}

impl PgConnector {
    pub fn new(source: ConfigSource) -> Self {
        Self { source }
    }
}

#[async_trait::async_trait]
impl Connector for PgConnector {
    async fn connect(&self) -> SqlResult<Box<dyn SqlSession>> {
        let settings = PgSettings::from_source(&self.source)?;

        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect_with(settings.connect_options())
            .await
            .map_err(|e| {
                error!(error = %e, settings = ?settings, "Failed to connect to PostgreSQL");
                e
            })?;

        info!(
            "Connected to PostgreSQL: {}@{}",
            settings.database, settings.host
        );
        Ok(Box::new(PgSession {
            pool,
            database: settings.database,
        }))
    }
}

pub struct PgSession {
    pool: PgPool,
    database: String,
}

#[async_trait::async_trait]
impl SqlSession for PgSession {
    fn database(&self) -> &str {
        &self.database
    }

    async fn fetch_all(&self, sql: &str, params: &[&str]) -> SqlResult<Vec<JsonRow>> {
        debug!(sql, "Executing statement");
        let mut query = sqlx::query(sql);
        for param in params {
            query = query.bind(param.to_string());
        }
        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.iter().map(pg_row).collect())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Vec<(&'static str, &'static str)> {
        vec![
            (HOST_VAR, "db.internal"),
            (USER_VAR, "reader"),
            (DATABASE_VAR, "analytics"),
        ]
    }

    #[test]
    fn test_defaults() {
        let settings = PgSettings::from_source(&ConfigSource::from_pairs(base())).unwrap();
        assert_eq!(settings.port, DEFAULT_PORT);
        assert!(!settings.ssl);
    }

    #[test]
    fn test_ssl_flag_is_literal_true() {
        let mut pairs = base();
        pairs.push((SSL_VAR, "true"));
        assert!(PgSettings::from_source(&ConfigSource::from_pairs(pairs)).unwrap().ssl);

        let mut pairs = base();
        pairs.push((SSL_VAR, "1"));
        assert!(!PgSettings::from_source(&ConfigSource::from_pairs(pairs)).unwrap().ssl);
    }

    #[test]
    fn test_port_override() {
        let mut pairs = base();
        pairs.push((PORT_VAR, "6432"));
        let settings = PgSettings::from_source(&ConfigSource::from_pairs(pairs)).unwrap();
        assert_eq!(settings.port, 6432);
    }

    #[test]
    fn test_missing_settings_are_named() {
        let err = PgSettings::from_source(&ConfigSource::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "missing environment variables: POSTGRES_HOST, POSTGRES_USER, POSTGRES_DATABASE"
        );
    }

    #[test]
    fn test_debug_masks_password() {
        let mut pairs = base();
        pairs.push((PASSWORD_VAR, "hunter2"));
        let settings = PgSettings::from_source(&ConfigSource::from_pairs(pairs)).unwrap();

        let rendered = format!("{:?}", settings);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("***"));
    }
}
