//! MySQL connector and session.

use crate::error::SqlResult;
use crate::rows::mysql_row;
use crate::session::{Connector, JsonRow, SqlSession};
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use std::fmt;
use toolrelay_mcp::ConfigSource;
use tracing::{debug, error, info};

pub const HOST_VAR: &str = "MYSQL_HOST";
pub const PORT_VAR: &str = "MYSQL_PORT";
pub const USER_VAR: &str = "MYSQL_USER";
pub const PASSWORD_VAR: &str = "MYSQL_PASSWORD";
pub const DATABASE_VAR: &str = "MYSQL_DATABASE";

pub const DEFAULT_PORT: u16 = 3306;

#[derive(Clone)]
pub struct MySqlSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl MySqlSettings {
    pub fn from_source(source: &ConfigSource) -> SqlResult<Self> {
        let values = source.require(&[HOST_VAR, USER_VAR, DATABASE_VAR])?;
        let (host, user, database) = (values[0], values[1], values[2]);

        Ok(Self {
            host: host.to_string(),
            port: source.port_or(PORT_VAR, DEFAULT_PORT)?,
            user: user.to_string(),
            password: source.get(PASSWORD_VAR).unwrap_or_default().to_string(),
            database: database.to_string(),
        })
    }

    fn connect_options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
    }
}

impl fmt::Debug for MySqlSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MySqlSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("database", &self.database)
            .field(
                "password",
                &if self.password.is_empty() { "<unset>" } else { "***" },
            )
            .finish()
    }
}

/// Opens a single-connection pool from `MYSQL_*` settings.
pub struct MySqlConnector {
    source: ConfigSource,
}

impl MySqlConnector {
    pub fn new(source: ConfigSource) -> Self {
        Self { source }
    }
}

#[async_trait::async_trait]
impl Connector for MySqlConnector {
    async fn connect(&self) -> SqlResult<Box<dyn SqlSession>> {
        let settings = MySqlSettings::from_source(&self.source)?;

        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .connect_with(settings.connect_options())
            .await
            .map_err(|e| {
                error!(error = %e, settings = ?settings, "Failed to connect to MySQL");
                e
            })?;

        info!("Connected to MySQL: {}@{}", settings.database, settings.host);
        Ok(Box::new(MySqlSession {
            pool,
            database: settings.database,
        }))
    }
}

pub struct MySqlSession {
    pool: MySqlPool,
    database: String,
}

#[async_trait::async_trait]
impl SqlSession for MySqlSession {
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
        Ok(rows.iter().map(mysql_row).collect())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let source = ConfigSource::from_pairs([
            (HOST_VAR, "db.internal"),
            (USER_VAR, "reader"),
            (DATABASE_VAR, "shop"),
        ]);

        let settings = MySqlSettings::from_source(&source).unwrap();
        assert_eq!(settings.port, DEFAULT_PORT);
        assert_eq!(settings.password, "");
    }

    #[test]
    fn test_missing_settings_are_named() {
        let source = ConfigSource::from_pairs([(HOST_VAR, "db.internal")]);

        let err = MySqlSettings::from_source(&source).unwrap_err();
        assert_eq!(
            err.to_string(),
            "missing environment variables: MYSQL_USER, MYSQL_DATABASE"
        );
    }

    #[test]
    fn test_invalid_port() {
        let source = ConfigSource::from_pairs([
            (HOST_VAR, "db.internal"),
            (USER_VAR, "reader"),
            (DATABASE_VAR, "shop"),
            (PORT_VAR, "mysql"),
        ]);

        assert!(MySqlSettings::from_source(&source).is_err());
    }

    #[test]
    fn test_debug_masks_password() {
        let source = ConfigSource::from_pairs([
            (HOST_VAR, "db.internal"),
            (USER_VAR, "reader"),
            (DATABASE_VAR, "shop"),
            (PASSWORD_VAR, "hunter2"),
        ]);

        let rendered = format!("{:?}", MySqlSettings::from_source(&source).unwrap());
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("***"));
    }

    #[tokio::test]
    async fn test_connect_without_settings_fails_before_network() {
        let connector = MySqlConnector::new(ConfigSource::default());

        let err = connector.connect().await.err().unwrap();
        assert!(err.to_string().contains(HOST_VAR));
    }
}
