//! The database session shared by every tool of one adapter.

use crate::dialect::Dialect;
use crate::error::SqlResult;
use serde_json::{Map, Value};
use tokio::sync::OnceCell;
use tracing::info;

/// One result row, columns in select-list order.
pub type JsonRow = Map<String, Value>;

/// An open session against one database.
#[async_trait::async_trait]
pub trait SqlSession: Send + Sync {
    /// The database the session is connected to.
    fn database(&self) -> &str;

    /// Run one prepared statement with positional text parameters.
    async fn fetch_all(&self, sql: &str, params: &[&str]) -> SqlResult<Vec<JsonRow>>;

    /// Best-effort close; errors are not reported.
    async fn close(&self);
}

/// Opens a session from the adapter's configuration.
#[async_trait::async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> SqlResult<Box<dyn SqlSession>>;
}

/// Lazily-opened session, established on the first tool call that needs it
/// and reused for the rest of the process.
///
/// A failed attempt leaves the handle empty, so the next call retries.
pub struct SessionHandle {
    dialect: Dialect,
    connector: Box<dyn Connector>,
    session: OnceCell<Box<dyn SqlSession>>,
}

impl SessionHandle {
    pub fn new(dialect: Dialect, connector: impl Connector + 'static) -> Self {
        Self {
            dialect,
            connector: Box::new(connector),
            session: OnceCell::new(),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub async fn session(&self) -> SqlResult<&dyn SqlSession> {
        let session = self
            .session
            .get_or_try_init(|| self.connector.connect())
            .await?;
        Ok(session.as_ref())
    }

    pub fn is_connected(&self) -> bool {
        self.session.initialized()
    }

    /// Close the session if one was opened.
    pub async fn close(&self) {
        if let Some(session) = self.session.get() {
            info!(database = session.database(), "Disconnecting");
            session.close().await;
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::error::SqlError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Statements seen by a [`FakeConnector`]'s sessions.
    #[derive(Debug, Default)]
    pub struct Recorder {
        pub connects: AtomicUsize,
        pub closes: AtomicUsize,
        pub statements: Mutex<Vec<(String, Vec<String>)>>,
    }

    impl Recorder {
        pub fn statements(&self) -> Vec<(String, Vec<String>)> {
            self.statements.lock().unwrap().clone()
        }

        pub fn connects(&self) -> usize {
            self.connects.load(Ordering::SeqCst)
        }
    }

    /// Answers every statement with the queued results in order; once the
    /// queue is drained each statement yields no rows.
    pub struct FakeConnector {
        pub recorder: Arc<Recorder>,
        pub results: Arc<Mutex<Vec<SqlResult<Vec<JsonRow>>>>>,
        pub fail_connect: bool,
    }

    impl FakeConnector {
        pub fn new(results: Vec<SqlResult<Vec<JsonRow>>>) -> (Self, Arc<Recorder>) {
            let recorder = Arc::new(Recorder::default());
            let connector = Self {
                recorder: recorder.clone(),
                results: Arc::new(Mutex::new(results)),
                fail_connect: false,
            };
            (connector, recorder)
        }

        pub fn failing() -> (Self, Arc<Recorder>) {
            let (mut connector, recorder) = Self::new(Vec::new());
            connector.fail_connect = true;
            (connector, recorder)
        }
    }

    #[async_trait::async_trait]
    impl Connector for FakeConnector {
        async fn connect(&self) -> SqlResult<Box<dyn SqlSession>> {
            self.recorder.connects.fetch_add(1, Ordering::SeqCst);
            if self.fail_connect {
                return Err(SqlError::Database(sqlx::Error::PoolTimedOut));
            }
            Ok(Box::new(FakeSession {
                recorder: self.recorder.clone(),
                results: self.results.clone(),
            }))
        }
    }

    struct FakeSession {
        recorder: Arc<Recorder>,
        results: Arc<Mutex<Vec<SqlResult<Vec<JsonRow>>>>>,
    }

    #[async_trait::async_trait]
    impl SqlSession for FakeSession {
        fn database(&self) -> &str {
            "shop"
        }

        async fn fetch_all(&self, sql: &str, params: &[&str]) -> SqlResult<Vec<JsonRow>> {
            self.recorder.statements.lock().unwrap().push((
                sql.to_string(),
                params.iter().map(|p| p.to_string()).collect(),
            ));
            let mut results = self.results.lock().unwrap();
            if results.is_empty() {
                Ok(Vec::new())
            } else {
                results.remove(0)
            }
        }

        async fn close(&self) {
            self.recorder.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Build a row from `(column, value)` pairs.
    pub fn row(pairs: &[(&str, Value)]) -> JsonRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}
