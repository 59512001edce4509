//! Database gateway.
//!
//! The gateway is the only component that talks to PostgreSQL. It owns a
//! single long-lived connection, created once at startup and closed
//! explicitly on shutdown. The [`Gateway`] trait is the seam the dispatcher
//! depends on.

use crate::config::DatabaseSettings;
use crate::db::params::bind_all;
use crate::db::types::RowToJson;
use crate::error::{DbError, DbResult};
use crate::models::{QueryPlan, Row};
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, info};

/// Executes query plans and returns rows as JSON maps.
pub trait Gateway: Send + Sync + 'static {
    /// Execute a plan and collect every returned row.
    ///
    /// Plans without parameters are sent as-is, which lets the server run
    /// caller-supplied statements verbatim.
    fn fetch_all(&self, plan: &QueryPlan) -> impl Future<Output = DbResult<Vec<Row>>> + Send;

    /// Release the underlying connection.
    fn close(&self) -> impl Future<Output = ()> + Send {
        async {}
    }
}

/// PostgreSQL gateway backed by exactly one connection.
#[derive(Debug, Clone)]
pub struct PgGateway {
    pool: PgPool,
    acquire_timeout: Duration,
    query_timeout: Duration,
}

impl PgGateway {
    /// Open the connection. Fails on network or authentication errors.
    pub async fn connect(settings: &DatabaseSettings) -> DbResult<Self> {
        info!(
            host = %settings.host,
            port = settings.port,
            database = ?settings.database,
            "Connecting to PostgreSQL"
        );

        let mut options = PgConnectOptions::new()
            .host(&settings.host)
            .port(settings.port)
            .application_name(env!("CARGO_PKG_NAME"));
        if let Some(user) = &settings.user {
            options = options.username(user);
        }
        if let Some(password) = &settings.password {
            options = options.password(password);
        }
        if let Some(database) = &settings.database {
            options = options.database(database);
        }

        // connect_with establishes the connection eagerly, so bad credentials
        // surface here rather than on the first tool call.
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .acquire_timeout(settings.connect_timeout)
            .connect_with(options)
            .await
            .map_err(|e| {
                DbError::connection(
                    format!("Failed to connect to {}:{}: {}", settings.host, settings.port, e),
                    "Check PG_HOST, PG_PORT, PG_USER, PG_PASS and PG_DATABASE",
                )
            })?;

        info!("PostgreSQL connected");
        Ok(Self {
            pool,
            acquire_timeout: settings.connect_timeout,
            query_timeout: settings.query_timeout,
        })
    }
}

/// Map a driver error, reporting pool timeouts against the configured
/// acquire timeout.
///
/// With a single connection, a call waits here while another statement is
/// still running.
pub(crate) fn driver_error(err: sqlx::Error, acquire_timeout: Duration) -> DbError {
    match err {
        sqlx::Error::PoolTimedOut => {
            DbError::timeout("connection acquire", acquire_timeout.as_secs() as u32)
        }
        other => DbError::from(other),
    }
}

impl Gateway for PgGateway {
    async fn fetch_all(&self, plan: &QueryPlan) -> DbResult<Vec<Row>> {
        let start = Instant::now();
        debug!(sql = %plan.sql, params = plan.params.len(), "Executing query");

        let rows_future = async {
            if plan.params.is_empty() {
                use sqlx::Executor;
                (&self.pool).fetch_all(plan.sql.as_str()).await
            } else {
                bind_all(&plan.sql, &plan.params)
                    .fetch_all(&self.pool)
                    .await
            }
        };

        let rows = match timeout(self.query_timeout, rows_future).await {
            Ok(result) => result.map_err(|e| driver_error(e, self.acquire_timeout))?,
            Err(_) => {
                return Err(DbError::timeout(
                    "query execution",
                    self.query_timeout.as_secs() as u32,
                ));
            }
        };

        debug!(
            row_count = rows.len(),
            execution_time_ms = start.elapsed().as_millis() as u64,
            "Query executed"
        );
        Ok(rows.iter().map(RowToJson::to_json_map).collect())
    }

    async fn close(&self) {
        info!("Closing database connection");
        self.pool.close().await;
    }
}
