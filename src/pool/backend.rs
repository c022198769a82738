//! Postgres-backed connector for the pool.

use async_trait::async_trait;
use sqlx::{Connection as _, PgConnection, Row};

use super::{Connect, DbConnection, JobRow, PoolError};

/// Sample probe standing in for the real stuck-jobs query, which lives in
/// the scheduling schema and is wired in per deployment.
const STUCK_JOBS_QUERY: &str = "SELECT 1::bigint AS id, 'test'::text AS name";

pub struct PgConnector {
    url: String,
}

impl PgConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl Connect for PgConnector {
    async fn connect(&self) -> Result<Box<dyn DbConnection>, PoolError> {
        let conn = PgConnection::connect(&self.url)
            .await
            .map_err(|e| PoolError::Connect(e.to_string()))?;
        Ok(Box::new(PgConn { conn }))
    }
}

pub struct PgConn {
    conn: PgConnection,
}

#[async_trait]
impl DbConnection for PgConn {
    async fn stuck_jobs(&mut self) -> Result<Vec<JobRow>, PoolError> {
        let rows = sqlx::query(STUCK_JOBS_QUERY)
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| PoolError::Query(e.to_string()))?;

        rows.iter()
            .map(|row| {
                Ok(JobRow {
                    id: row
                        .try_get("id")
                        .map_err(|e| PoolError::Query(e.to_string()))?,
                    name: row
                        .try_get("name")
                        .map_err(|e| PoolError::Query(e.to_string()))?,
                })
            })
            .collect()
    }
}
