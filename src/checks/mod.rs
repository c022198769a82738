//! Health checks — producers, registry and aggregation.
//!
//! Every check is a [`CheckProducer`]: a unit that yields zero or more
//! normalized [`CheckResult`]s. Static producers are pure functions of
//! fixed or configured data; the stuck-jobs producer runs a live query
//! through the connection pool. Real integrations (OS service manager,
//! the scheduling schema) slot in by swapping producers, not by touching
//! the aggregator.

pub mod aggregator;
pub mod model;
pub mod statics;
pub mod stuck_jobs;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::pool::{Pool, PoolError};

pub use aggregator::StatusAggregator;
pub use model::{CheckKind, CheckResult, CheckStatus};

#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error("{0}")]
    Execution(String),
}

#[async_trait]
pub trait CheckProducer: Send + Sync {
    fn id(&self) -> &str;
    fn display_name(&self) -> &str;
    fn kind(&self) -> CheckKind;

    /// Produce this check's results. Errors are caught by the aggregator
    /// and downgraded to a single `error`-status entry.
    async fn produce(&self) -> Result<Vec<CheckResult>, CheckError>;
}

/// Reference registry: five static checks and the live stuck-jobs check,
/// in the fixed order the report is expected in. The CRM Messenger service
/// check is served by its own endpoint and is not part of this report.
pub fn registry(pool: Pool) -> Vec<Arc<dyn CheckProducer>> {
    vec![
        Arc::new(statics::da_internal()),
        Arc::new(statics::crm_webapi()),
        Arc::new(stuck_jobs::StuckJobsCheck::new(pool)),
        Arc::new(statics::DailyChecks),
    ]
}
