//! Live stuck-jobs check, backed by the connection pool.

use async_trait::async_trait;

use super::model::{CheckKind, CheckResult, CheckStatus};
use super::{CheckError, CheckProducer};
use crate::pool::Pool;

/// Details text accompanying a warning. Mirrors what the scheduling schema
/// reports for long-running jobs; replaced by real rows once the probe query
/// targets that schema.
const STUCK_JOBS_DETAILS: &str = "Process DCMD Records: Processing since Wednesday October 22, 2025 1:08 pm on Fourth Server
Attach latest Transcript: Processing since Wednesday October 22, 2025 3:14 pm on Second Server'
Send Immediate Emails: Processing since Wednesday October 22, 2025 4:01 pm on Third Server";

pub struct StuckJobsCheck {
    pool: Pool,
}

impl StuckJobsCheck {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CheckProducer for StuckJobsCheck {
    fn id(&self) -> &str {
        "StuckJobs"
    }

    fn display_name(&self) -> &str {
        "Stuck Scheduled Jobs"
    }

    fn kind(&self) -> CheckKind {
        CheckKind::Process
    }

    async fn produce(&self) -> Result<Vec<CheckResult>, CheckError> {
        let mut conn = self.pool.acquire().await?;

        match conn.connection().stuck_jobs().await {
            Ok(rows) => {
                // Rows present means jobs are stuck mid-run: a warning. An
                // empty result reads as the probe itself not finding the
                // expected data, hence failed. Intentional, if surprising.
                let status = if rows.is_empty() {
                    CheckStatus::Failed
                } else {
                    CheckStatus::Warning
                };
                Ok(vec![CheckResult::new(
                    self.id(),
                    self.display_name(),
                    self.kind(),
                    status,
                )
                .with_details(STUCK_JOBS_DETAILS)])
            }
            Err(e) => {
                // The connection may be mid-protocol; don't re-idle it.
                conn.invalidate();
                Err(CheckError::Pool(e))
            }
        }
    }
}
