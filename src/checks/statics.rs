//! Static and mock producers.
//!
//! These stand in for integrations that are out of scope here: the two
//! website/API probes report a fixed status, the daily batch results mirror
//! what the overnight-batch table returns, and [`ServiceCheck`] resolves a
//! service name against a configured mock service table instead of the OS
//! service manager.

use async_trait::async_trait;

use super::model::{CheckKind, CheckResult, CheckStatus};
use super::{CheckError, CheckProducer};
use crate::config::ChecksConfig;

/// A check with a fixed result.
pub struct StaticCheck {
    result: CheckResult,
}

#[async_trait]
impl CheckProducer for StaticCheck {
    fn id(&self) -> &str {
        &self.result.id
    }

    fn display_name(&self) -> &str {
        &self.result.display_name
    }

    fn kind(&self) -> CheckKind {
        self.result.kind
    }

    async fn produce(&self) -> Result<Vec<CheckResult>, CheckError> {
        Ok(vec![self.result.clone()])
    }
}

pub fn da_internal() -> StaticCheck {
    StaticCheck {
        result: CheckResult::new(
            "DAInternal",
            "Direct Access Internal Website",
            CheckKind::Website,
            CheckStatus::Running,
        ),
    }
}

pub fn crm_webapi() -> StaticCheck {
    StaticCheck {
        result: CheckResult::new(
            "CRMWebAPI",
            "CRM Web API",
            CheckKind::Webapi,
            CheckStatus::Running,
        ),
    }
}

/// Overnight batch results. Mock data until the daily-checks table is wired
/// in; one producer yielding three entries.
pub struct DailyChecks;

#[async_trait]
impl CheckProducer for DailyChecks {
    fn id(&self) -> &str {
        "DailyChecks"
    }

    fn display_name(&self) -> &str {
        "Overnight Batch Checks"
    }

    fn kind(&self) -> CheckKind {
        CheckKind::Batch
    }

    async fn produce(&self) -> Result<Vec<CheckResult>, CheckError> {
        Ok(vec![
            CheckResult::new(
                "Batch_Email",
                "Overnight Batch - Email",
                CheckKind::Batch,
                CheckStatus::Failed,
            )
            .with_details(
                "Error when performing check: ORA-01422: exact fetch returns more than \
                 requested number of rows",
            ),
            CheckResult::new(
                "Batch_LINRegCard",
                "Overnight Batch - LIN Registration Card",
                CheckKind::Batch,
                CheckStatus::Ok,
            ),
            CheckResult::new(
                "CRMMessengerQueue",
                "CRM Messenger Queue < 1000",
                CheckKind::Process,
                CheckStatus::Ok,
            ),
        ])
    }
}

/// CRM Messenger service status, resolved from the configured service table.
pub struct ServiceCheck {
    service_name: String,
    services: std::collections::HashMap<String, String>,
}

impl ServiceCheck {
    pub fn crm_messenger(config: &ChecksConfig) -> Self {
        Self {
            service_name: config.crm_messenger_service.clone(),
            services: config.services.clone(),
        }
    }

    fn status(&self) -> (CheckStatus, Option<String>) {
        match self.services.get(&self.service_name) {
            None => {
                tracing::error!("Service not found: {}", self.service_name);
                (CheckStatus::NotFound, None)
            }
            Some(raw) => match raw.parse::<CheckStatus>() {
                Ok(status) => (status, None),
                Err(_) => (
                    CheckStatus::Error,
                    Some(format!(
                        "unrecognized service status '{}' for {}",
                        raw, self.service_name
                    )),
                ),
            },
        }
    }
}

#[async_trait]
impl CheckProducer for ServiceCheck {
    fn id(&self) -> &str {
        "CRMMessenger"
    }

    fn display_name(&self) -> &str {
        "CRM Messenger Windows Service"
    }

    fn kind(&self) -> CheckKind {
        CheckKind::Service
    }

    async fn produce(&self) -> Result<Vec<CheckResult>, CheckError> {
        let (status, details) = self.status();
        let mut result = CheckResult::new(self.id(), self.display_name(), self.kind(), status);
        result.status_details = details;
        Ok(vec![result])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checks_config(services: &[(&str, &str)]) -> ChecksConfig {
        ChecksConfig {
            crm_messenger_service: "CRMMessenger_CXDEV".into(),
            services: services
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[tokio::test]
    async fn service_check_reports_configured_status() {
        let check =
            ServiceCheck::crm_messenger(&checks_config(&[("CRMMessenger_CXDEV", "running")]));
        let results = check.produce().await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, CheckStatus::Running);
        assert_eq!(results[0].id, "CRMMessenger");
    }

    #[tokio::test]
    async fn missing_service_reports_not_found() {
        let check = ServiceCheck::crm_messenger(&checks_config(&[]));
        let results = check.produce().await.unwrap();
        assert_eq!(results[0].status, CheckStatus::NotFound);
    }

    #[tokio::test]
    async fn unrecognized_service_status_reports_error() {
        let check =
            ServiceCheck::crm_messenger(&checks_config(&[("CRMMessenger_CXDEV", "paused")]));
        let results = check.produce().await.unwrap();
        assert_eq!(results[0].status, CheckStatus::Error);
        assert!(results[0]
            .status_details
            .as_deref()
            .unwrap()
            .contains("paused"));
    }

    #[tokio::test]
    async fn daily_checks_yield_three_entries() {
        let results = DailyChecks.produce().await.unwrap();
        let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["Batch_Email", "Batch_LINRegCard", "CRMMessengerQueue"]);
        assert_eq!(results[0].status, CheckStatus::Failed);
    }
}
