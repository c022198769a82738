//! Status aggregator — runs every registered producer and assembles one
//! ordered report.

use std::sync::Arc;

use futures::future::join_all;

use super::model::{CheckResult, CheckStatus};
use super::CheckProducer;

pub struct StatusAggregator {
    producers: Vec<Arc<dyn CheckProducer>>,
}

impl StatusAggregator {
    pub fn new(producers: Vec<Arc<dyn CheckProducer>>) -> Self {
        Self { producers }
    }

    pub fn check_count(&self) -> usize {
        self.producers.len()
    }

    /// Run all producers concurrently and reassemble their results in
    /// registration order. A failing producer contributes exactly one
    /// `error`-status entry in its registered position; it never takes the
    /// rest of the report down with it.
    pub async fn collect_all(&self) -> Vec<CheckResult> {
        let outcomes = join_all(self.producers.iter().map(|p| p.produce())).await;

        let mut report = Vec::with_capacity(self.producers.len());
        for (producer, outcome) in self.producers.iter().zip(outcomes) {
            match outcome {
                Ok(results) => report.extend(results),
                Err(e) => {
                    tracing::error!(check = producer.id(), "check failed: {}", e);
                    report.push(
                        CheckResult::new(
                            producer.id(),
                            producer.display_name(),
                            producer.kind(),
                            CheckStatus::Error,
                        )
                        .with_details(format!("Error when performing check: {}", e)),
                    );
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::model::CheckKind;
    use crate::checks::CheckError;
    use async_trait::async_trait;
    use std::time::Duration;

    struct FixedProducer {
        id: &'static str,
        delay_ms: u64,
    }

    #[async_trait]
    impl CheckProducer for FixedProducer {
        fn id(&self) -> &str {
            self.id
        }

        fn display_name(&self) -> &str {
            self.id
        }

        fn kind(&self) -> CheckKind {
            CheckKind::Website
        }

        async fn produce(&self) -> Result<Vec<CheckResult>, CheckError> {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            Ok(vec![CheckResult::new(
                self.id,
                self.id,
                CheckKind::Website,
                CheckStatus::Ok,
            )])
        }
    }

    struct FailingProducer;

    #[async_trait]
    impl CheckProducer for FailingProducer {
        fn id(&self) -> &str {
            "Broken"
        }

        fn display_name(&self) -> &str {
            "Broken Check"
        }

        fn kind(&self) -> CheckKind {
            CheckKind::Process
        }

        async fn produce(&self) -> Result<Vec<CheckResult>, CheckError> {
            Err(CheckError::Execution("simulated outage".into()))
        }
    }

    #[tokio::test]
    async fn one_failing_check_degrades_only_its_own_entry() {
        let aggregator = StatusAggregator::new(vec![
            Arc::new(FixedProducer {
                id: "First",
                delay_ms: 0,
            }),
            Arc::new(FailingProducer),
            Arc::new(FixedProducer {
                id: "Third",
                delay_ms: 0,
            }),
        ]);

        let report = aggregator.collect_all().await;
        assert_eq!(report.len(), 3);
        assert_eq!(report[0].id, "First");
        assert_eq!(report[0].status, CheckStatus::Ok);
        assert_eq!(report[1].id, "Broken");
        assert_eq!(report[1].status, CheckStatus::Error);
        assert!(report[1]
            .status_details
            .as_deref()
            .unwrap()
            .contains("simulated outage"));
        assert_eq!(report[2].id, "Third");
        assert_eq!(report[2].status, CheckStatus::Ok);
    }

    #[tokio::test]
    async fn report_order_is_registration_order_not_completion_order() {
        // The slow check finishes last but must still come first.
        let aggregator = StatusAggregator::new(vec![
            Arc::new(FixedProducer {
                id: "Slow",
                delay_ms: 50,
            }),
            Arc::new(FixedProducer {
                id: "Fast",
                delay_ms: 0,
            }),
        ]);

        let report = aggregator.collect_all().await;
        assert_eq!(report[0].id, "Slow");
        assert_eq!(report[1].id, "Fast");
    }

    #[tokio::test]
    async fn empty_registry_yields_empty_report() {
        let aggregator = StatusAggregator::new(vec![]);
        assert!(aggregator.collect_all().await.is_empty());
    }
}
