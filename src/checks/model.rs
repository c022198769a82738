//! Wire shape of a single health-check entry.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckKind {
    Service,
    Webapi,
    Website,
    Process,
    Batch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Running,
    Ok,
    Warning,
    Failed,
    #[serde(rename = "not found")]
    NotFound,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized check status '{0}'")]
pub struct UnknownStatus(String);

impl std::str::FromStr for CheckStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(Self::Running),
            "ok" => Ok(Self::Ok),
            "warning" => Ok(Self::Warning),
            "failed" => Ok(Self::Failed),
            "not found" => Ok(Self::NotFound),
            "error" => Ok(Self::Error),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

/// One entry of a status report. Produced fresh on every aggregation call,
/// never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub id: String,
    pub display_name: String,
    #[serde(rename = "type")]
    pub kind: CheckKind,
    pub status: CheckStatus,
    pub status_details: Option<String>,
}

impl CheckResult {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        kind: CheckKind,
        status: CheckStatus,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            kind,
            status,
            status_details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.status_details = Some(details.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_the_dashboard_field_names() {
        let result = CheckResult::new(
            "DAInternal",
            "Direct Access Internal Website",
            CheckKind::Website,
            CheckStatus::Running,
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["id"], "DAInternal");
        assert_eq!(json["display_name"], "Direct Access Internal Website");
        assert_eq!(json["type"], "website");
        assert_eq!(json["status"], "running");
        assert_eq!(json["status_details"], serde_json::Value::Null);
    }

    #[test]
    fn not_found_uses_the_spaced_spelling() {
        let json = serde_json::to_value(CheckStatus::NotFound).unwrap();
        assert_eq!(json, "not found");
        assert_eq!("not found".parse::<CheckStatus>(), Ok(CheckStatus::NotFound));
    }

    #[test]
    fn unknown_status_string_does_not_parse() {
        let err = "paused".parse::<CheckStatus>().unwrap_err();
        assert_eq!(err.to_string(), "unrecognized check status 'paused'");
    }
}
