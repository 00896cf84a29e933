use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::timestamp_format;

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Warn,
    Error,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Info, Severity::Warn, Severity::Error];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }

    /// WARN and ERROR records end up in problem buckets.
    pub fn is_problem(&self) -> bool {
        matches!(self, Severity::Warn | Severity::Error)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One exported log line, in the aggregation service's JSON shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    #[serde(with = "timestamp_format")]
    pub timestamp: DateTime<Utc>,
    pub application_name: String,
    pub subsystem_name: String,
    pub severity: Severity,
    pub text: String,
    pub json: RecordJson,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordJson {
    pub kubernetes: KubernetesMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws: Option<AwsMeta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_details: Option<ErrorDetails>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KubernetesMeta {
    pub namespace_name: String,
    pub pod_name: String,
    pub container_name: String,
    pub container_id: String,
    pub host: String,
    #[serde(default)]
    pub labels: PodLabels,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PodLabels {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AwsMeta {
    pub region: String,
    pub cluster_name: String,
    pub fargate_profile: String,
}

/// Extra context attached to ERROR records. The two shapes share no keys,
/// so an untagged representation reads back unambiguously.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetails {
    Database {
        error_code: String,
        retry_count: u32,
        #[serde(with = "timestamp_format")]
        last_successful_connection: DateTime<Utc>,
    },
    Upstream {
        upstream_service: String,
        status_code: u16,
        response_time_ms: u64,
    },
}

impl fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorDetails::Database {
                error_code,
                retry_count,
                last_successful_connection,
            } => write!(
                f,
                "error_code={} retry_count={} last_success={}",
                error_code,
                retry_count,
                timestamp_format::format(last_successful_connection)
            ),
            ErrorDetails::Upstream {
                upstream_service,
                status_code,
                response_time_ms,
            } => write!(
                f,
                "upstream={} status={} response_time={}ms",
                upstream_service, status_code, response_time_ms
            ),
        }
    }
}
