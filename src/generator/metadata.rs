use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use crate::generator::templates::{UPSTREAM_SERVICES, pick};
use crate::types::{ErrorDetails, KubernetesMeta, PodLabels};

const HEX: &[u8] = b"0123456789abcdef";

/// Values shared between a record's message text and its error details.
#[derive(Debug, Clone, PartialEq)]
pub struct Incident {
    pub retry_count: u32,
    pub upstream_service: &'static str,
    pub upstream_status: u16,
}

impl Incident {
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            retry_count: rng.gen_range(1..=5),
            upstream_service: *pick(rng, &UPSTREAM_SERVICES),
            upstream_status: *pick(rng, &[503, 502, 504]),
        }
    }
}

pub fn hex_string<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| HEX[rng.gen_range(0..HEX.len())] as char)
        .collect()
}

/// Private address in the range Fargate hands out to tasks.
pub fn fargate_ip<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!(
        "10.{}.{}.{}",
        rng.gen_range(0..=255),
        rng.gen_range(0..=255),
        rng.gen_range(1..=254)
    )
}

pub fn container_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    hex_string(rng, 64)
}

pub fn pod_name<R: Rng + ?Sized>(rng: &mut R, app: &str, container: &str) -> String {
    format!("{}-{}-{}", app, container, hex_string(rng, 10))
}

pub fn version_label<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!(
        "v{}.{}.{}",
        rng.gen_range(1..=3),
        rng.gen_range(0..=9),
        rng.gen_range(0..=9)
    )
}

pub fn kubernetes_meta<R: Rng + ?Sized>(
    rng: &mut R,
    app: &str,
    container: &str,
    namespace: &str,
) -> KubernetesMeta {
    KubernetesMeta {
        namespace_name: namespace.to_string(),
        pod_name: pod_name(rng, app, container),
        container_name: container.to_string(),
        container_id: container_id(rng),
        host: fargate_ip(rng),
        labels: PodLabels {
            app: Some(app.to_string()),
            version: Some(version_label(rng)),
            environment: Some(pick(rng, &["production", "staging"]).to_string()),
            tier: Some(
                pick(rng, &["frontend", "backend", "database", "cache", "system"]).to_string(),
            ),
        },
    }
}

/// Details for ERROR messages about the database or an unavailable service.
/// Other messages get none.
pub fn error_details<R: Rng + ?Sized>(
    rng: &mut R,
    text: &str,
    timestamp: DateTime<Utc>,
    incident: &Incident,
) -> Option<ErrorDetails> {
    let lower = text.to_lowercase();
    if lower.contains("database") {
        Some(ErrorDetails::Database {
            error_code: pick(rng, &["CONNECTION_REFUSED", "TIMEOUT", "AUTH_FAILED"]).to_string(),
            retry_count: incident.retry_count,
            last_successful_connection: timestamp
                .checked_sub_signed(Duration::minutes(rng.gen_range(1..=30)))
                .unwrap_or(timestamp),
        })
    } else if lower.contains("service") && lower.contains("unavailable") {
        Some(ErrorDetails::Upstream {
            upstream_service: incident.upstream_service.to_string(),
            status_code: incident.upstream_status,
            response_time_ms: rng.gen_range(5000..=30_000),
        })
    } else {
        None
    }
}
