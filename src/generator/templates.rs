use rand::Rng;
use regex::{Captures, Regex};

use crate::generator::metadata::{Incident, fargate_ip, hex_string, version_label};
use crate::types::Severity;

pub const UPSTREAM_SERVICES: [&str; 3] = ["user-service", "payment-service", "inventory-service"];

/// Generic messages used when a container has no pool of its own.
fn generic_pool(severity: Severity) -> &'static [&'static str] {
    match severity {
        Severity::Info => &[
            "Request processed successfully",
            "Health check passed",
            "Service started successfully",
            "Configuration loaded",
            "Database connection established",
            "Cache hit for key",
            "User authenticated successfully",
            "Payment processed",
            "Order created",
            "Metrics collected",
            "Certificate renewed",
            "Pod started successfully",
            "Service mesh configuration applied",
            "Load balancer health check passed",
        ],
        Severity::Warn => &[
            "High memory usage detected",
            "Slow database query detected",
            "Rate limit approaching",
            "Certificate expires soon",
            "Disk space running low",
            "Connection pool nearly exhausted",
            "Cache miss rate high",
            "Service response time elevated",
            "Retry attempt failed",
            "Configuration drift detected",
            "Pod restart detected",
            "Network latency increased",
        ],
        Severity::Error => &[
            "Database connection failed",
            "Service unavailable",
            "Authentication failed",
            "Payment processing failed",
            "Internal server error",
            "Connection timeout",
            "Certificate validation failed",
            "DNS resolution failed",
            "Service mesh configuration error",
            "Load balancer health check failed",
            "Pod failed to start",
            "Resource quota exceeded",
            "Network policy violation",
            "TLS handshake failed",
            "Upstream service unreachable",
            "Database query timeout",
            "Cache connection lost",
            "Service discovery failed",
        ],
    }
}

/// Container-specific templates. `None` sends the caller to the generic pool.
fn container_pool(container: &str, severity: Severity) -> Option<&'static [&'static str]> {
    use Severity::{Error, Info, Warn};

    let pool: &'static [&'static str] = match (container, severity) {
        ("nginx", Info) => &[
            "{method} {path} {status_code} {latency_ms}ms",
            "Upstream response received from {host} in {latency_ms}ms",
        ],
        ("nginx", Warn) => &[
            "{method} {path} {client_status} {latency_ms}ms",
            "Upstream {host} responded slowly ({latency_ms}ms)",
        ],
        ("nginx", Error) => &[
            "connect() failed (111: Connection refused) while connecting to upstream {ip}:8080",
            "upstream timed out (110: Connection timed out) while reading response header from {host}",
            "{method} {path} {server_status} {latency_ms}ms",
        ],
        ("app", Info) => &[
            "Request {method} {path} completed with {status_code} in {latency_ms}ms",
            "User {user_id} authenticated successfully",
            "Order {order_id} created for user {user_id}",
            "Payment for order {order_id} processed",
        ],
        ("app", Warn) => &[
            "Slow database query detected ({query_ms}ms)",
            "Retry attempt {retry} for order {order_id}",
            "Connection pool nearly exhausted ({percent}% in use)",
        ],
        ("app", Error) => &[
            "Database connection failed after {retry} retries",
            "Service unavailable: {upstream} returned {upstream_status}",
            "Payment processing failed for order {order_id}",
            "Request to {upstream} timeout after {latency_ms}ms",
        ],
        ("istio-proxy", Info) => &[
            "[{method} {path}] {status_code} via outbound|8080||{upstream}.svc.cluster.local {latency_ms}ms",
            "Envoy proxy is ready",
        ],
        ("istio-proxy", Warn) => &["Upstream {upstream} latency increased to {latency_ms}ms"],
        ("istio-proxy", Error) => &[
            "upstream connect error or disconnect/reset before headers. reset reason: connection refused",
            "TLS handshake failed with peer {ip}",
        ],
        ("coredns", Info) => &["[INFO] {ip}:53 - A IN {host}. udp NOERROR {latency_ms}ms"],
        ("coredns", Error) => &["[ERROR] plugin/errors: 2 {host}. A: read udp {ip}:53: i/o timeout"],
        ("postgres", Info) => &[
            "checkpoint complete: wrote {count} buffers",
            "connection authorized: user=app database=orders",
        ],
        ("postgres", Warn) => &[
            "duration: {query_ms} ms statement: SELECT * FROM orders WHERE user_id = '{user_id}'",
            "database connection pool {percent}% utilized",
        ],
        ("postgres", Error) => &[
            "FATAL: remaining connection slots are reserved for database superuser",
            "could not receive data from client: Connection reset by peer",
            "canceling statement due to statement timeout",
        ],
        ("redis", Info) => &[
            "DB saved on disk ({bytes} bytes)",
            "Cache hit for key {key}",
        ],
        ("redis", Warn) => &["Cache miss rate high ({percent}%)"],
        ("redis", Error) => &["Error accepting a client connection: Connection refused ({ip})"],
        ("prometheus", Info) => &["Scrape of {count} targets completed in {latency_ms}ms"],
        ("prometheus", Warn) => &["Scrape of {ip}:9090 exceeded {latency_ms}ms"],
        ("fluent-bit", Info) => &["Flushed {count} records ({bytes} bytes) to output"],
        ("fluent-bit", Error) => &["Failed to flush chunk: upstream {host} connection timeout"],
        ("cert-manager", Info) => &["Certificate for {domain} renewed, valid for {days} days"],
        ("cert-manager", Warn) => &["Certificate for {domain} expires in {days} days"],
        ("cert-manager", Error) => &["Certificate validation failed for {domain}: ACME challenge rejected"],
        ("aws-load-balancer-controller", Info) => &["Successfully reconciled target group with {count} targets"],
        ("aws-load-balancer-controller", Error) => &["Load balancer health check failed for target {ip}"],
        _ => return None,
    };
    Some(pool)
}

/// `retry`, `upstream` and `upstream_status` come from the record's incident so
/// the text agrees with any attached error details.
fn placeholder_value<R: Rng + ?Sized>(name: &str, incident: &Incident, rng: &mut R) -> String {
    match name {
        "method" => pick(rng, &["GET", "POST", "PUT", "DELETE"]).to_string(),
        "path" => pick(
            rng,
            &[
                "/api/v1/users",
                "/api/v1/orders",
                "/api/v1/payments",
                "/login",
                "/healthz",
                "/metrics",
            ],
        )
        .to_string(),
        "status_code" => pick(rng, &[200, 201, 204, 304]).to_string(),
        "client_status" => pick(rng, &[400, 401, 403, 404, 429]).to_string(),
        "server_status" => pick(rng, &[500, 502, 503, 504]).to_string(),
        "latency_ms" => rng.gen_range(5..=2500).to_string(),
        "query_ms" => rng.gen_range(100..=5000).to_string(),
        "user_id" => format!("user-{}", rng.gen_range(1000..=9999)),
        "order_id" => format!("ord-{}", rng.gen_range(100_000..=999_999)),
        "ip" => fargate_ip(rng),
        "host" => pick(
            rng,
            &[
                "api.internal",
                "payments.backend.svc.cluster.local",
                "users.backend.svc.cluster.local",
                "sts.us-west-2.amazonaws.com",
            ],
        )
        .to_string(),
        "upstream" => incident.upstream_service.to_string(),
        "upstream_status" => incident.upstream_status.to_string(),
        "key" => format!("session:{}", hex_string(rng, 8)),
        "retry" => incident.retry_count.to_string(),
        "pool" => rng.gen_range(5..=50).to_string(),
        "percent" => rng.gen_range(50..=99).to_string(),
        "domain" => pick(
            rng,
            &["api.example.com", "payments.example.com", "grafana.example.com"],
        )
        .to_string(),
        "days" => rng.gen_range(1..=30).to_string(),
        "version" => version_label(rng),
        "bytes" => rng.gen_range(512..=10_485_760).to_string(),
        "count" => rng.gen_range(1..=500).to_string(),
        _ => rng.gen_range(1000..=99_999).to_string(),
    }
}

/// Pick one element of a non-empty slice.
pub fn pick<'a, T, R: Rng + ?Sized>(rng: &mut R, items: &'a [T]) -> &'a T {
    &items[rng.gen_range(0..items.len())]
}

/// Builds message text for a (container, severity) pair.
pub struct MessageBuilder {
    placeholder: Regex,
}

impl MessageBuilder {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            placeholder: Regex::new(r"\{([a-z_]+)\}")?,
        })
    }

    pub fn build<R: Rng + ?Sized>(
        &self,
        container: &str,
        severity: Severity,
        incident: &Incident,
        rng: &mut R,
    ) -> String {
        match container_pool(container, severity) {
            Some(pool) => {
                let template = pick(rng, pool);
                self.fill(template, incident, rng)
            }
            None => {
                let message = pick(rng, generic_pool(severity));
                annotate(message, rng)
            }
        }
    }

    /// Replace every `{name}` with a value sampled for that name.
    pub fn fill<R: Rng + ?Sized>(&self, template: &str, incident: &Incident, rng: &mut R) -> String {
        self.placeholder
            .replace_all(template, |caps: &Captures| {
                placeholder_value(&caps[1], incident, rng)
            })
            .into_owned()
    }
}

/// Append sampled context to a generic message, keyed off its wording.
fn annotate<R: Rng + ?Sized>(message: &str, rng: &mut R) -> String {
    let lower = message.to_lowercase();
    if lower.contains("database") {
        format!("{} (connection_pool_size: {})", message, rng.gen_range(5..=50))
    } else if lower.contains("timeout") {
        format!("{} (timeout: {}s)", message, rng.gen_range(5..=30))
    } else if lower.contains("rate limit") {
        format!("{} (current: {}%)", message, rng.gen_range(80..=95))
    } else {
        message.to_string()
    }
}

#[cfg(test)]
pub(crate) fn has_container_pool(container: &str, severity: Severity) -> bool {
    container_pool(container, severity).is_some()
}
