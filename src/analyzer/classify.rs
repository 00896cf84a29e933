use std::fmt;

/// Coarse buckets for ERROR messages. Declaration order is match priority.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub enum ErrorCategory {
    ConnectionRefused,
    Timeout,
    Database,
    Upstream,
    Certificate,
    Other,
}

impl ErrorCategory {
    pub const ALL: [ErrorCategory; 6] = [
        ErrorCategory::ConnectionRefused,
        ErrorCategory::Timeout,
        ErrorCategory::Database,
        ErrorCategory::Upstream,
        ErrorCategory::Certificate,
        ErrorCategory::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ErrorCategory::ConnectionRefused => "Connection Refused",
            ErrorCategory::Timeout => "Timeout",
            ErrorCategory::Database => "Database Issues",
            ErrorCategory::Upstream => "Upstream Issues",
            ErrorCategory::Certificate => "Certificate/TLS Issues",
            ErrorCategory::Other => "Other Errors",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Case-insensitive substring classification; the first matching rule wins.
pub fn classify(text: &str) -> ErrorCategory {
    let text = text.to_lowercase();
    if text.contains("connection refused") {
        ErrorCategory::ConnectionRefused
    } else if text.contains("timeout") {
        ErrorCategory::Timeout
    } else if text.contains("database") || text.contains("db") {
        ErrorCategory::Database
    } else if text.contains("upstream") {
        ErrorCategory::Upstream
    } else if text.contains("certificate") || text.contains("tls") {
        ErrorCategory::Certificate
    } else {
        ErrorCategory::Other
    }
}
