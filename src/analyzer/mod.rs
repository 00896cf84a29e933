pub mod classify;
pub mod report;

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::types::{ErrorDetails, LogRecord, Severity};
use crate::utils::percentage;
use classify::{ErrorCategory, classify};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("log file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("malformed log file {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to read log file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Read a JSON array of records from `path`.
pub fn load_logs(path: &Path) -> Result<Vec<LogRecord>, LoadError> {
    let raw = std::fs::read(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
        _ => LoadError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;
    let records: Vec<LogRecord> =
        serde_json::from_slice(&raw).map_err(|source| LoadError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;
    debug!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Occurrence counts for the values of one field.
#[derive(Debug, Clone, Default)]
pub struct FrequencyTable {
    counts: HashMap<String, usize>,
    total: usize,
}

impl FrequencyTable {
    pub fn add(&mut self, value: &str) {
        *self.counts.entry(value.to_string()).or_default() += 1;
        self.total += 1;
    }

    pub fn get(&self, value: &str) -> usize {
        self.counts.get(value).copied().unwrap_or(0)
    }

    #[allow(dead_code)]
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Values by descending count, ties broken by name.
    pub fn most_common(&self) -> Vec<(&str, usize)> {
        let mut entries: Vec<(&str, usize)> =
            self.counts.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }

    /// Like `most_common`, with each value's share of the table total.
    pub fn percentages(&self) -> Vec<(&str, usize, f64)> {
        self.most_common()
            .into_iter()
            .map(|(value, count)| (value, count, percentage(count, self.total)))
            .collect()
    }
}

/// A WARN or ERROR record kept for the problem report.
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemRecord {
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
    pub text: String,
    pub error_details: Option<ErrorDetails>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BucketKey {
    pub application: String,
    pub subsystem: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategorySummary {
    pub count: usize,
    /// Text of the first ERROR that landed in this category.
    pub example: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn duration(&self) -> chrono::Duration {
        self.end - self.start
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AnalyzeOptions {
    /// Unique ERROR messages kept per application.
    pub samples_per_app: usize,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self { samples_per_app: 3 }
    }
}

/// Aggregate statistics over one log file.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    pub total: usize,
    pub severities: FrequencyTable,
    pub applications: FrequencyTable,
    pub subsystems: FrequencyTable,
    pub namespaces: FrequencyTable,
    pub environments: FrequencyTable,
    pub versions: FrequencyTable,
    pub pods: HashSet<String>,
    pub hosts: HashSet<String>,
    pub problems: BTreeMap<BucketKey, Vec<ProblemRecord>>,
    pub error_categories: BTreeMap<ErrorCategory, CategorySummary>,
    /// Unique ERROR messages per application, in order of first appearance.
    pub error_samples: Vec<(String, Vec<String>)>,
    pub time_range: Option<TimeRange>,
}

impl Analysis {
    pub fn error_count(&self) -> usize {
        self.severities.get(Severity::Error.as_str())
    }

    #[allow(dead_code)]
    pub fn category_count(&self, category: ErrorCategory) -> usize {
        self.error_categories
            .get(&category)
            .map(|c| c.count)
            .unwrap_or(0)
    }

    /// The `n` largest problem buckets, ties broken by application then subsystem.
    pub fn top_problem_buckets(&self, n: usize) -> Vec<(&BucketKey, &[ProblemRecord])> {
        let mut buckets: Vec<(&BucketKey, &[ProblemRecord])> = self
            .problems
            .iter()
            .map(|(k, v)| (k, v.as_slice()))
            .collect();
        buckets.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| a.0.cmp(b.0)));
        buckets.truncate(n);
        buckets
    }

    fn record_error(&mut self, record: &LogRecord, samples_per_app: usize) {
        let category = classify(&record.text);
        self.error_categories
            .entry(category)
            .and_modify(|c| c.count += 1)
            .or_insert_with(|| CategorySummary {
                count: 1,
                example: record.text.clone(),
            });

        let idx = match self
            .error_samples
            .iter()
            .position(|(app, _)| *app == record.application_name)
        {
            Some(idx) => idx,
            None => {
                self.error_samples
                    .push((record.application_name.clone(), Vec::new()));
                self.error_samples.len() - 1
            }
        };
        let samples = &mut self.error_samples[idx].1;
        if samples.len() < samples_per_app && !samples.contains(&record.text) {
            samples.push(record.text.clone());
        }
    }

    fn extend_time_range(&mut self, ts: DateTime<Utc>) {
        self.time_range = Some(match self.time_range {
            Some(range) => TimeRange {
                start: range.start.min(ts),
                end: range.end.max(ts),
            },
            None => TimeRange { start: ts, end: ts },
        });
    }
}

/// Single pass over the records.
pub fn analyze(records: &[LogRecord], options: &AnalyzeOptions) -> Analysis {
    let mut analysis = Analysis::default();

    for record in records {
        analysis.total += 1;
        analysis.severities.add(record.severity.as_str());
        analysis.applications.add(&record.application_name);
        analysis.subsystems.add(&record.subsystem_name);

        let k8s = &record.json.kubernetes;
        analysis.namespaces.add(&k8s.namespace_name);
        analysis.pods.insert(k8s.pod_name.clone());
        analysis.hosts.insert(k8s.host.clone());
        if let Some(env) = &k8s.labels.environment {
            analysis.environments.add(env);
        }
        if let Some(version) = &k8s.labels.version {
            analysis.versions.add(version);
        }

        analysis.extend_time_range(record.timestamp);

        if record.severity.is_problem() {
            analysis
                .problems
                .entry(BucketKey {
                    application: record.application_name.clone(),
                    subsystem: record.subsystem_name.clone(),
                })
                .or_default()
                .push(ProblemRecord {
                    timestamp: record.timestamp,
                    severity: record.severity,
                    text: record.text.clone(),
                    error_details: record.json.error_details.clone(),
                });
        }

        if record.severity == Severity::Error {
            analysis.record_error(record, options.samples_per_app);
        }
    }

    debug!(
        "Analyzed {} records: {} errors in {} problem buckets",
        analysis.total,
        analysis.error_count(),
        analysis.problems.len()
    );
    analysis
}
