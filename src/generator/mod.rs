pub mod metadata;
pub mod templates;

use anyhow::Context;
use chrono::{DateTime, Duration, SubsecRound, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::cli::{GenerateArgs, SeverityStrategy, TimingStrategy};
use crate::types::{AwsMeta, LogRecord, RecordJson, Severity};
use crate::utils::{paint, percentage, timestamp_format};
use metadata::{Incident, error_details, kubernetes_meta};
use templates::{MessageBuilder, pick};

/// Maximum jitter, in seconds, applied to interpolated timestamps.
const JITTER_SECS: i64 = 30;

/// Everything the generator needs to produce one batch.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub count: usize,
    pub start: DateTime<Utc>,
    pub span: Duration,
    pub severity_strategy: SeverityStrategy,
    pub timing: TimingStrategy,
    pub catalog: Catalog,
    pub cluster: AwsMeta,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            count: 1000,
            start: DateTime::from_naive_utc_and_offset(
                chrono::NaiveDate::from_ymd_opt(2025, 7, 1)
                    .and_then(|d| d.and_hms_opt(7, 0, 0))
                    .unwrap_or_default(),
                Utc,
            ),
            span: Duration::minutes(17),
            severity_strategy: SeverityStrategy::PerApp,
            timing: TimingStrategy::Interpolated,
            catalog: Catalog::default(),
            cluster: AwsMeta {
                region: "us-west-2".to_string(),
                cluster_name: "production-eks-cluster".to_string(),
                fargate_profile: "default-profile".to_string(),
            },
        }
    }
}

impl GeneratorConfig {
    pub fn from_args(args: &GenerateArgs) -> anyhow::Result<Self> {
        let start = timestamp_format::parse(&args.start)
            .with_context(|| format!("Invalid start time '{}'", args.start))?;
        let catalog = match &args.catalog {
            Some(path) => {
                info!("Loading application catalog from {}", path.display());
                Catalog::from_yaml_file(path)?
            }
            None => Catalog::default(),
        };
        let config = Self {
            count: args.count,
            start,
            span: Duration::try_minutes(args.span_minutes).with_context(|| {
                format!("Time span of {} minutes is out of range", args.span_minutes)
            })?,
            severity_strategy: args.severity_strategy,
            timing: args.timing,
            catalog,
            ..Default::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.count == 0 {
            anyhow::bail!("Record count must be at least 1");
        }
        if self.span <= Duration::zero() {
            anyhow::bail!("Time span must be positive");
        }
        if self.span.num_microseconds().is_none() {
            anyhow::bail!("Time span of {}s is too large", self.span.num_seconds());
        }
        let jitter = Duration::seconds(JITTER_SECS);
        let latest = match self.timing {
            TimingStrategy::Interpolated => self.span.checked_add(&jitter),
            TimingStrategy::Sequential => i64::try_from(self.count)
                .ok()
                .and_then(Duration::try_seconds),
        };
        let fits = latest.is_some_and(|d| self.start.checked_add_signed(d).is_some())
            && self.start.checked_sub_signed(jitter).is_some();
        if !fits {
            anyhow::bail!(
                "Records starting at {} would fall outside the representable time range",
                timestamp_format::format(&self.start)
            );
        }
        self.catalog.validate().context("Invalid application catalog")?;
        Ok(())
    }
}

/// Decide a record's severity under the given strategy.
pub fn pick_severity<R: Rng + ?Sized>(
    strategy: SeverityStrategy,
    error_rate: f64,
    rng: &mut R,
) -> Severity {
    match strategy {
        SeverityStrategy::PerApp => {
            if rng.gen_bool(error_rate) {
                if rng.gen_bool(0.5) {
                    Severity::Error
                } else {
                    Severity::Warn
                }
            } else {
                Severity::Info
            }
        }
        SeverityStrategy::Weighted => match rng.gen_range(0..100) {
            0..70 => Severity::Info,
            70..90 => Severity::Warn,
            _ => Severity::Error,
        },
    }
}

/// Timestamp for the record at `index`, truncated to microseconds so it
/// survives a round trip through the export format.
pub fn timestamp_for<R: Rng + ?Sized>(
    config: &GeneratorConfig,
    index: usize,
    rng: &mut R,
) -> anyhow::Result<DateTime<Utc>> {
    let offset = match config.timing {
        TimingStrategy::Interpolated => {
            let span_micros = config.span.num_microseconds().unwrap_or(i64::MAX) as f64;
            let offset = span_micros * index as f64 / config.count as f64;
            Duration::microseconds(offset as i64)
                .checked_add(&Duration::seconds(rng.gen_range(-JITTER_SECS..=JITTER_SECS)))
        }
        TimingStrategy::Sequential => i64::try_from(index).ok().and_then(Duration::try_seconds),
    };
    let ts = offset
        .and_then(|offset| config.start.checked_add_signed(offset))
        .with_context(|| format!("Timestamp for record {} is out of range", index))?;
    Ok(ts.trunc_subsecs(6))
}

fn build_record<R: Rng + ?Sized>(
    config: &GeneratorConfig,
    messages: &MessageBuilder,
    index: usize,
    rng: &mut R,
) -> anyhow::Result<LogRecord> {
    let timestamp = timestamp_for(config, index, rng)?;

    let app = pick(rng, &config.catalog.applications);
    let container = pick(rng, &app.containers);
    let namespace = pick(rng, &app.namespaces);

    let severity = pick_severity(config.severity_strategy, app.error_rate, rng);
    let incident = Incident::sample(rng);
    let text = messages.build(container, severity, &incident, rng);
    let kubernetes = kubernetes_meta(rng, &app.name, container, namespace);
    let error_details = if severity == Severity::Error {
        error_details(rng, &text, timestamp, &incident)
    } else {
        None
    };

    Ok(LogRecord {
        timestamp,
        application_name: app.name.clone(),
        subsystem_name: container.clone(),
        severity,
        text,
        json: RecordJson {
            kubernetes,
            aws: Some(config.cluster.clone()),
            error_details,
        },
    })
}

/// Generate `config.count` records, sorted by timestamp.
pub fn generate_logs<R: Rng + ?Sized>(
    config: &GeneratorConfig,
    rng: &mut R,
) -> anyhow::Result<Vec<LogRecord>> {
    config.validate()?;
    let messages = MessageBuilder::new()?;

    debug!(
        "Generating {} records from {} over {}s",
        config.count,
        timestamp_format::format(&config.start),
        config.span.num_seconds()
    );

    let mut records = (0..config.count)
        .map(|i| build_record(config, &messages, i, rng))
        .collect::<anyhow::Result<Vec<LogRecord>>>()?;
    records.sort_by_key(|r| r.timestamp);
    Ok(records)
}

/// Generate with a seeded `StdRng` when `seed` is set, otherwise with the
/// thread RNG.
pub fn generate_with_seed(
    config: &GeneratorConfig,
    seed: Option<u64>,
) -> anyhow::Result<Vec<LogRecord>> {
    match seed {
        Some(seed) => {
            debug!("Using seed {}", seed);
            generate_logs(config, &mut StdRng::seed_from_u64(seed))
        }
        None => generate_logs(config, &mut rand::thread_rng()),
    }
}

/// Write records as a pretty-printed JSON array. Returns the file size in bytes.
pub fn write_logs(path: &Path, records: &[LogRecord]) -> anyhow::Result<u64> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, records)
        .with_context(|| format!("Failed to serialize logs to {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("Failed to write {}", path.display()))?;

    let size = std::fs::metadata(path)
        .with_context(|| format!("Failed to stat {}", path.display()))?
        .len();
    info!("Wrote {} records ({} bytes) to {}", records.len(), size, path.display());
    Ok(size)
}

/// Short statistics printed after a generation run.
pub fn write_summary<W: Write>(
    out: &mut W,
    records: &[LogRecord],
    path: &Path,
    file_size: u64,
    color: bool,
) -> std::io::Result<()> {
    use crossterm::style::Color;

    writeln!(
        out,
        "{} Generated {} log entries",
        paint("✔", Color::Green, color),
        records.len()
    )?;
    writeln!(out, "Saved to: {}", path.display())?;

    writeln!(out, "\nSeverity distribution:")?;
    for severity in Severity::ALL {
        let count = records.iter().filter(|r| r.severity == severity).count();
        writeln!(
            out,
            "  {}: {} ({:.1}%)",
            severity,
            count,
            percentage(count, records.len())
        )?;
    }

    if let (Some(first), Some(last)) = (records.first(), records.last()) {
        writeln!(
            out,
            "\nTime range: {} to {}",
            timestamp_format::format(&first.timestamp),
            timestamp_format::format(&last.timestamp)
        )?;
    }

    let apps: HashSet<&str> = records.iter().map(|r| r.application_name.as_str()).collect();
    writeln!(out, "Applications: {} different applications", apps.len())?;
    writeln!(
        out,
        "File size: {} bytes ({:.1} KB)",
        file_size,
        file_size as f64 / 1024.0
    )?;
    Ok(())
}
