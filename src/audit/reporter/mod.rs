//! Reporting of audit results.
//!
//! The driver hands each kind's collected results to a [`Reporter`] once.
//! [`LogReporter`] turns every result into one or more structured log
//! records; the record layout (plain or JSON) is chosen by the formatter
//! installed at startup, see [`format`].

pub mod format;

pub use format::OutputFormat;

use crate::audit::types::{AuditResult, KubeType, Violation};
use log::Level;

/// Consumes the results of one driver invocation.
pub trait Reporter: Send + Sync {
    /// Called exactly once per kind, possibly with an empty slice.
    fn report(&self, kube_type: KubeType, results: &[AuditResult]);
}

/// A single log record derived from a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRecord {
    pub level: Level,
    pub message: &'static str,
    pub fields: Vec<(&'static str, String)>,
}

impl ReportRecord {
    fn new(level: Level, message: &'static str, result: &AuditResult) -> Self {
        Self {
            level,
            message,
            fields: vec![
                ("type", result.kube_type.to_string()),
                ("namespace", result.namespace.clone()),
                ("name", result.name.clone()),
            ],
        }
    }

    fn field(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.fields.push((key, value.into()));
        self
    }

    /// Look up a field value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Build the log records for one result.
///
/// The deprecated-field warning comes first and is emitted regardless of the
/// rule outcome; a rule violation adds one error record.
pub fn records(result: &AuditResult) -> Vec<ReportRecord> {
    let mut records = Vec::new();

    if let Some(deprecated) = &result.deprecated_service_account {
        records.push(
            ReportRecord::new(
                Level::Warn,
                "deprecated serviceAccount detected (sub for serviceAccountName)",
                result,
            )
            .field("serviceAccount", deprecated.as_str())
            .field(
                "serviceAccountName",
                result.service_account_name.clone().unwrap_or_default(),
            ),
        );
    }

    if let Some(violation) = &result.violation {
        let record = ReportRecord::new(Level::Error, violation.message(), result);
        let record = match violation {
            Violation::ImageTagMismatch { image, tag } => record
                .field("image", image.as_str())
                .field("tag", tag.clone().unwrap_or_default()),
            Violation::AutomountTokenTrue | Violation::AutomountTokenDefault => record,
        };
        records.push(record);
    }

    records
}

/// Emits every reportable result as structured `log` records.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl LogReporter {
    fn emit(record: &ReportRecord) {
        let kvs: Vec<(&str, &str)> = record
            .fields
            .iter()
            .map(|(k, v)| (*k, v.as_str()))
            .collect();
        let kvs = kvs.as_slice();

        log::logger().log(
            &log::Record::builder()
                .args(format_args!("{}", record.message))
                .level(record.level)
                .target(module_path!())
                .module_path_static(Some(module_path!()))
                .key_values(&kvs)
                .build(),
        );
    }
}

impl Reporter for LogReporter {
    fn report(&self, kube_type: KubeType, results: &[AuditResult]) {
        log::debug!("reporting {} result(s) for {}", results.len(), kube_type);
        for result in results.iter().filter(|r| r.is_reportable()) {
            for record in records(result) {
                if log::log_enabled!(record.level) {
                    Self::emit(&record);
                }
            }
        }
    }
}
