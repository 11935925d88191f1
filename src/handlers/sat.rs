//! Handler for `rbac sat`: service account token automounting.

use super::{AuditOptions, load_snapshot, log_summary, object_counts};
use crate::audit::{AuditReport, AutomountServiceAccountTokenCheck, LogReporter, audit_snapshot};
use crate::error::Result;
use std::sync::Arc;

pub async fn handle_sat(options: &AuditOptions) -> Result<AuditReport> {
    let snapshot = load_snapshot(options).await?;
    let counts = object_counts(&snapshot);
    log::info!("auditing {} workload(s) for automounted service account tokens", snapshot.len());

    let report = audit_snapshot(
        snapshot,
        Arc::new(AutomountServiceAccountTokenCheck),
        Arc::new(LogReporter),
    )
    .await?;
    log_summary("rbac sat", &counts, &report);
    Ok(report)
}
