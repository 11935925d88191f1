//! Handler for `image`: containers that run another tag of a reference image.

use super::{AuditOptions, load_snapshot, log_summary, object_counts};
use crate::audit::{AuditReport, ImageCheck, LogReporter, PerContainer, audit_snapshot};
use crate::error::Result;
use std::sync::Arc;

pub async fn handle_image(options: &AuditOptions, image: &str) -> Result<AuditReport> {
    let snapshot = load_snapshot(options).await?;
    let counts = object_counts(&snapshot);
    log::info!(
        "auditing {} workload(s) against image '{}'",
        snapshot.len(),
        image
    );

    let report = audit_snapshot(
        snapshot,
        Arc::new(PerContainer(ImageCheck::new(image))),
        Arc::new(LogReporter),
    )
    .await?;
    log_summary("image", &counts, &report);
    Ok(report)
}
