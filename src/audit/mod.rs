//! The audit engine.
//!
//! Checks run uniformly over every workload kind that owns a pod spec:
//!
//! ```text
//! Snapshot ──► fanout (one task per kind)
//!                 │
//!                 ├─► Items (adapted objects) ──► driver ──► Check
//!                 │                                  │
//!                 │                                  └──► Reporter (once per kind)
//!                 └─► AuditReport
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use kubeaudit::audit::{self, AutomountServiceAccountTokenCheck, LogReporter, Snapshot};
//! use std::sync::Arc;
//!
//! let report = audit::audit_snapshot(
//!     snapshot,
//!     Arc::new(AutomountServiceAccountTokenCheck),
//!     Arc::new(LogReporter),
//! )
//! .await?;
//! println!("{} violation(s)", report.total());
//! ```

pub mod checks;
pub mod driver;
pub mod error;
pub mod fanout;
pub mod reporter;
pub mod types;
pub mod workload;

pub use checks::{AutomountServiceAccountTokenCheck, Check, ContainerCheck, ImageCheck, PerContainer};
pub use error::AuditError;
pub use fanout::{AuditReport, Snapshot, audit_snapshot};
pub use reporter::{LogReporter, OutputFormat, Reporter};
pub use types::{AuditResult, KubeType, Violation};
pub use workload::{Item, Items, Workload};
