/// Errors that stop an audit run.
///
/// Violations are not errors; they travel as [`AuditResult`](super::AuditResult)s.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("image tag is missing from reference image '{0}' (expected repository:tag)")]
    MissingImageTag(String),

    #[error("audit of {0} cancelled after a sibling audit failed")]
    Cancelled(super::KubeType),

    #[error("audit task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl AuditError {
    /// Whether this error was caused by another task failing first.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}
