//! Service account token automount check.

use crate::audit::checks::Check;
use crate::audit::error::AuditError;
use crate::audit::types::{AuditResult, Violation};
use crate::audit::workload::Item;

/// Detects pods that mount a service account token while running as the
/// default service account.
///
/// The deprecated `serviceAccount` field is recorded separately and does not
/// influence the automount outcome.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutomountServiceAccountTokenCheck;

impl Check for AutomountServiceAccountTokenCheck {
    fn name(&self) -> &'static str {
        "automount-service-account-token"
    }

    fn check(&self, item: &Item<'_>) -> Result<AuditResult, AuditError> {
        let mut result = AuditResult::new(item.kube_type(), item.namespace(), item.name());

        if let Some(deprecated) = item.deprecated_service_account() {
            result = result.with_deprecated_service_account(deprecated);
        }
        if let Some(name) = item.service_account_name() {
            result = result.with_service_account_name(name);
        }
        if let Some(violation) = automount_violation(
            item.automount_service_account_token(),
            item.service_account_name(),
        ) {
            result = result.with_violation(violation);
        }

        Ok(result)
    }
}

/// Classify the automount flag against the service account name.
///
/// An unset flag defaults to mounting the token.
pub fn automount_violation(automount: Option<bool>, service_account_name: Option<&str>) -> Option<Violation> {
    if service_account_name.is_some_and(|name| !name.is_empty()) {
        return None;
    }
    match automount {
        Some(true) => Some(Violation::AutomountTokenTrue),
        Some(false) => None,
        None => Some(Violation::AutomountTokenDefault),
    }
}
