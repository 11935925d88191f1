//! Core types for the audit engine.
//!
//! - `KubeType` - the workload kinds the engine knows how to adapt
//! - `Violation` - a single rule failure found by a check
//! - `AuditResult` - the normalized per-object outcome of one check

use serde::{Deserialize, Serialize};
use std::fmt;

/// Workload-owning resource kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum KubeType {
    Pod,
    Deployment,
    StatefulSet,
    DaemonSet,
    ReplicationController,
}

impl KubeType {
    /// Every kind, in the order the coordinator launches them.
    pub const ALL: [KubeType; 5] = [
        KubeType::StatefulSet,
        KubeType::DaemonSet,
        KubeType::Pod,
        KubeType::ReplicationController,
        KubeType::Deployment,
    ];

    /// Parse a kind from its Kubernetes `kind` string.
    pub fn from_kind(kind: &str) -> Option<Self> {
        match kind {
            "Pod" => Some(Self::Pod),
            "Deployment" => Some(Self::Deployment),
            "StatefulSet" => Some(Self::StatefulSet),
            "DaemonSet" => Some(Self::DaemonSet),
            "ReplicationController" => Some(Self::ReplicationController),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pod => "Pod",
            Self::Deployment => "Deployment",
            Self::StatefulSet => "StatefulSet",
            Self::DaemonSet => "DaemonSet",
            Self::ReplicationController => "ReplicationController",
        }
    }
}

impl fmt::Display for KubeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rule failure recorded by a check.
///
/// Each variant maps to the check-specific error code reported alongside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Violation {
    /// `automountServiceAccountToken: true` with no `serviceAccountName`.
    AutomountTokenTrue,
    /// `automountServiceAccountToken` unset (mounted by default) with no
    /// `serviceAccountName`.
    AutomountTokenDefault,
    /// A container runs the reference repository with a different tag, or
    /// with no tag at all.
    ImageTagMismatch {
        image: String,
        tag: Option<String>,
    },
}

impl Violation {
    /// The error code for this violation within its check.
    pub fn code(&self) -> u8 {
        match self {
            Self::AutomountTokenTrue => 2,
            Self::AutomountTokenDefault => 3,
            Self::ImageTagMismatch { .. } => 1,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::AutomountTokenTrue => {
                "automountServiceAccountToken = true with no serviceAccountName"
            }
            Self::AutomountTokenDefault => {
                "automountServiceAccountToken nil (mounted by default) with no serviceAccountName"
            }
            Self::ImageTagMismatch { .. } => "container image tag does not match the reference",
        }
    }
}

/// Error code carried by a result that only uses the deprecated
/// `serviceAccount` field.
pub const DEPRECATED_SERVICE_ACCOUNT_CODE: u8 = 1;

/// The outcome of running one check against one workload object.
///
/// Results are built by checks and never modified once the driver has
/// collected them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditResult {
    pub kube_type: KubeType,
    pub namespace: String,
    pub name: String,
    /// The highest-precedence rule failure, if any.
    pub violation: Option<Violation>,
    /// Value of the deprecated `serviceAccount` field, when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated_service_account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_account_name: Option<String>,
}

impl AuditResult {
    /// A clean result for an object.
    pub fn new(kube_type: KubeType, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kube_type,
            namespace: namespace.into(),
            name: name.into(),
            violation: None,
            deprecated_service_account: None,
            service_account_name: None,
        }
    }

    pub fn with_violation(mut self, violation: Violation) -> Self {
        self.violation = Some(violation);
        self
    }

    pub fn with_deprecated_service_account(mut self, name: impl Into<String>) -> Self {
        self.deprecated_service_account = Some(name.into());
        self
    }

    pub fn with_service_account_name(mut self, name: impl Into<String>) -> Self {
        self.service_account_name = Some(name.into());
        self
    }

    /// Numeric error code; 0 means nothing to report.
    ///
    /// A rule violation takes precedence over the deprecated-field warning,
    /// which is still reported on its own record.
    pub fn error_code(&self) -> u8 {
        match (&self.violation, &self.deprecated_service_account) {
            (Some(violation), _) => violation.code(),
            (None, Some(_)) => DEPRECATED_SERVICE_ACCOUNT_CODE,
            (None, None) => 0,
        }
    }

    pub fn is_reportable(&self) -> bool {
        self.error_code() > 0
    }

    /// `namespace/name`, or just `name` for objects without a namespace.
    pub fn object_identifier(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.namespace, self.name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kube_type_round_trips_kind_strings() {
        for kind in KubeType::ALL {
            assert_eq!(KubeType::from_kind(kind.as_str()), Some(kind));
        }
        assert_eq!(KubeType::from_kind("CronJob"), None);
    }

    #[test]
    fn test_clean_result_has_zero_code() {
        let result = AuditResult::new(KubeType::Pod, "default", "web");
        assert_eq!(result.error_code(), 0);
        assert!(!result.is_reportable());
    }

    #[test]
    fn test_deprecated_field_alone_is_reportable() {
        let result =
            AuditResult::new(KubeType::Pod, "default", "web").with_deprecated_service_account("sa");
        assert_eq!(result.error_code(), DEPRECATED_SERVICE_ACCOUNT_CODE);
        assert!(result.is_reportable());
    }

    #[test]
    fn test_violation_code_wins_over_deprecated_field() {
        let result = AuditResult::new(KubeType::Deployment, "prod", "api")
            .with_deprecated_service_account("legacy")
            .with_violation(Violation::AutomountTokenDefault);
        assert_eq!(result.error_code(), 3);
    }

    #[test]
    fn test_object_identifier() {
        let namespaced = AuditResult::new(KubeType::Pod, "kube-system", "dns");
        assert_eq!(namespaced.object_identifier(), "kube-system/dns");
        let bare = AuditResult::new(KubeType::Pod, "", "dns");
        assert_eq!(bare.object_identifier(), "dns");
    }
}
