//! Audit checks.
//!
//! A check is a pure function over one adapted [`Item`]. Object-level checks
//! implement [`Check`] directly; container-level checks implement
//! [`ContainerCheck`] and are lifted to object level with [`PerContainer`].

pub mod automount;
pub mod image;

pub use automount::AutomountServiceAccountTokenCheck;
pub use image::{ImageCheck, ImageRef};

use crate::audit::error::AuditError;
use crate::audit::types::{AuditResult, Violation};
use crate::audit::workload::Item;
use k8s_openapi::api::core::v1::Container;

/// A check run once per workload object.
pub trait Check: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Evaluate one item. A result with error code 0 means nothing to report.
    ///
    /// An `Err` is a configuration problem that makes the whole audit
    /// meaningless, not a property of the item.
    fn check(&self, item: &Item<'_>) -> Result<AuditResult, AuditError>;
}

/// A check run once per container.
pub trait ContainerCheck: Send + Sync {
    fn name(&self) -> &'static str;

    fn check_container(&self, container: &Container) -> Result<Option<Violation>, AuditError>;
}

/// Runs a [`ContainerCheck`] over every container of an item.
///
/// Scanning stops at the first violating container, so each item still
/// yields a single result.
#[derive(Debug, Clone)]
pub struct PerContainer<C>(pub C);

impl<C: ContainerCheck> Check for PerContainer<C> {
    fn name(&self) -> &'static str {
        self.0.name()
    }

    fn check(&self, item: &Item<'_>) -> Result<AuditResult, AuditError> {
        let result = AuditResult::new(item.kube_type(), item.namespace(), item.name());
        for container in item.containers() {
            if let Some(violation) = self.0.check_container(container)? {
                return Ok(result.with_violation(violation));
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::types::KubeType;
    use k8s_openapi::api::core::v1::PodSpec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Flags every container whose name starts with "bad", counting calls.
    struct NamePrefixCheck {
        calls: AtomicUsize,
    }

    impl ContainerCheck for NamePrefixCheck {
        fn name(&self) -> &'static str {
            "name-prefix"
        }

        fn check_container(&self, container: &Container) -> Result<Option<Violation>, AuditError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(container.name.starts_with("bad").then(|| Violation::ImageTagMismatch {
                image: container.name.clone(),
                tag: None,
            }))
        }
    }

    fn container(name: &str) -> Container {
        Container {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_first_violating_container_wins() {
        let spec = PodSpec {
            containers: vec![container("ok"), container("bad-1"), container("bad-2")],
            ..Default::default()
        };
        let item = Item::new(KubeType::Pod, "default", "web", &spec);
        let check = PerContainer(NamePrefixCheck {
            calls: AtomicUsize::new(0),
        });

        let result = check.check(&item).unwrap();
        assert_eq!(
            result.violation,
            Some(Violation::ImageTagMismatch {
                image: "bad-1".to_string(),
                tag: None
            })
        );
        // "bad-2" is never inspected.
        assert_eq!(check.0.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_no_containers_is_clean() {
        let spec = PodSpec::default();
        let item = Item::new(KubeType::Deployment, "default", "empty", &spec);
        let check = PerContainer(NamePrefixCheck {
            calls: AtomicUsize::new(0),
        });
        let result = check.check(&item).unwrap();
        assert_eq!(result.error_code(), 0);
        assert_eq!(result.kube_type, KubeType::Deployment);
    }
}
