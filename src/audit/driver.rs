//! Runs one check over the items of one kind.

use crate::audit::checks::Check;
use crate::audit::error::AuditError;
use crate::audit::reporter::Reporter;
use crate::audit::types::AuditResult;
use crate::audit::workload::Items;
use tokio_util::sync::CancellationToken;

/// Apply `check` to every item and keep the reportable results, in item
/// order.
///
/// The cancellation token is polled between items; once it fires the pass
/// stops with [`AuditError::Cancelled`].
pub fn collect<C>(
    check: &C,
    items: &Items<'_>,
    cancel: &CancellationToken,
) -> Result<Vec<AuditResult>, AuditError>
where
    C: Check + ?Sized,
{
    let mut results = Vec::new();
    for item in items {
        if cancel.is_cancelled() {
            return Err(AuditError::Cancelled(items.kube_type()));
        }
        let result = check.check(item)?;
        if result.is_reportable() {
            results.push(result);
        }
    }
    Ok(results)
}

/// Collect results for one kind and hand them to the reporter.
///
/// The reporter is called exactly once after a complete pass, even when
/// nothing was found. A failed or cancelled pass reports nothing.
pub fn audit<C, R>(
    check: &C,
    items: &Items<'_>,
    reporter: &R,
    cancel: &CancellationToken,
) -> Result<Vec<AuditResult>, AuditError>
where
    C: Check + ?Sized,
    R: Reporter + ?Sized,
{
    log::debug!(
        "running {} over {} {} object(s)",
        check.name(),
        items.len(),
        items.kube_type()
    );
    let results = collect(check, items, cancel)?;
    reporter.report(items.kube_type(), &results);
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::checks::{AutomountServiceAccountTokenCheck, ImageCheck, PerContainer};
    use crate::audit::types::{KubeType, Violation};
    use k8s_openapi::api::core::v1::{Container, Pod, PodSpec};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recording {
        calls: Mutex<Vec<(KubeType, Vec<AuditResult>)>>,
    }

    impl Reporter for Recording {
        fn report(&self, kube_type: KubeType, results: &[AuditResult]) {
            self.calls.lock().push((kube_type, results.to_vec()));
        }
    }

    fn pod(name: &str, service_account: Option<&str>, image: &str) -> Pod {
        Pod {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some("default".to_string()),
                ..Default::default()
            },
            spec: Some(PodSpec {
                service_account_name: service_account.map(str::to_string),
                containers: vec![Container {
                    name: "main".to_string(),
                    image: Some(image.to_string()),
                    ..Default::default()
                }],
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_only_violations_are_collected_in_order() {
        let pods = vec![
            pod("a", None, "nginx:1"),
            pod("b", Some("builder"), "nginx:1"),
            pod("c", None, "nginx:1"),
        ];
        let items = Items::new(&pods);
        let reporter = Recording::default();

        let results = audit(
            &AutomountServiceAccountTokenCheck,
            &items,
            &reporter,
            &CancellationToken::new(),
        )
        .unwrap();

        let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
        assert!(results.iter().all(|r| r.violation == Some(Violation::AutomountTokenDefault)));

        let calls = reporter.calls.lock();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, KubeType::Pod);
        assert_eq!(calls[0].1, results);
    }

    #[test]
    fn test_reporter_called_once_with_empty_slice() {
        let pods: Vec<Pod> = Vec::new();
        let items = Items::new(&pods);
        let reporter = Recording::default();

        let results = audit(
            &PerContainer(ImageCheck::new("nginx:1")),
            &items,
            &reporter,
            &CancellationToken::new(),
        )
        .unwrap();

        assert!(results.is_empty());
        let calls = reporter.calls.lock();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].1.is_empty());
    }

    #[test]
    fn test_fatal_check_error_skips_reporting() {
        let pods = vec![pod("a", None, "nginx:1")];
        let items = Items::new(&pods);
        let reporter = Recording::default();

        let err = audit(
            &PerContainer(ImageCheck::new("nginx")),
            &items,
            &reporter,
            &CancellationToken::new(),
        )
        .unwrap_err();

        assert!(matches!(err, AuditError::MissingImageTag(_)));
        assert!(reporter.calls.lock().is_empty());
    }

    #[test]
    fn test_cancelled_token_stops_pass() {
        let pods = vec![pod("a", None, "nginx:1")];
        let items = Items::new(&pods);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = collect(&AutomountServiceAccountTokenCheck, &items, &cancel).unwrap_err();
        assert!(err.is_cancelled());
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let pods = vec![pod("a", None, "nginx:2"), pod("b", None, "nginx:1")];
        let items = Items::new(&pods);
        let check = PerContainer(ImageCheck::new("nginx:1"));
        let cancel = CancellationToken::new();

        let first = collect(&check, &items, &cancel).unwrap();
        let second = collect(&check, &items, &cancel).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 1);
    }
}
