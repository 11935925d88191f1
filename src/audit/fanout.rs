//! Concurrent audit of every workload kind.
//!
//! One blocking task is launched per kind, each owning its collection and
//! its own result vector. Results come back through the task handles; the
//! only shared state is the cancellation token, fired when a task fails so
//! the remaining tasks stop at their next item.

use crate::audit::checks::Check;
use crate::audit::driver;
use crate::audit::error::AuditError;
use crate::audit::reporter::Reporter;
use crate::audit::types::{AuditResult, KubeType};
use crate::audit::workload::{Items, Workload};
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, StatefulSet};
use k8s_openapi::api::core::v1::{Pod, ReplicationController};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// One fetched collection per workload kind.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub pods: Vec<Pod>,
    pub deployments: Vec<Deployment>,
    pub stateful_sets: Vec<StatefulSet>,
    pub daemon_sets: Vec<DaemonSet>,
    pub replication_controllers: Vec<ReplicationController>,
}

impl Snapshot {
    /// Number of objects of the given kind.
    pub fn count(&self, kube_type: KubeType) -> usize {
        match kube_type {
            KubeType::Pod => self.pods.len(),
            KubeType::Deployment => self.deployments.len(),
            KubeType::StatefulSet => self.stateful_sets.len(),
            KubeType::DaemonSet => self.daemon_sets.len(),
            KubeType::ReplicationController => self.replication_controllers.len(),
        }
    }

    pub fn len(&self) -> usize {
        KubeType::ALL.iter().map(|k| self.count(*k)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keep only objects in `namespace`.
    pub fn retain_namespace(&mut self, namespace: &str) {
        fn keep<W: Workload>(list: &mut Vec<W>, namespace: &str) {
            list.retain(|w| w.meta().namespace.as_deref().unwrap_or("default") == namespace);
        }
        keep(&mut self.pods, namespace);
        keep(&mut self.deployments, namespace);
        keep(&mut self.stateful_sets, namespace);
        keep(&mut self.daemon_sets, namespace);
        keep(&mut self.replication_controllers, namespace);
    }

    /// Merge another snapshot into this one, preserving order.
    pub fn extend(&mut self, other: Snapshot) {
        self.pods.extend(other.pods);
        self.deployments.extend(other.deployments);
        self.stateful_sets.extend(other.stateful_sets);
        self.daemon_sets.extend(other.daemon_sets);
        self.replication_controllers.extend(other.replication_controllers);
    }
}

/// Reportable results of a complete audit, grouped by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditReport {
    results: BTreeMap<KubeType, Vec<AuditResult>>,
}

impl AuditReport {
    /// Results for one kind, in that kind's list order.
    pub fn get(&self, kube_type: KubeType) -> &[AuditResult] {
        self.results.get(&kube_type).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn total(&self) -> usize {
        self.results.values().map(Vec::len).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.total() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (KubeType, &[AuditResult])> {
        self.results.iter().map(|(k, v)| (*k, v.as_slice()))
    }
}

type TaskOutput = (KubeType, Result<Vec<AuditResult>, AuditError>);

fn spawn_kind<W, C, R>(
    tasks: &mut JoinSet<TaskOutput>,
    list: Vec<W>,
    check: &Arc<C>,
    reporter: &Arc<R>,
    cancel: &CancellationToken,
) where
    W: Workload,
    C: Check + ?Sized + 'static,
    R: Reporter + ?Sized + 'static,
{
    let check = Arc::clone(check);
    let reporter = Arc::clone(reporter);
    let cancel = cancel.clone();
    tasks.spawn_blocking(move || {
        let items = Items::new(&list);
        let outcome = driver::audit(check.as_ref(), &items, reporter.as_ref(), &cancel);
        (W::KUBE_TYPE, outcome)
    });
}

/// Audit every kind in `snapshot` concurrently and wait for all of them.
///
/// The first failing task cancels the others and its error is returned once
/// every task has finished. A panicking task surfaces as
/// [`AuditError::Task`].
pub async fn audit_snapshot<C, R>(
    snapshot: Snapshot,
    check: Arc<C>,
    reporter: Arc<R>,
) -> Result<AuditReport, AuditError>
where
    C: Check + ?Sized + 'static,
    R: Reporter + ?Sized + 'static,
{
    let Snapshot {
        pods,
        deployments,
        stateful_sets,
        daemon_sets,
        replication_controllers,
    } = snapshot;

    let cancel = CancellationToken::new();
    let mut tasks = JoinSet::new();
    spawn_kind(&mut tasks, stateful_sets, &check, &reporter, &cancel);
    spawn_kind(&mut tasks, daemon_sets, &check, &reporter, &cancel);
    spawn_kind(&mut tasks, pods, &check, &reporter, &cancel);
    spawn_kind(&mut tasks, replication_controllers, &check, &reporter, &cancel);
    spawn_kind(&mut tasks, deployments, &check, &reporter, &cancel);

    let mut report = AuditReport::default();
    let mut failure: Option<AuditError> = None;

    while let Some(joined) = tasks.join_next().await {
        let outcome = match joined {
            Ok((kube_type, Ok(results))) => {
                report.results.insert(kube_type, results);
                continue;
            }
            Ok((_, Err(err))) => err,
            Err(join_err) => AuditError::from(join_err),
        };
        if outcome.is_cancelled() {
            continue;
        }
        cancel.cancel();
        if failure.is_none() {
            failure = Some(outcome);
        } else {
            log::debug!("additional audit failure: {}", outcome);
        }
    }

    match failure {
        Some(err) => Err(err),
        None => Ok(report),
    }
}
