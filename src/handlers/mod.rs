//! Command handlers.
//!
//! Each handler loads a snapshot, runs one check over it through the fan-out
//! coordinator and hands back the per-kind results.

pub mod image;
pub mod sat;

pub use image::handle_image;
pub use sat::handle_sat;

use crate::audit::{AuditReport, KubeType, Snapshot};
use crate::cli::Cli;
use crate::cluster::{self, ClusterClient, ConnectOptions};
use crate::config::Config;
use crate::error::Result;
use std::path::PathBuf;

/// Where workloads come from, after merging CLI flags over the config file.
#[derive(Debug, Clone, Default)]
pub struct AuditOptions {
    /// Manifest files or directories; a live cluster is queried when empty.
    pub manifests: Vec<PathBuf>,
    /// Only audit this namespace
    pub namespace: Option<String>,
    /// Cluster connection settings
    pub connect: ConnectOptions,
}

impl AuditOptions {
    /// Command-line flags take precedence over `.kubeaudit.toml`.
    pub fn resolve(cli: &Cli, config: &Config) -> Self {
        Self {
            manifests: cli.manifests.clone(),
            namespace: cli
                .namespace
                .clone()
                .or_else(|| config.cluster.namespace.clone()),
            connect: ConnectOptions {
                kubeconfig: cli
                    .kubeconfig
                    .clone()
                    .or_else(|| config.cluster.kubeconfig.clone()),
                context: cli.context.clone().or_else(|| config.cluster.context.clone()),
            },
        }
    }
}

/// Load the workloads to audit from manifests or the cluster.
pub async fn load_snapshot(options: &AuditOptions) -> Result<Snapshot> {
    if !options.manifests.is_empty() {
        let mut snapshot = cluster::load_paths(&options.manifests)?;
        if let Some(namespace) = &options.namespace {
            snapshot.retain_namespace(namespace);
        }
        log::debug!("loaded {} workload(s) from manifests", snapshot.len());
        return Ok(snapshot);
    }

    let client = ClusterClient::connect(&options.connect).await?;
    Ok(client.snapshot(options.namespace.as_deref()).await)
}

/// Objects per kind, taken before the snapshot is handed to the audit.
pub(crate) fn object_counts(snapshot: &Snapshot) -> Vec<(KubeType, usize)> {
    KubeType::ALL
        .iter()
        .map(|kind| (*kind, snapshot.count(*kind)))
        .collect()
}

/// One summary line per kind plus a total.
fn summary_lines(command: &str, counts: &[(KubeType, usize)], report: &AuditReport) -> Vec<String> {
    let mut lines = Vec::with_capacity(counts.len() + 1);
    for (kube_type, objects) in counts {
        lines.push(format!(
            "{}: {} finding(s) in {} {} object(s)",
            command,
            report.get(*kube_type).len(),
            objects,
            kube_type
        ));
    }
    lines.push(format!("{}: {} finding(s) total", command, report.total()));
    lines
}

/// Log the number of findings per kind.
pub(crate) fn log_summary(command: &str, counts: &[(KubeType, usize)], report: &AuditReport) {
    for line in summary_lines(command, counts, report) {
        log::info!("{}", line);
    }
}
