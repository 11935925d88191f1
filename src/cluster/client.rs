//! Kubernetes API access for live audits.
//!
//! # Prerequisites
//!
//! - Valid kubeconfig (default context, a named context, or an explicit file)
//! - RBAC permissions to list pods, deployments, stateful sets, daemon sets
//!   and replication controllers

use crate::audit::{KubeType, Snapshot, Workload};
use crate::cluster::standalone_pods;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, StatefulSet};
use k8s_openapi::api::core::v1::{Pod, ReplicationController};
use kube::{
    Client, Config,
    api::{Api, ListParams},
    config::{KubeConfigOptions, Kubeconfig},
};
use std::path::PathBuf;

/// Error type for cluster operations.
#[derive(Debug, thiserror::Error)]
pub enum ClusterError {
    #[error("Failed to create Kubernetes client: {0}")]
    ClientCreation(#[from] kube::Error),

    #[error("Failed to infer Kubernetes config: {0}")]
    ConfigError(#[from] kube::config::InferConfigError),

    #[error("Failed to read kubeconfig: {0}")]
    KubeconfigError(#[from] kube::config::KubeconfigError),

    #[error("Failed to list {kind}: {source}")]
    List {
        kind: KubeType,
        #[source]
        source: kube::Error,
    },
}

/// How to reach the cluster.
#[derive(Debug, Clone, Default)]
pub struct ConnectOptions {
    /// Explicit kubeconfig file; falls back to `KUBECONFIG`/in-cluster config.
    pub kubeconfig: Option<PathBuf>,
    /// Kubeconfig context; the current context when unset.
    pub context: Option<String>,
}

/// Read-only client for listing workloads.
pub struct ClusterClient {
    client: Client,
}

impl ClusterClient {
    /// Connect using the given kubeconfig options.
    pub async fn connect(options: &ConnectOptions) -> Result<Self, ClusterError> {
        // Install rustls crypto provider (required for TLS connections to K8s API)
        let _ = rustls::crypto::ring::default_provider().install_default();

        let config = match (&options.kubeconfig, &options.context) {
            (None, None) => Config::infer().await?,
            (path, context) => {
                let kubeconfig = match path {
                    Some(path) => Kubeconfig::read_from(path)?,
                    None => Kubeconfig::read()?,
                };
                Config::from_custom_kubeconfig(
                    kubeconfig,
                    &KubeConfigOptions {
                        context: context.clone(),
                        ..Default::default()
                    },
                )
                .await?
            }
        };
        log::debug!("connecting to cluster at {}", config.cluster_url);

        let client = Client::try_from(config)?;
        Ok(Self { client })
    }

    /// List every object of one kind, across all namespaces when
    /// `namespace` is `None`.
    pub async fn list<W: Workload>(&self, namespace: Option<&str>) -> Result<Vec<W>, ClusterError> {
        let api: Api<W> = match namespace {
            Some(ns) => Api::namespaced(self.client.clone(), ns),
            None => Api::all(self.client.clone()),
        };
        let list = api
            .list(&ListParams::default())
            .await
            .map_err(|source| ClusterError::List {
                kind: W::KUBE_TYPE,
                source,
            })?;
        Ok(list.items)
    }

    /// List one kind, logging a failure and treating it as an empty
    /// collection.
    async fn list_or_empty<W: Workload>(&self, namespace: Option<&str>) -> Vec<W> {
        match self.list(namespace).await {
            Ok(items) => {
                log::debug!("fetched {} {} object(s)", items.len(), W::KUBE_TYPE);
                items
            }
            Err(err) => {
                log::error!("{}", err);
                Vec::new()
            }
        }
    }

    /// Fetch every workload kind concurrently.
    ///
    /// A kind whose listing fails contributes nothing; the other kinds are
    /// unaffected. Pods owned by a controller are left out, since they are
    /// audited through their owner.
    pub async fn snapshot(&self, namespace: Option<&str>) -> Snapshot {
        let (pods, deployments, stateful_sets, daemon_sets, replication_controllers) = tokio::join!(
            self.list_or_empty::<Pod>(namespace),
            self.list_or_empty::<Deployment>(namespace),
            self.list_or_empty::<StatefulSet>(namespace),
            self.list_or_empty::<DaemonSet>(namespace),
            self.list_or_empty::<ReplicationController>(namespace),
        );
        Snapshot {
            pods: standalone_pods(pods),
            deployments,
            stateful_sets,
            daemon_sets,
            replication_controllers,
        }
    }
}
