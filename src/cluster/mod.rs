//! Sources of workload snapshots: a live cluster or YAML manifests.

pub mod client;
pub mod manifest;

pub use client::{ClusterClient, ClusterError, ConnectOptions};
pub use manifest::{ManifestError, load_paths, parse_manifest};

use k8s_openapi::api::core::v1::Pod;

/// Drop pods owned by another controller.
pub fn standalone_pods(pods: Vec<Pod>) -> Vec<Pod> {
    pods.into_iter()
        .filter(|pod| {
            pod.metadata
                .owner_references
                .as_ref()
                .is_none_or(|owners| owners.is_empty())
        })
        .collect()
}
