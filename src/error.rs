use std::path::PathBuf;
use thiserror::Error;

pub use crate::audit::AuditError;
pub use crate::cluster::{ClusterError, ManifestError};

#[derive(Error, Debug)]
pub enum KubeauditError {
    #[error(transparent)]
    Audit(#[from] AuditError),

    #[error("Cluster error: {0}")]
    Cluster(#[from] ClusterError),

    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, KubeauditError>;
