//! # kubeaudit
//!
//! Audits Kubernetes workloads (pods, deployments, stateful sets, daemon sets
//! and replication controllers) for insecure or inconsistent settings, either
//! in a live cluster or in YAML manifests.
//!
//! ## Audits
//!
//! - **rbac sat**: workloads that automount a service account token without
//!   naming a service account
//! - **image**: containers running a different tag of a reference image
//!
//! ## Example
//!
//! ```rust,no_run
//! use kubeaudit::handlers::{AuditOptions, handle_sat};
//! use std::path::PathBuf;
//!
//! # async fn run() -> kubeaudit::Result<()> {
//! let options = AuditOptions {
//!     manifests: vec![PathBuf::from("deploy/")],
//!     ..Default::default()
//! };
//! let report = handle_sat(&options).await?;
//! println!("{} result(s)", report.total());
//! # Ok(())
//! # }
//! ```

pub mod audit;
pub mod cli;
pub mod cluster;
pub mod config;
pub mod error;
pub mod handlers;

pub use error::{KubeauditError, Result};
use cli::{Commands, RbacCommand};
use handlers::AuditOptions;

pub async fn run_command(command: Commands, options: &AuditOptions) -> Result<()> {
    match command {
        Commands::Rbac {
            command: RbacCommand::Sat,
        } => handlers::handle_sat(options).await.map(|_| ()),
        Commands::Image { image } => handlers::handle_image(options, &image).await.map(|_| ()),
    }
}
