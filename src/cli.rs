use crate::audit::OutputFormat;
use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "kubeaudit")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Audit Kubernetes workloads for insecure settings")]
#[command(long_about = "Audits the pods, deployments, stateful sets, daemon sets and replication controllers of a live cluster, or of YAML manifests, and reports every workload that violates the selected rule.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file (defaults to ./.kubeaudit.toml, then ~/.kubeaudit.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Path to the kubeconfig file
    #[arg(short = 'c', long, global = true, value_name = "FILE")]
    pub kubeconfig: Option<PathBuf>,

    /// Kubeconfig context to use
    #[arg(long, global = true)]
    pub context: Option<String>,

    /// Only audit workloads in this namespace
    #[arg(short, long, global = true)]
    pub namespace: Option<String>,

    /// Audit YAML manifests (files or directories) instead of a live cluster
    #[arg(short = 'f', long = "manifest", global = true, value_name = "PATH")]
    pub manifests: Vec<PathBuf>,

    /// Enable verbose logging (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Audit RBAC-related workload settings
    Rbac {
        #[command(subcommand)]
        command: RbacCommand,
    },

    /// Audit container images against a reference image
    Image {
        /// Reference image as repository:tag
        #[arg(short, long, default_value = "")]
        image: String,
    },
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RbacCommand {
    /// Find workloads that mount a service account token without naming a service account
    Sat,
}

impl Cli {
    /// Initialize logging based on verbosity level and output layout
    pub fn init_logging(&self, format: OutputFormat) {
        let level = if self.quiet {
            log::LevelFilter::Error
        } else {
            match self.verbose {
                0 => log::LevelFilter::Warn,
                1 => log::LevelFilter::Info,
                2 => log::LevelFilter::Debug,
                _ => log::LevelFilter::Trace,
            }
        };
        let color = format == OutputFormat::Plain && std::io::stdout().is_terminal();

        env_logger::Builder::from_default_env()
            .filter_level(level)
            .target(env_logger::Target::Stdout)
            .format(move |buf, record| format.write(buf, record, color))
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "kubeaudit", "rbac", "sat", "-f", "a.yaml", "-f", "dir", "-n", "prod", "-vv", "--json",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Rbac {
                command: RbacCommand::Sat
            }
        ));
        assert_eq!(cli.manifests, vec![PathBuf::from("a.yaml"), PathBuf::from("dir")]);
        assert_eq!(cli.namespace.as_deref(), Some("prod"));
        assert_eq!(cli.verbose, 2);
        assert!(cli.json);
    }

    #[test]
    fn test_image_defaults_to_empty_reference() {
        let cli = Cli::try_parse_from(["kubeaudit", "image"]).unwrap();
        match cli.command {
            Commands::Image { image } => assert_eq!(image, ""),
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::try_parse_from(["kubeaudit", "image", "-i", "nginx:1.25"]).unwrap();
        match cli.command {
            Commands::Image { image } => assert_eq!(image, "nginx:1.25"),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
