use anyhow::Context;
use clap::Parser;
use kubeaudit::{
    audit::OutputFormat,
    cli::Cli,
    config::{self, Config},
    handlers::AuditOptions,
};
use std::process;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logging layout depends on the config file, so load it first
    let config = config::load_config(cli.config.as_deref());
    let json = cli.json || config.as_ref().is_ok_and(|c| c.output.json);
    cli.init_logging(OutputFormat::from_json_flag(json));

    let result = match config {
        Ok(config) => run(cli, config).await,
        Err(e) => Err(anyhow::Error::new(e).context("Failed to load configuration")),
    };

    if let Err(e) = result {
        log::error!("{:#}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    let options = AuditOptions::resolve(&cli, &config);
    kubeaudit::run_command(cli.command, &options)
        .await
        .context("Audit failed")
}
