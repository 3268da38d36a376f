use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use safety_cli::OutputFormat;
use safety_cli::Scenario;
use safety_cli::render;
use safety_cli::run_scenario;
use safety_dashboard::HubConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Runs a scripted safety hub session and prints the resulting dashboard.
#[derive(Parser, Debug)]
#[command(name = "safety-hub", version, about = "Safety hub scenario runner")]
struct Cli {
    /// JSON scenario describing checker responses, counters and input.
    #[arg(long)]
    scenario: PathBuf,

    /// TOML dashboard config. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => HubConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => HubConfig::default(),
    };
    let scenario = Scenario::load(&cli.scenario)?;
    info!(scenario = %cli.scenario.display(), "running scenario");

    let report = run_scenario(&scenario, config).await?;
    println!("{}", render(&report, cli.format)?);
    Ok(())
}
