//! Dripcam command-line tool.

use clap::Parser;
use dripcam::cli::{self, Cli};
use dripcam::{App, Settings, init_observability};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is normal
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();
    debug!(config = ?args.config, "Loading settings");
    let settings = Settings::load(Some(&args.config))?;
    let observability = init_observability("dripcam", &settings.observability)?;

    let app = App::connect(settings)?;
    info!(command = ?args.command, "Running command");

    let stdin = std::io::stdin();
    let result = cli::run(args.command, &app, &mut stdin.lock(), &mut std::io::stdout()).await;

    observability.shutdown();
    result
}
