use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use dockconsole::app::App;
use dockconsole::config::Config;
use dockconsole::core::{ConsoleError, RuntimeError};

/// dockconsole - Docker containers and images in the terminal
#[derive(Parser, Debug)]
#[command(name = "dockconsole")]
#[command(about = "A terminal console for Docker containers and images")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<std::path::PathBuf>,

    /// Docker host to connect to
    #[arg(short = 'H', long, value_name = "HOST", env = "DOCKER_HOST")]
    host: Option<String>,

    /// Poll frequency in seconds
    #[arg(long, value_name = "SECONDS")]
    freq: Option<f64>,

    /// Enable debug logging to file
    #[arg(short, long)]
    debug: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };

    // Override config with CLI arguments
    let config = apply_cli_overrides(config, &cli);

    init_logging(&config);

    info!("Starting dockconsole v{}", env!("CARGO_PKG_VERSION"));

    let mut app = match App::new(config).await {
        Ok(app) => app,
        Err(e) => {
            warn!("Could not start: {:#}", e);
            eprintln!("{}", startup_message(&e));
            eprintln!("   Error: {:#}", e);
            std::process::exit(1);
        }
    };
    app.run().await?;

    info!("dockconsole shutting down gracefully");
    Ok(())
}

/// What to tell the user when the session could not be built
fn startup_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<RuntimeError>() {
        Some(runtime) => ConsoleError::Runtime(runtime.clone()).user_message(),
        None => format!("Could not start dockconsole: {}", err),
    }
}

/// Log to a file so the TUI is not polluted
fn init_logging(config: &Config) {
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.logging.file)
        .ok();

    if let Some(file) = log_file {
        tracing_subscriber::fmt()
            .with_env_filter(format!("dockconsole={}", config.logging.level))
            .with_writer(std::sync::Arc::new(file))
            .with_ansi(false)
            .init();
    } else {
        // If can't open log file, disable logging
        tracing_subscriber::fmt().with_env_filter("off").init();
    }
}

fn apply_cli_overrides(mut config: Config, cli: &Cli) -> Config {
    if let Some(host) = &cli.host {
        config.docker.host = Some(host.clone());
    }
    if let Some(freq) = cli.freq {
        config.general.poll_interval_ms = ((freq * 1000.0) as u64).max(100);
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if cli.debug {
        config.logging.level = "debug".to_string();
    }
    config
}
