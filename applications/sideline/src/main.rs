/// Sideline - console soundboard
use clap::Parser;
use sideline::{console, LoggingRemoteProvider, SidelineConfig, Soundboard};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sideline")]
#[command(about = "Letter/category soundboard console", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "SIDELINE_CONFIG")]
    config: Option<PathBuf>,

    /// Read commands from a file instead of stdin
    #[arg(short, long)]
    script: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => SidelineConfig::load_from(path)?,
        None => SidelineConfig::load()?,
    };

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!(
        database = %config.storage.database_url,
        sample_rate = config.engine.sample_rate,
        "starting sideline"
    );

    let board = Soundboard::open_with_config(&config).await?;
    board
        .set_remote_provider(Arc::new(LoggingRemoteProvider::new()))
        .await;
    let clock = board.spawn_clock(config.tick());

    let result = match &cli.script {
        Some(path) => {
            let file = tokio::fs::File::open(path).await?;
            console::run(&board, BufReader::new(file), tokio::io::stdout()).await
        }
        None => {
            console::run(&board, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await
        }
    };

    clock.abort();
    board.shutdown().await;
    tracing::info!("sideline stopped");
    result?;
    Ok(())
}
