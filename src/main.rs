use email_hunter::config::load_config;
use email_hunter::models::{CliApp, CliResult};
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> CliResult<()> {
    dotenv::dotenv().ok();

    let config = load_config("config.yml").await;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("email_hunter={}", config.logging.level))),
        )
        .init();

    tokio::fs::create_dir_all(&config.output.directory).await?;

    let app = CliApp::new(config)?;

    tokio::select! {
        result = app.run() => {
            result?;
        }
        _ = signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    }

    Ok(())
}
