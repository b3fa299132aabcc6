//! `vacation-engine` server binary.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use vacation_engine::api::{AppState, create_router};
use vacation_engine::clock::SystemClock;
use vacation_engine::config::ConfigLoader;
use vacation_engine::error::{EngineError, EngineResult};
use vacation_engine::store::MemoryStore;
use vacation_engine::telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "vacation-engine",
    about = "Serve the vacation period engine over HTTP",
    version
)]
struct Cli {
    /// Directory holding policy.yaml and employment_types.yaml
    #[arg(long, env = "VACATION_CONFIG_DIR", default_value = "./config/clt")]
    config_dir: PathBuf,
    /// Address to bind
    #[arg(long, env = "VACATION_HOST", default_value = "127.0.0.1")]
    host: String,
    /// Port to bind
    #[arg(long, env = "VACATION_PORT", default_value_t = 3000)]
    port: u16,
    /// Log filter used when RUST_LOG is unset
    #[arg(long, env = "VACATION_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

async fn run(cli: Cli) -> EngineResult<()> {
    telemetry::init(&cli.log_level)?;

    let config = ConfigLoader::load(&cli.config_dir)?;
    info!(
        policy = %config.metadata().code,
        config_dir = %cli.config_dir.display(),
        "Loaded vacation policy"
    );

    let addr: SocketAddr = format!("{}:{}", cli.host, cli.port)
        .parse()
        .map_err(|e| EngineError::InvalidConfig {
            message: format!("invalid listen address {}:{}: {}", cli.host, cli.port, e),
        })?;

    let state = AppState::new(config, MemoryStore::new(), Arc::new(SystemClock));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "vacation engine ready");

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    if let Err(err) = run(Cli::parse()).await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}
