use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use jobly_api::auth::password::PasswordHasher;
use jobly_api::auth::TokenService;
use jobly_api::config::AppConfig;
use jobly_api::database::manager::connect;
use jobly_api::{app, AppState};

#[derive(Parser)]
#[command(name = "jobly-api")]
#[command(about = "Jobly REST API server")]
#[command(version)]
struct Args {
    #[arg(long, help = "Port to listen on (overrides config)")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL and SECRET_KEY
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("jobly_api=info,tower_http=info")),
        )
        .init();

    let args = Args::parse();
    let mut config = AppConfig::from_env()?;
    if let Some(port) = args.port {
        config.api.port = port;
    }

    tracing::info!("Starting Jobly API in {:?} mode", config.environment);

    let pool = connect(&config.database).await?;
    let state = AppState {
        pool,
        tokens: Arc::new(TokenService::from_config(&config.security)?),
        passwords: PasswordHasher::new(config.security.password_hash_cost)?,
        config: Arc::new(config),
    };

    let bind_addr = format!("0.0.0.0:{}", state.config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Jobly API listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}
