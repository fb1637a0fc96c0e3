use anyhow::Result;
use axum::{Router, extract::DefaultBodyLimit};
use clap::Parser;
use config::EnvConfig;
use state::{AppState, SharedState};
use std::{path::PathBuf, sync::Arc};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{debug, info};
use tracing_subscriber::filter::EnvFilter;

mod api;
mod config;
mod error;
mod state;

const API_PREFIX: &str = "/api";
const UPLOADS_URL: &str = "/api/uploads";

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// A yaml file mapping environment names to configuration blocks
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// The environment to load from the configuration file
    #[arg(short, long, default_value = "dev")]
    pub env: String,
}

pub(crate) fn app(state: AppState) -> Router {
    let body_limit = state.config.max_content_length;
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    Router::new()
        .nest(API_PREFIX, api::router(state.storage.dir()).layer(cors))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(body_limit)),
        )
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env("BODEGAWEB_LOG"))
        .init();
    let args = Cli::parse();
    let mut env = match args.config {
        Some(path) => EnvConfig::load(&path, &args.env).await?,
        None => {
            debug!("No configuration file given, using defaults");
            EnvConfig::default()
        }
    };
    env.init()?;
    debug!("using database '{}'", env.database);

    let listen = env.listen.clone();
    let shared_state = Arc::new(SharedState::new(env).await?);
    let listener = tokio::net::TcpListener::bind((listen.host.as_str(), listen.port)).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app(shared_state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Unable to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
