mod auth;
mod config;
mod cors;
mod dashboard;
mod errors;
mod functions;
mod goals;
mod mentors;
mod models;
mod profile;
mod recommendations;
mod response;
mod routes;
mod routing;
mod session;
mod state;
mod store;
#[cfg(test)]
mod test_support;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::AuthClient;
use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{postgres::PgStore, rest::RestStore, RowStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let target = env!("CARGO_PKG_NAME").replace('-', "_");
            EnvFilter::new(format!("{target}={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Career API v{}", env!("CARGO_PKG_VERSION"));

    // One HTTP client shared by the row API and token introspection
    let http = reqwest::Client::new();

    let store: Arc<dyn RowStore> = match &config.database_url {
        Some(url) => Arc::new(PgStore::connect(url).await?),
        None => {
            info!("Using REST row API at {}", config.backend_url);
            Arc::new(RestStore::new(
                http.clone(),
                &config.backend_url,
                &config.backend_service_key,
            ))
        }
    };

    let identity = Arc::new(AuthClient::new(
        http,
        &config.backend_url,
        &config.backend_service_key,
    ));

    let state = AppState { store, identity };

    let app = build_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
