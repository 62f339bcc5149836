use std::sync::Arc;

use axum::{
  routing::{get, post},
  Router,
};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod cookies;
mod error;
mod extract;
mod extractor;
mod format;
mod quality;
mod selection;

pub use error::{Error, Result};

use crate::{config::Config, extract::AppState, extractor::Ytdlp};

#[tokio::main]
async fn main() -> Result<()> {
  init_logging();

  let config = Config::from_env()?;
  info!(
    policy = ?config.policy,
    cookie_domains = ?config.cookie_domains,
    ytdlp = %config.ytdlp_path,
    concurrency = config.ytdlp_concurrency,
    "configuration loaded"
  );

  let extractor = Ytdlp::new(
    config.ytdlp_path.clone(),
    config.ytdlp_concurrency,
    config.ytdlp_proxy.clone(),
  );
  let state =
    AppState::new(Arc::new(extractor), config.policy, config.cookie_domains);

  info!("listening on {}", config.listen_addr);

  axum::Server::bind(&config.listen_addr)
    .serve(app(state).into_make_service())
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| Error::Server(e.to_string()))?;

  info!("server stopped");
  Ok(())
}

pub fn app(state: AppState) -> Router {
  Router::new()
    .route("/health", get(health))
    .route("/extract", post(extract::extract))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

fn init_logging() {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "stream_extract=info,tower_http=info".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::warn!("failed to listen for shutdown signal: {}", e);
    std::future::pending::<()>().await;
  }
  info!("shutting down");
}

async fn health() -> &'static str {
  "ok"
}
