//! Ikasnova · Learning Situation Generator Backend
//!
//! - Axum HTTP + WebSocket API
//! - Gemini structured-output generation (via environment variables)
//! - Server-rendered view/edit document, Markdown and PDF export
//! - Static shell fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT                 : u16 (default 3000)
//!   GEMINI_API_KEY       : Gemini credential (falls back to API_KEY)
//!   GEMINI_BASE_URL      : default "https://generativelanguage.googleapis.com/v1beta"
//!   GEMINI_MODEL         : default "gemini-2.5-flash"
//!   GEMINI_TEMPERATURE   : default 0.4
//!   GEMINI_TIMEOUT_SECS  : default 120
//!   DEFAULT_LANGUAGE     : "es" (default) or "eu"
//!   IKASNOVA_CONFIG_PATH : path to TOML config (prompt overrides)
//!   LOG_LEVEL            : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT           : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod i18n;
mod config;
mod gemini;
mod render;
mod export;
mod controller;
mod state;
mod protocol;
mod logic;
mod routes;
#[cfg(test)]
mod testing;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Shared application state (Gemini client, prompts, default language).
  let state = Arc::new(AppState::from_env()?);

  let app = build_router(state);

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "ikasnova_backend", %addr, "HTTP server listening");
  axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
  info!(target: "ikasnova_backend", "HTTP server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(target: "ikasnova_backend", error = %e, "Failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
  info!(target: "ikasnova_backend", "Shutdown signal received");
}
