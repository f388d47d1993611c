//! Tracing setup. `LOG_LEVEL` overrides `DEFAULT_FILTER`; `LOG_FORMAT=json`
//! switches to structured output. Log targets: `generation` for model calls,
//! `session` for the WebSocket state machine, `ikasnova_backend` for startup
//! and exports.

use tracing_subscriber::EnvFilter;

/// Used when LOG_LEVEL is unset or unparsable.
pub const DEFAULT_FILTER: &str =
    "info,generation=debug,session=debug,ikasnova_backend=debug,tower_http=info,axum=info";

pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => {
            builder.json().init();
        }
        _ => {
            builder.init();
        }
    }
}
