pub mod company;
pub mod config;
pub mod documents;
pub mod errors;
pub mod google_auth;
mod lenient;
pub mod llm_client;
pub mod routes;
pub mod scoring;
pub mod state;
pub mod web;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global tracing subscriber. `RUST_LOG` in the environment wins
/// over the configured level.
pub fn init_tracing(rust_log: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
