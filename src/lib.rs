//! Nero is a small chat relay in front of Google Gemini and OpenRouter.
//!
//! The crate is organized around a few collaborating layers:
//! - [`core`] owns transcript normalization, behaviour presets, model
//!   routing, provider adapters, reply classification, and configuration.
//! - [`server`] exposes the relay over HTTP (`POST /api/chat`, `GET /health`).
//! - [`client`] talks to a running relay and drives the request lifecycle of
//!   a conversation through [`client::controller`].
//! - [`api`] defines the relay's own wire types plus the upstream payloads.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod client;
pub mod core;
pub mod server;
pub mod utils;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Package version plus the git description when the build had one.
pub fn version_string() -> String {
    match option_env!("VERGEN_GIT_DESCRIBE") {
        Some(describe) if !describe.is_empty() && describe != "unknown" => {
            format!("{VERSION} ({describe})")
        }
        _ => VERSION.to_string(),
    }
}
