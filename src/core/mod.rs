pub mod adapters;
pub mod builtin_models;
pub mod builtin_presets;
pub mod config;
pub mod error;
pub mod message;
pub mod models;
pub mod preset;
pub mod reply;
pub mod router;
pub mod transcript;
