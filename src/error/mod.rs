//! Typed error surface for the crate.
//!
//! Each concern owns its own `thiserror` enum; [`AppError`] aggregates them
//! for the binary entry point.
mod app;
mod config;
mod listener;
mod plan;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use listener::ListenerError;
pub use plan::PlanError;
