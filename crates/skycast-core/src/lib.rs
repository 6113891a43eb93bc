//! Core building blocks for the Skycast weather dashboard.
//!
//! Provides the typed configuration, shared error types, and the
//! file-backed key-value store that survives restarts.

pub mod config;
pub mod error;
pub mod storage;

pub use config::{ApiConfig, AppConfig, Config, ValidationResult};
pub use error::{ConfigError, StorageError};
pub use storage::LocalStore;

/// Initialize tracing for the application.
///
/// Respects `RUST_LOG`; defaults to `info`.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Skycast core initialized");
}
