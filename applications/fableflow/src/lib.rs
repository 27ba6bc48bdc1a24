//! FableFlow Library
//!
//! Ebook library synchronization: batch imports from a drop directory,
//! quarantine of unusable files, and catalog reconciliation.
//!
//! This library exposes the wiring behind the `fableflow` binary for testing.

pub mod commands;
pub mod config;
pub mod error;
pub mod state;

// Re-export commonly used types for convenience
pub use config::AppConfig;
pub use error::{AppError, Result};
pub use state::AppState;
