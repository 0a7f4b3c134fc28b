//! OpenTrain Common Library
//!
//! Shared types, error handling and logging for the OpenTrain loader crates.
//!
//! # Overview
//!
//! - **Types**: the stored entities (`Station`, `TrainStop`)
//! - **Error Handling**: `OpentrainError` and the `Result` alias
//! - **Logging**: `tracing` subscriber setup driven by `LogConfig`
//!
//! # Example
//!
//! ```no_run
//! use opentrain_common::logging::{init_logging, LogConfig};
//! use tracing::info;
//!
//! fn main() -> anyhow::Result<()> {
//!     init_logging(&LogConfig::from_env()?)?;
//!     info!("Loader started");
//!     Ok(())
//! }
//! ```
#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{OpentrainError, Result};
pub use types::{Station, TrainStop};
