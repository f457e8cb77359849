//! Core types, configuration, and error handling for the vigil pipeline.
//!
//! This crate provides the shared foundation used by the other vigil crates:
//! - [`VigilError`] — unified error type using `thiserror`
//! - [`VigilConfig`] — configuration loaded from `.vigil.toml`
//! - Shared types: [`PullRequestContext`], [`ReviewComment`]

mod config;
mod error;
mod types;

pub use config::{LlmConfig, ReviewConfig, VigilConfig};
pub use error::VigilError;
pub use types::{PullRequestContext, ReviewComment};

/// A convenience `Result` type for vigil operations.
pub type Result<T> = std::result::Result<T, VigilError>;
