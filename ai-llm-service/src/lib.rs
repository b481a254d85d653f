//! Hosted model clients shared by the indexer and the answer pipeline.
//!
//! - [`service_profiles::LlmServiceProfiles`] owns one chat client and one
//!   embedding client, built once at startup and shared behind an `Arc`.
//! - [`config::default_config`] builds the model configs from environment
//!   variables (see that module for the full list).
//! - [`error_handler`] holds the unified [`AiLlmError`] and env helpers.

pub mod config;
pub mod error_handler;
pub mod service_profiles;
pub mod services;

pub use error_handler::{AiLlmError, ConfigError, Result};
