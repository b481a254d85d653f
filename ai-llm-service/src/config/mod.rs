//! Model configuration: providers, per-model settings, env-driven defaults.

pub mod default_config;
pub mod env_source;
pub mod llm_model_config;
pub mod llm_provider;
