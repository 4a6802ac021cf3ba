//! Servertester Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus settings loading and
//! report rendering.

pub mod adapters;
pub mod config;
pub mod report;
pub mod templates;

pub use adapters::ReqwestHttpClient;
pub use config::{ConfigError, ENV_PREFIX, SettingsLoader};
pub use report::{SerializationError, render_text, to_json_stable, to_yaml};
pub use templates::{BuiltinTemplates, FileTemplateSource, parse_http_template};
