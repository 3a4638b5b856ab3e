//! Shared types, error model, and configuration for Scout.
//!
//! This crate is the foundation depended on by all other Scout crates.
//! It provides:
//! - [`ScoutError`]: the unified error type
//! - Domain types ([`TimeRange`], [`Evidence`], [`Roster`], [`Section`], [`Badge`])
//! - Configuration ([`AppConfig`], [`Settings`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, Credentials, ModelConfig, OutputConfig, ProviderEndpoint, ReportConfig,
    SearchConfig, ServerConfig, Settings, SpeechConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from,
};
pub use error::{Result, ScoutError};
pub use types::{Badge, Evidence, Roster, RunId, SearchMode, SearchTopic, Section, TimeRange};
