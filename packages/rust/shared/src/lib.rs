//! Shared types, error model, and configuration for SourceBrief.
//!
//! This crate is the foundation depended on by all other SourceBrief crates.
//! It provides:
//! - [`SourceBriefError`] — the unified error type
//! - Domain types ([`SourceLocation`], [`CondensedAnswer`], [`SessionLog`])
//! - Configuration ([`AppConfig`], [`RetrievalConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, RetrievalConfig, SearchConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from, validate_brave_api_key,
};
pub use error::{Result, SourceBriefError};
pub use types::{CondensedAnswer, LogEntry, LogOutcome, SessionLog, SourceLocation};
