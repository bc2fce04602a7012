//! Error types for nope.

use std::io;

use thiserror::Error;

use crate::blocklist::dynamic::DynamicListError;
use crate::blocklist::loader::LoadError;

/// Main error type for nope operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to load static blocklist {name:?}")]
    StaticList {
        name: String,
        #[source]
        source: LoadError,
    },

    #[error(transparent)]
    DynamicList(#[from] DynamicListError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadFile(#[source] io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
}

/// Validation errors for configuration values.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("no blocklists configured")]
    NoBlocklists,

    #[error("blocklist name cannot be empty")]
    EmptyName,

    #[error("duplicate blocklist name: {name:?}")]
    DuplicateName { name: String },

    #[error("static blocklist {name:?} needs exactly one of `path` or `domains`")]
    StaticSource { name: String },

    #[error("static blocklist {name:?} has no domains")]
    EmptyDomains { name: String },

    #[error("blocklist {name:?} has empty file path")]
    EmptyPath { name: String },

    #[error("blocklist {name:?} has empty URL")]
    EmptyUrl { name: String },

    #[error("blocklist {name:?} has invalid URL (must start with http:// or https://): {url:?}")]
    InvalidUrl { name: String, url: String },

    #[error("blocklist {name:?}: refresh_interval_secs must be greater than 0")]
    ZeroRefreshInterval { name: String },

    #[error("blocklist {name:?}: fetch_timeout_secs must be greater than 0")]
    ZeroFetchTimeout { name: String },
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;
