//! Nope - DNS blocklist matching.
//!
//! Nope answers one question, fast: is this name on a blocklist? A name is
//! blocked if it equals a listed domain or is a subdomain of one.
//!
//! # Architecture
//!
//! - [`blocklist`]: the matcher, static and self-refreshing lists, list formats
//! - [`registry`]: the ordered set of lists consulted for each query
//! - [`handler`]: block/allow decisions for DNS messages
//! - [`config`]: configuration loading and validation
//! - [`error`]: error types
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use nope::blocklist::StaticList;
//! use nope::registry::Registry;
//!
//! let mut registry = Registry::new();
//! registry.push(Arc::new(StaticList::new("ads", ["ads.example.com"])));
//!
//! assert_eq!(registry.block("tracking.ads.example.com."), Some("ads"));
//! assert_eq!(registry.block("example.com."), None);
//! ```

pub mod blocklist;
pub mod config;
pub mod error;
pub mod handler;
pub mod registry;

pub use config::Config;
pub use error::{Error, Result};
