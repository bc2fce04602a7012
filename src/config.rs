//! Configuration loading and validation.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::blocklist::RefreshSettings;
use crate::error::{ConfigError, Result, ValidationError};

/// Name given to the blocklist built from [`Config::inline`].
pub const INLINE_LIST_NAME: &str = "inline_config";

/// Blocklists to load, in the order they are consulted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Domains blocked directly from the configuration. Consulted first.
    #[serde(default)]
    pub inline: Vec<String>,

    /// Static and dynamic lists, consulted in the order they are written.
    #[serde(default, rename = "list")]
    pub lists: Vec<ListConfig>,
}

/// One `[[list]]` entry, told apart by its `kind` field.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ListConfig {
    /// A list that never changes.
    Static(StaticListConfig),
    /// A list refreshed from a remote rule list.
    Dynamic(DynamicListConfig),
}

impl ListConfig {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Static(list) => &list.name,
            Self::Dynamic(list) => &list.name,
        }
    }
}

/// A list built once at startup, from a file or from literal domains.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StaticListConfig {
    pub name: String,

    /// File holding one domain per line.
    pub path: Option<PathBuf>,

    /// Literal domains.
    pub domains: Option<Vec<String>>,
}

/// A list bootstrapped from `path` and refreshed from `url`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DynamicListConfig {
    pub name: String,

    /// Where the rule list is downloaded from.
    pub url: String,

    /// Where the last downloaded rule list is kept. Must exist at startup.
    pub path: PathBuf,

    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,

    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
}

impl StaticListConfig {
    fn validate(&self) -> std::result::Result<(), ValidationError> {
        match (&self.path, &self.domains) {
            (Some(path), None) if path.as_os_str().is_empty() => Err(ValidationError::EmptyPath {
                name: self.name.clone(),
            }),
            (None, Some(domains)) if domains.is_empty() => Err(ValidationError::EmptyDomains {
                name: self.name.clone(),
            }),
            (Some(_), None) | (None, Some(_)) => Ok(()),
            _ => Err(ValidationError::StaticSource {
                name: self.name.clone(),
            }),
        }
    }
}

impl DynamicListConfig {
    fn validate(&self) -> std::result::Result<(), ValidationError> {
        let name = || self.name.clone();
        if self.url.is_empty() {
            return Err(ValidationError::EmptyUrl { name: name() });
        }
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(ValidationError::InvalidUrl {
                name: name(),
                url: self.url.clone(),
            });
        }
        if self.path.as_os_str().is_empty() {
            return Err(ValidationError::EmptyPath { name: name() });
        }
        if self.refresh_interval_secs == 0 {
            return Err(ValidationError::ZeroRefreshInterval { name: name() });
        }
        if self.fetch_timeout_secs == 0 {
            return Err(ValidationError::ZeroFetchTimeout { name: name() });
        }
        Ok(())
    }

    #[must_use]
    pub const fn refresh_settings(&self) -> RefreshSettings {
        RefreshSettings {
            interval: Duration::from_secs(self.refresh_interval_secs),
            fetch_timeout: Duration::from_secs(self.fetch_timeout_secs),
        }
    }
}

const fn default_refresh_interval() -> u64 {
    60 * 60
}

const fn default_fetch_timeout() -> u64 {
    60
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read, isn't valid TOML, or doesn't pass
    /// validation.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Fails if the content isn't valid TOML or doesn't pass validation.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate().map_err(ConfigError::Validation)?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.inline.is_empty() && self.lists.is_empty() {
            return Err(ValidationError::NoBlocklists);
        }

        let inline = (!self.inline.is_empty()).then_some(INLINE_LIST_NAME);
        let names = inline
            .into_iter()
            .chain(self.lists.iter().map(ListConfig::name));
        let mut seen = HashSet::new();
        for name in names {
            if name.is_empty() {
                return Err(ValidationError::EmptyName);
            }
            if !seen.insert(name) {
                return Err(ValidationError::DuplicateName {
                    name: name.to_string(),
                });
            }
        }

        for list in &self.lists {
            match list {
                ListConfig::Static(list) => list.validate()?,
                ListConfig::Dynamic(list) => list.validate()?,
            }
        }

        Ok(())
    }
}
