//! The ordered set of blocklists consulted for every query.

use std::sync::Arc;

use crate::blocklist::order::canonicalize;
use crate::blocklist::{Blocker, DynamicList, RefreshHandle, StaticList};
use crate::config::{
    Config, DynamicListConfig, INLINE_LIST_NAME, ListConfig, StaticListConfig,
};
use crate::error::{ConfigError, Error, Result};

/// Blocklists in the order they are consulted.
///
/// Any match blocks; the order only decides which list gets reported.
/// Dynamic lists keep refreshing in the background until
/// [`shutdown`](Self::shutdown) is called.
#[derive(Default)]
pub struct Registry {
    blockers: Vec<Arc<dyn Blocker>>,
    refreshers: Vec<RefreshHandle>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build every blocklist named in `config`, in order.
    ///
    /// Inline domains come first, then every `[[list]]` entry in the order
    /// it was written.
    ///
    /// # Errors
    ///
    /// Fails if `config` doesn't pass validation, or on the first list that
    /// cannot be built. Refresh loops already started for earlier dynamic
    /// lists are stopped before returning.
    pub async fn from_config(config: &Config) -> Result<Self> {
        config.validate().map_err(ConfigError::Validation)?;

        let mut registry = Self::new();
        if let Err(err) = registry.load(config).await {
            registry.shutdown().await;
            return Err(err);
        }
        Ok(registry)
    }

    async fn load(&mut self, config: &Config) -> Result<()> {
        if !config.inline.is_empty() {
            let list = StaticList::new(INLINE_LIST_NAME, &config.inline);
            tracing::info!(name = INLINE_LIST_NAME, count = list.len(), "loaded inline blocklist");
            self.push(Arc::new(list));
        }

        for source in &config.lists {
            match source {
                ListConfig::Static(source) => self.load_static(source).await?,
                ListConfig::Dynamic(source) => self.load_dynamic(source).await?,
            }
        }

        Ok(())
    }

    async fn load_static(&mut self, source: &StaticListConfig) -> Result<()> {
        let list = match (&source.path, &source.domains) {
            (Some(path), _) => StaticList::from_file(source.name.as_str(), path)
                .await
                .map_err(|err| Error::StaticList {
                    name: source.name.clone(),
                    source: err,
                })?,
            (None, domains) => {
                StaticList::new(source.name.as_str(), domains.iter().flatten())
            }
        };
        tracing::info!(name = ?source.name, count = list.len(), "loaded static blocklist");
        self.push(Arc::new(list));
        Ok(())
    }

    async fn load_dynamic(&mut self, source: &DynamicListConfig) -> Result<()> {
        let (list, handle) = DynamicList::open(
            source.name.as_str(),
            source.url.as_str(),
            &source.path,
            source.refresh_settings(),
        )
        .await?;
        tracing::info!(
            name = ?source.name,
            count = list.len(),
            path = ?source.path,
            url = %source.url,
            "loaded dynamic blocklist, will refresh in background"
        );
        self.push_dynamic(list, handle);
        Ok(())
    }

    /// Append a blocker.
    pub fn push(&mut self, blocker: Arc<dyn Blocker>) {
        self.blockers.push(blocker);
    }

    /// Append a dynamic list, taking ownership of its refresh loop.
    pub fn push_dynamic(&mut self, list: Arc<DynamicList>, handle: RefreshHandle) {
        self.blockers.push(list);
        self.refreshers.push(handle);
    }

    /// Returns the name of the first blocklist that blocks `host`.
    #[must_use]
    pub fn block(&self, host: &str) -> Option<&str> {
        let host = canonicalize(host);
        self.blockers
            .iter()
            .find(|blocker| blocker.block(&host))
            .map(|blocker| blocker.name())
    }

    /// Returns true if every blocklist is ready.
    #[must_use]
    pub fn ready(&self) -> bool {
        self.blockers.iter().all(|blocker| blocker.ready())
    }

    #[must_use]
    pub fn blockers(&self) -> &[Arc<dyn Blocker>] {
        &self.blockers
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.blockers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blockers.is_empty()
    }

    /// Stop every refresh loop. Lists stay usable.
    pub async fn shutdown(&mut self) {
        for handle in self.refreshers.drain(..) {
            handle.shutdown().await;
        }
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field(
                "blockers",
                &self.blockers.iter().map(|b| b.name()).collect::<Vec<_>>(),
            )
            .field("refreshers", &self.refreshers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use std::io::Write;
    use std::path::Path;
    use tempfile::{NamedTempFile, TempDir};

    fn literal(name: &str, domains: &[&str]) -> ListConfig {
        ListConfig::Static(StaticListConfig {
            name: name.to_string(),
            path: None,
            domains: Some(domains.iter().map(ToString::to_string).collect()),
        })
    }

    fn dynamic(name: &str, path: &Path) -> ListConfig {
        ListConfig::Dynamic(DynamicListConfig {
            name: name.to_string(),
            url: format!("http://127.0.0.1:1/{name}.txt"),
            path: path.to_path_buf(),
            refresh_interval_secs: 3600,
            fetch_timeout_secs: 60,
        })
    }

    #[tokio::test]
    async fn should_report_first_matching_blocker() {
        let config = Config {
            inline: vec!["inline.example.com".to_string()],
            lists: vec![
                literal("first", &["example.com"]),
                literal("second", &["ads.example.com", "tracker.net"]),
            ],
        };
        let registry = Registry::from_config(&config).await.unwrap();

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.block("inline.example.com."), Some(INLINE_LIST_NAME));
        assert_eq!(registry.block("ads.example.com."), Some("first"));
        assert_eq!(registry.block("tracker.net."), Some("second"));
        assert_eq!(registry.block("example.org."), None);
    }

    #[tokio::test]
    async fn should_consult_lists_in_written_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("remote.txt");
        std::fs::write(&path, "||ads.example.com^\n").unwrap();

        let config = Config {
            lists: vec![
                dynamic("remote", &path),
                literal("local", &["ads.example.com"]),
            ],
            ..Config::default()
        };
        let mut registry = Registry::from_config(&config).await.unwrap();

        let names: Vec<_> = registry.blockers().iter().map(|b| b.name()).collect();
        assert_eq!(names, ["remote", "local"]);
        assert_eq!(registry.block("x.ads.example.com."), Some("remote"));
        registry.shutdown().await;

        let config = Config {
            lists: vec![
                literal("local", &["ads.example.com"]),
                dynamic("remote", &path),
            ],
            ..Config::default()
        };
        let mut registry = Registry::from_config(&config).await.unwrap();

        assert_eq!(registry.block("x.ads.example.com."), Some("local"));
        registry.shutdown().await;
    }

    #[test]
    fn should_canonicalize_query_once() {
        let mut registry = Registry::new();
        registry.push(Arc::new(StaticList::new("list", ["example.com"])));

        assert_eq!(registry.block("WWW.Example.Com"), Some("list"));
    }

    #[tokio::test]
    async fn should_load_static_list_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "file.example.com").unwrap();
        file.flush().unwrap();

        let config = Config {
            lists: vec![ListConfig::Static(StaticListConfig {
                name: "file".to_string(),
                path: Some(file.path().to_path_buf()),
                domains: None,
            })],
            ..Config::default()
        };
        let registry = Registry::from_config(&config).await.unwrap();

        assert_eq!(registry.block("a.file.example.com."), Some("file"));
        assert!(registry.ready());
    }

    #[tokio::test]
    async fn should_fail_when_static_file_is_missing() {
        let config = Config {
            lists: vec![ListConfig::Static(StaticListConfig {
                name: "missing".to_string(),
                path: Some("/nonexistent/list.txt".into()),
                domains: None,
            })],
            ..Config::default()
        };

        let result = Registry::from_config(&config).await;
        assert!(matches!(result, Err(Error::StaticList { name, .. }) if name == "missing"));
    }

    #[tokio::test]
    async fn should_validate_config_built_in_code() {
        let neither = Config {
            lists: vec![ListConfig::Static(StaticListConfig {
                name: "empty".to_string(),
                path: None,
                domains: None,
            })],
            ..Config::default()
        };
        let both = Config {
            lists: vec![ListConfig::Static(StaticListConfig {
                name: "both".to_string(),
                path: Some("/etc/nope/local.txt".into()),
                domains: Some(vec!["a.com".to_string()]),
            })],
            ..Config::default()
        };

        for config in [neither, both] {
            let result = Registry::from_config(&config).await;
            assert!(matches!(
                result,
                Err(Error::Config(ConfigError::Validation(
                    ValidationError::StaticSource { .. }
                )))
            ));
        }

        let result = Registry::from_config(&Config::default()).await;
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::Validation(
                ValidationError::NoBlocklists
            )))
        ));
    }

    #[tokio::test]
    async fn should_fail_when_dynamic_bootstrap_is_missing() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("good.txt");
        std::fs::write(&good, "||good.example.com^\n").unwrap();

        let config = Config {
            lists: vec![
                dynamic("good", &good),
                dynamic("bad", &dir.path().join("missing.txt")),
            ],
            ..Config::default()
        };

        let result = Registry::from_config(&config).await;
        assert!(matches!(result, Err(Error::DynamicList(_))));
    }

    #[tokio::test]
    async fn should_keep_blocking_after_shutdown() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ads.txt");
        std::fs::write(&path, "||ads.example.com^\n").unwrap();

        let config = Config {
            lists: vec![dynamic("ads", &path)],
            ..Config::default()
        };
        let mut registry = Registry::from_config(&config).await.unwrap();

        registry.shutdown().await;

        assert_eq!(registry.block("x.ads.example.com."), Some("ads"));
        assert!(registry.ready());
    }

    #[test]
    fn should_not_block_anything_when_empty() {
        let registry = Registry::new();
        assert!(registry.is_empty());
        assert!(registry.ready());
        assert_eq!(registry.block("example.com."), None);
    }
}
