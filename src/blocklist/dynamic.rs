//! Blocklists that keep themselves up to date.
//!
//! A [`DynamicList`] starts from a rule list stored on disk, then regularly
//! downloads a fresh copy, writes it back to disk and swaps it in. Queries
//! keep using the previous list until the swap, and a failed refresh leaves
//! the previous list in place.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use rand::Rng;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::loader::{FileLoader, LoadError};
use super::remote::{DEFAULT_FETCH_TIMEOUT, FetchError, RemoteFetcher};
use super::{Blocker, ListFormat, StaticList};

/// Default time between two refreshes.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Error type for creating a dynamic list.
#[derive(Debug, thiserror::Error)]
pub enum DynamicListError {
    /// The stored list could not be read.
    #[error("failed to bootstrap blocklist {name:?} from {path:?}")]
    Bootstrap {
        name: String,
        path: PathBuf,
        #[source]
        source: LoadError,
    },

    /// The HTTP client could not be created.
    #[error("failed to create fetcher for blocklist {name:?}")]
    Fetcher {
        name: String,
        #[source]
        source: FetchError,
    },
}

/// Error type for a single refresh attempt.
#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error("failed to fetch blocklist")]
    Fetch(#[from] FetchError),

    #[error("failed to write blocklist to {path:?}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("task join error")]
    Join(#[from] tokio::task::JoinError),
}

/// Timing of the refresh loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSettings {
    /// Nominal time between refreshes, jittered by ±10% on every cycle.
    pub interval: Duration,
    /// Upper bound for a single download.
    pub fetch_timeout: Duration,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_REFRESH_INTERVAL,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

/// A blocklist refreshed periodically from a remote rule list.
///
/// The current list is held behind a mutex that only guards the pointer: a
/// reader clones the [`Arc`] and matches without holding the lock, and the
/// refresh replaces the pointer with a fully built list.
pub struct DynamicList {
    name: String,
    source: String,
    path: PathBuf,
    interval: Duration,
    fetcher: RemoteFetcher,
    current: Mutex<Arc<StaticList>>,
}

impl DynamicList {
    /// Read the stored list at `path` and start refreshing it from `source`.
    ///
    /// The returned [`RefreshHandle`] stops the background refresh.
    ///
    /// # Errors
    ///
    /// Fails if the stored list cannot be read or the HTTP client cannot be
    /// created. Nothing is started in that case.
    pub async fn open(
        name: impl Into<String>,
        source: impl Into<String>,
        path: impl Into<PathBuf>,
        settings: RefreshSettings,
    ) -> Result<(Arc<Self>, RefreshHandle), DynamicListError> {
        let list = Arc::new(Self::bootstrap(name, source, path, settings).await?);
        let handle = list.spawn_refresh();
        Ok((list, handle))
    }

    /// Read the stored list at `path` without starting the refresh loop.
    ///
    /// # Errors
    ///
    /// Fails if the stored list cannot be read or the HTTP client cannot be
    /// created.
    pub async fn bootstrap(
        name: impl Into<String>,
        source: impl Into<String>,
        path: impl Into<PathBuf>,
        settings: RefreshSettings,
    ) -> Result<Self, DynamicListError> {
        let name = name.into();
        let source = source.into();
        let path = path.into();

        tracing::info!(name = ?name, path = ?path, "reading initial blocklist");
        let domains = match FileLoader::load(&path, ListFormat::Adblock).await {
            Ok(domains) => domains,
            Err(source) => return Err(DynamicListError::Bootstrap { name, path, source }),
        };

        let fetcher = match RemoteFetcher::new(settings.fetch_timeout) {
            Ok(fetcher) => fetcher,
            Err(source) => return Err(DynamicListError::Fetcher { name, source }),
        };

        let list = StaticList::new(name.clone(), domains);
        tracing::info!(
            name = ?name,
            count = list.len(),
            source = %source,
            "loaded dynamic blocklist"
        );

        Ok(Self {
            name,
            source,
            path,
            interval: settings.interval,
            fetcher,
            current: Mutex::new(Arc::new(list)),
        })
    }

    /// Start the background refresh loop.
    ///
    /// Only one loop should run per list; [`open`](Self::open) takes care of
    /// that.
    #[must_use]
    pub fn spawn_refresh(self: &Arc<Self>) -> RefreshHandle {
        let token = CancellationToken::new();
        let task = tokio::spawn(Arc::clone(self).refresh_loop(token.clone()));
        RefreshHandle { token, task }
    }

    async fn refresh_loop(self: Arc<Self>, token: CancellationToken) {
        loop {
            let delay = jittered(self.interval);
            tracing::info!(name = ?self.name, ?delay, "waiting to refresh blocklist");
            tokio::select! {
                () = token.cancelled() => break,
                () = tokio::time::sleep(delay) => {}
            }

            if let Err(err) = self.refresh().await {
                tracing::error!(
                    name = ?self.name,
                    url = %self.source,
                    error = ?err,
                    "failed to refresh blocklist, keeping current list"
                );
            }
        }
        tracing::info!(name = ?self.name, "stopped refreshing blocklist");
    }

    /// Fetch the remote list once and swap it in.
    ///
    /// On success the fetched bytes are stored at the list's path before the
    /// new list becomes visible. On failure the current list is untouched.
    /// Returns the number of entries in the new list.
    ///
    /// # Errors
    ///
    /// Returns a [`RefreshError`] if fetching, parsing or persisting fails.
    pub async fn refresh(&self) -> Result<usize, RefreshError> {
        let started = Instant::now();
        tracing::debug!(name = ?self.name, url = %self.source, "fetching blocklist");

        let fetched = self.fetcher.fetch(&self.source).await?;
        let fetched_count = fetched.domains.len();

        let name = self.name.clone();
        let domains = fetched.domains;
        let list = tokio::task::spawn_blocking(move || StaticList::new(name, domains)).await?;

        persist(&self.path, &fetched.raw)
            .await
            .map_err(|source| RefreshError::Persist {
                path: self.path.clone(),
                source,
            })?;

        let count = list.len();
        *self.current.lock() = Arc::new(list);

        tracing::info!(
            name = ?self.name,
            fetched = fetched_count,
            count,
            elapsed = ?started.elapsed(),
            "refreshed blocklist"
        );
        Ok(count)
    }

    /// The list currently used for matching.
    #[must_use]
    pub fn snapshot(&self) -> Arc<StaticList> {
        Arc::clone(&*self.current.lock())
    }

    /// URL the list is refreshed from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Where the last fetched list is stored.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of entries in the current list.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }
}

impl std::fmt::Debug for DynamicList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicList")
            .field("name", &self.name)
            .field("source", &self.source)
            .field("path", &self.path)
            .field("interval", &self.interval)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl Blocker for DynamicList {
    fn name(&self) -> &str {
        &self.name
    }

    fn block(&self, host: &str) -> bool {
        self.snapshot().block(host)
    }

    fn ready(&self) -> bool {
        self.snapshot().ready()
    }
}

/// Stops the refresh loop of a [`DynamicList`].
///
/// Dropping the handle does not stop the loop.
#[derive(Debug)]
#[must_use = "dropping the handle leaves no way to stop the refresh loop"]
pub struct RefreshHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl RefreshHandle {
    /// Ask the loop to stop at its next wait.
    ///
    /// A download already in flight runs to completion or to its timeout.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns true once the loop has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the loop and wait for it to exit.
    pub async fn shutdown(self) {
        self.token.cancel();
        if let Err(err) = self.task.await {
            tracing::warn!(error = ?err, "blocklist refresh task failed");
        }
    }
}

/// Returns `period` scaled by a random factor in `[0.9, 1.1)`.
fn jittered(period: Duration) -> Duration {
    period.mul_f64(rand::thread_rng().gen_range(0.9..1.1))
}

/// Replace the file at `path` with `content`.
///
/// The content goes to a sibling temporary file first and is then renamed
/// over `path`, so the stored list is either the old one or the new one.
async fn persist(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, content).await?;
    if let Err(err) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(err);
    }

    tracing::debug!(path = ?path, bytes = content.len(), "stored blocklist");
    Ok(())
}
