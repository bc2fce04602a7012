//! File-based blocklist loader.
//!
//! Reads a blocklist from the local filesystem and parses it. Used for static
//! lists backed by a file and to bootstrap dynamic lists.

use std::io::BufReader;
use std::path::{Path, PathBuf};

use super::{ListFormat, ParseError, parser_for_format};

/// Error type for blocklist file loading operations.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// File was not found at the specified path.
    #[error("file not found: {0:?}")]
    NotFound(PathBuf),

    /// Permission denied when accessing the file.
    #[error("permission denied: {0:?}")]
    PermissionDenied(PathBuf),

    /// I/O error while reading the file.
    #[error("I/O error reading {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error parsing the blocklist content.
    #[error("parse error")]
    Parse(#[from] ParseError),

    /// Task join error from spawning a blocking task.
    #[error("task join error")]
    Join(#[from] tokio::task::JoinError),
}

/// Loads blocklists from local files.
pub struct FileLoader;

impl FileLoader {
    /// Load the domains listed in a local file.
    ///
    /// The file is read in full, then parsed on a blocking thread so that
    /// large lists don't stall the runtime.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if:
    /// - The file does not exist ([`LoadError::NotFound`])
    /// - Permission is denied ([`LoadError::PermissionDenied`])
    /// - Any other I/O error occurs ([`LoadError::Io`])
    ///
    /// # Example
    ///
    /// ```no_run
    /// use std::path::Path;
    /// use nope::blocklist::ListFormat;
    /// use nope::blocklist::loader::FileLoader;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let domains = FileLoader::load(Path::new("/etc/nope/local.txt"), ListFormat::Domains).await?;
    /// println!("Loaded {} domains", domains.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn load(path: &Path, format: ListFormat) -> Result<Vec<String>, LoadError> {
        let content = tokio::fs::read(path)
            .await
            .map_err(|err| match err.kind() {
                std::io::ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
                std::io::ErrorKind::PermissionDenied => {
                    LoadError::PermissionDenied(path.to_path_buf())
                }
                _ => LoadError::Io {
                    path: path.to_path_buf(),
                    source: err,
                },
            })?;

        let domains = tokio::task::spawn_blocking(move || {
            let parser = parser_for_format(format);
            let mut reader = BufReader::new(content.as_slice());
            parser.parse(&mut reader)
        })
        .await??;

        tracing::debug!(path = ?path, count = domains.len(), "loaded blocklist file");
        Ok(domains)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn should_load_domains_format_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# Comment").unwrap();
        writeln!(file, "example.com").unwrap();
        writeln!(file, "ads.example.org").unwrap();
        file.flush().unwrap();

        let domains = FileLoader::load(file.path(), ListFormat::Domains)
            .await
            .unwrap();

        assert_eq!(domains, vec!["example.com", "ads.example.org"]);
    }

    #[tokio::test]
    async fn should_load_adblock_format_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "! AdBlock comment").unwrap();
        writeln!(file, "||ads.example.com^").unwrap();
        writeln!(file, "||tracking.example.com^$third-party").unwrap();
        file.flush().unwrap();

        let domains = FileLoader::load(file.path(), ListFormat::Adblock)
            .await
            .unwrap();

        assert_eq!(domains, vec!["ads.example.com"]);
    }

    #[tokio::test]
    async fn should_return_empty_vec_when_file_is_empty() {
        let file = NamedTempFile::new().unwrap();

        let domains = FileLoader::load(file.path(), ListFormat::Adblock)
            .await
            .unwrap();

        assert!(domains.is_empty());
    }

    #[tokio::test]
    async fn should_return_not_found_error_when_file_does_not_exist() {
        let result = FileLoader::load(
            Path::new("/nonexistent/path/to/blocklist.txt"),
            ListFormat::Domains,
        )
        .await;

        assert!(matches!(result, Err(LoadError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_return_io_error_when_path_is_a_directory() {
        let dir = tempfile::TempDir::new().unwrap();

        let result = FileLoader::load(dir.path(), ListFormat::Domains).await;

        assert!(matches!(
            result,
            Err(LoadError::Io { .. } | LoadError::PermissionDenied(_))
        ));
    }

    #[tokio::test]
    async fn should_handle_large_file() {
        let mut file = NamedTempFile::new().unwrap();
        for i in 0..10_000 {
            writeln!(file, "||domain{i}.example.com^").unwrap();
        }
        file.flush().unwrap();

        let domains = FileLoader::load(file.path(), ListFormat::Adblock)
            .await
            .unwrap();

        assert_eq!(domains.len(), 10_000);
        assert_eq!(domains[0], "domain0.example.com");
        assert_eq!(domains[9999], "domain9999.example.com");
    }
}
