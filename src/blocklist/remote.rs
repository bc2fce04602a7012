//! Remote rule-list fetcher.
//!
//! Downloads a rule list over HTTP(S) and parses it. The raw body is returned
//! next to the parsed domains so callers can persist exactly what was served.

use std::io::BufReader;
use std::time::Duration;

use reqwest::{Client, StatusCode};

use super::{AdBlockParser, BlocklistParser, ParseError};

/// Default timeout for a whole fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(60);

/// User-Agent header value for HTTP requests.
const USER_AGENT: &str = concat!("nope/", env!("CARGO_PKG_VERSION"));

/// Error type for remote blocklist fetches.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The server answered with something other than `200 OK`.
    #[error("unexpected status from {url}: {status}")]
    HttpStatus { url: String, status: u16 },

    /// Network error during the request or while reading the body.
    #[error("network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The fetch did not complete in time.
    #[error("timeout fetching {url}")]
    Timeout { url: String },

    /// Error parsing the fetched content.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Task join error from spawning a blocking task.
    #[error("task join error: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// Failed to create HTTP client.
    #[error("failed to create HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

impl FetchError {
    fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else {
            Self::Network {
                url: url.to_string(),
                source: err,
            }
        }
    }
}

/// Result of a successful fetch.
#[derive(Debug, Clone)]
pub struct Fetched {
    /// Domains of every `||domain^` rule, in file order.
    pub domains: Vec<String>,
    /// The body exactly as served.
    pub raw: Vec<u8>,
}

/// Fetches rule lists from remote URLs.
///
/// Every fetch is a single unconditional `GET`: no caching headers are sent
/// and nothing is retried.
#[derive(Debug, Clone)]
pub struct RemoteFetcher {
    client: Client,
}

impl RemoteFetcher {
    /// Create a fetcher whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .gzip(true)
            .build()
            .map_err(FetchError::ClientBuild)?;

        Ok(Self { client })
    }

    /// Fetch and parse the rule list at `url`.
    ///
    /// The whole body is buffered before parsing, so a failure never yields a
    /// partial result.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] if:
    /// - The request fails ([`FetchError::Network`])
    /// - The request times out ([`FetchError::Timeout`])
    /// - The server returns anything but `200 OK` ([`FetchError::HttpStatus`])
    /// - The body cannot be parsed ([`FetchError::Parse`])
    pub async fn fetch(&self, url: &str) -> Result<Fetched, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| FetchError::from_reqwest(url, err))?;

        if response.status() != StatusCode::OK {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let raw = response
            .bytes()
            .await
            .map_err(|err| FetchError::from_reqwest(url, err))?
            .to_vec();

        // Parse in a blocking task to avoid blocking the async runtime
        let (domains, raw) = tokio::task::spawn_blocking(move || {
            let mut reader = BufReader::new(raw.as_slice());
            let domains = AdBlockParser.parse(&mut reader);
            domains.map(|domains| (domains, raw))
        })
        .await??;

        Ok(Fetched { domains, raw })
    }
}
