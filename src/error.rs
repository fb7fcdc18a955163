use crate::types::RepoId;
use std::time::Duration;
use thiserror::Error;

/// A single page request that did not produce a usable page.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {url} failed: {message}")]
    Network { url: String, message: String },

    #[error("request to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    #[error("request to {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid url: {url}")]
    InvalidUrl { url: String },
}

/// Errors surfaced by [`crate::github::GithubService`].
///
/// Every variant is fatal to the operation that produced it; no partial
/// results accompany them.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to get repositories for {org}")]
    Repositories {
        org: String,
        #[source]
        source: TransportError,
    },

    #[error("Failed to get pull requests for {repo}")]
    PullRequests {
        repo: RepoId,
        #[source]
        source: TransportError,
    },

    #[error("Failed to estimate repository count for {org}")]
    RepoCount {
        org: String,
        #[source]
        source: TransportError,
    },

    #[error("access token cannot be sent as a header value")]
    InvalidToken,
}
