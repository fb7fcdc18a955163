//! Application configuration and environment variable parsing.
//!
//! Settings are read from the environment (optionally seeded from a `.env` file):
//! the access token, the default organization, the API root and the
//! per-request deadline.

use crate::github::DEFAULT_API_ROOT;
use serde::Deserialize;
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    /// GitHub access token, sent as `Authorization: Bearer {token}`.
    pub github_token: String,

    /// Organization to report on when none is given on the command line.
    pub github_org: Option<String>,

    /// Root of the REST API. Defaults to the public GitHub API.
    #[serde(default = "default_api_root")]
    pub github_api_root: String,

    /// Deadline for a single page request in seconds.
    /// Defaults to 30 if not specified.
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
}

fn default_api_root() -> String {
    DEFAULT_API_ROOT.to_string()
}

fn default_request_timeout_seconds() -> u64 {
    30
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}
