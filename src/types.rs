//! Records returned by the GitHub REST API for organization repositories and
//! their pull requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A repository within an organization, e.g. `ramda/ramda`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoId {
    /// The organization that owns the repository.
    pub owner: String,
    /// The name of the repository.
    pub repo: String,
}

impl RepoId {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// A repository as listed by `GET /orgs/{org}/repos`.
///
/// `pull_requests` is empty on the wire and filled in once by the org
/// aggregation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    #[serde(default)]
    pub node_id: String,
    pub name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub pull_requests: Vec<PullRequest>,
}

/// Server-side pull request state. Merged pull requests are `Closed` with a
/// `merged_at` timestamp.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PullRequestState {
    Open,
    Closed,
    #[serde(other)]
    Unknown,
}

/// A pull request as listed by `GET /repos/{org}/{repo}/pulls`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PullRequest {
    pub id: u64,
    #[serde(default)]
    pub node_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub number: u64,
    pub state: PullRequestState,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
    /// Minutes from creation to merge, `None` when not merged.
    /// Set by [`crate::metrics::annotate`].
    #[serde(default)]
    pub open_to_merge_time: Option<f64>,
}

impl PullRequest {
    pub fn is_merged(&self) -> bool {
        self.merged_at.is_some()
    }
}
