use crate::types::{PullRequest, Repository};
use chrono::{DateTime, Utc};
use serde::Serialize;

const MILLISECONDS_PER_MINUTE: f64 = 60_000.0;

/// Minutes elapsed between `created_at` and `merged_at`, or `None` if the pull
/// request was never merged.
pub fn open_to_merge_minutes(
    created_at: DateTime<Utc>,
    merged_at: Option<DateTime<Utc>>,
) -> Option<f64> {
    merged_at.map(|merged_at| {
        (merged_at - created_at).num_milliseconds() as f64 / MILLISECONDS_PER_MINUTE
    })
}

/// Returns the pull request with `open_to_merge_time` (re)computed from its
/// timestamps. Applying it twice gives the same result as applying it once.
pub fn annotate(mut pr: PullRequest) -> PullRequest {
    pr.open_to_merge_time = open_to_merge_minutes(pr.created_at, pr.merged_at);
    pr
}

/// Pull request totals for one repository.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct RepoSummary {
    pub name: String,
    pub pull_requests: usize,
    pub merged: usize,
    /// Mean open-to-merge time in minutes over merged pull requests.
    pub mean_open_to_merge_minutes: Option<f64>,
}

/// Pull request totals for a whole organization.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct OrgSummary {
    pub repositories: usize,
    pub pull_requests: usize,
    pub merged: usize,
    pub mean_open_to_merge_minutes: Option<f64>,
    pub repos: Vec<RepoSummary>,
}

/// Calculates per-repository and organization-wide totals from enriched
/// repositories.
pub fn summarize(repositories: &[Repository]) -> OrgSummary {
    let repos: Vec<RepoSummary> = repositories
        .iter()
        .map(|repo| RepoSummary {
            name: repo.name.clone(),
            pull_requests: repo.pull_requests.len(),
            merged: repo.pull_requests.iter().filter(|pr| pr.is_merged()).count(),
            mean_open_to_merge_minutes: mean_open_to_merge(repo.pull_requests.iter()),
        })
        .collect();

    OrgSummary {
        repositories: repositories.len(),
        pull_requests: repos.iter().map(|r| r.pull_requests).sum(),
        merged: repos.iter().map(|r| r.merged).sum(),
        mean_open_to_merge_minutes: mean_open_to_merge(
            repositories.iter().flat_map(|repo| repo.pull_requests.iter()),
        ),
        repos,
    }
}

fn mean_open_to_merge<'a>(prs: impl Iterator<Item = &'a PullRequest>) -> Option<f64> {
    let (total, count) = prs
        .filter_map(|pr| pr.open_to_merge_time)
        .fold((0.0, 0usize), |(total, count), minutes| (total + minutes, count + 1));

    (count > 0).then(|| total / count as f64)
}
