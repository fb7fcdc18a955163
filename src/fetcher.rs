use crate::config::AppConfig;
use crate::github::GithubService;
use crate::metrics::{self, OrgSummary};
use crate::transport::Transport;
use crate::types::Repository;
use anyhow::Result;
use std::sync::Arc;

/// Enriched repositories of an organization together with their totals.
#[derive(Debug, Clone)]
pub struct OrgReport {
    pub repositories: Vec<Repository>,
    pub summary: OrgSummary,
}

/// Builds a `GithubService` from configuration on top of `transport`.
pub fn build_service(transport: Arc<dyn Transport>, config: &AppConfig) -> Result<GithubService> {
    Ok(GithubService::new(
        transport,
        &config.github_token,
        &config.github_api_root,
        config.request_timeout(),
    )?)
}

/// Fetches every repository and pull request of `org` and calculates the
/// totals.
///
/// This function separates data retrieval and processing from the command
/// line layer.
pub async fn fetch_org_report(
    service: &GithubService,
    org: &str,
    on_progress: impl FnMut(usize, usize),
) -> Result<OrgReport> {
    let repositories = service.fetch_org(org, on_progress).await?;
    let summary = metrics::summarize(&repositories);

    Ok(OrgReport {
        repositories,
        summary,
    })
}
