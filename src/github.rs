//! Fetching an organization's repositories and pull requests.
//!
//! `GithubService` exposes four operations:
//! 1. `fetch_repositories` walks `/orgs/{org}/repos`, reporting the running repository count.
//! 2. `fetch_pull_requests` walks `/repos/{org}/{repo}/pulls?state=all`, annotating every
//!    pull request with its open-to-merge time and reporting per-page counts.
//! 3. `fetch_org` combines the two, one repository at a time.
//! 4. `estimate_repo_count` approximates the repository count from a single request.

use crate::error::{FetchError, TransportError};
use crate::link_header::parse_link_header;
use crate::metrics;
use crate::paginate::{fetch_all_pages, fetch_all_pages_with, Page};
use crate::transport::Transport;
use crate::types::{PullRequest, RepoId, Repository};
use http::header::{AUTHORIZATION, LINK};
use http::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

pub const DEFAULT_API_ROOT: &str = "https://api.github.com";

#[derive(Clone)]
pub struct GithubService {
    transport: Arc<dyn Transport>,
    api_root: String,
    authorization: HeaderValue,
    request_timeout: Duration,
}

impl GithubService {
    /// Creates a service that authenticates every request with `Bearer {token}`.
    pub fn new(
        transport: Arc<dyn Transport>,
        token: &str,
        api_root: &str,
        request_timeout: Duration,
    ) -> Result<Self, FetchError> {
        let mut authorization = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| FetchError::InvalidToken)?;
        authorization.set_sensitive(true);

        Ok(Self {
            transport,
            api_root: api_root.to_string(),
            authorization,
            request_timeout,
        })
    }

    /// Retrieves every repository of `org`.
    ///
    /// `on_progress` receives the number of repositories fetched so far after
    /// each page.
    pub async fn fetch_repositories(
        &self,
        org: &str,
        mut on_progress: impl FnMut(usize),
    ) -> Result<Vec<Repository>, FetchError> {
        let repositories_error = |source| FetchError::Repositories {
            org: org.to_string(),
            source,
        };

        let start_url = self
            .endpoint(&["orgs", org, "repos"], false)
            .map_err(repositories_error)?;

        let mut fetched = 0;
        fetch_all_pages(
            start_url,
            |url| async move { self.get_page::<Repository>(&url).await },
            |count| {
                fetched += count;
                on_progress(fetched);
            },
        )
        .await
        .map_err(repositories_error)
    }

    /// Retrieves every pull request of `org/repo` in any state, each annotated
    /// with its open-to-merge time.
    ///
    /// `on_progress` receives the number of pull requests on each page, not a
    /// running total.
    pub async fn fetch_pull_requests(
        &self,
        org: &str,
        repo: &str,
        on_progress: impl FnMut(usize),
    ) -> Result<Vec<PullRequest>, FetchError> {
        let pull_requests_error = |source| FetchError::PullRequests {
            repo: RepoId::new(org, repo),
            source,
        };

        let start_url = self
            .endpoint(&["repos", org, repo, "pulls"], true)
            .map_err(pull_requests_error)?;

        fetch_all_pages_with(
            start_url,
            |next| with_state_all(&next),
            |url| async move {
                let page = self.get_page::<PullRequest>(&url).await?;
                Ok::<_, TransportError>(Page {
                    items: page.items.into_iter().map(metrics::annotate).collect(),
                    link: page.link,
                })
            },
            on_progress,
        )
        .await
        .map_err(pull_requests_error)
    }

    /// Retrieves every repository of `org` with its pull requests attached.
    ///
    /// Repositories are processed one after another in listing order.
    /// `on_progress(repositories, pull_requests)` is called with the running
    /// repository count (and zero pull requests) while listing repositories,
    /// then with the total repository count and the running pull request count
    /// across all repositories. Any failure aborts the whole aggregation.
    pub async fn fetch_org(
        &self,
        org: &str,
        mut on_progress: impl FnMut(usize, usize),
    ) -> Result<Vec<Repository>, FetchError> {
        let repositories = self
            .fetch_repositories(org, |repos| on_progress(repos, 0))
            .await?;

        let repo_count = repositories.len();
        let mut total_prs = 0;
        let mut enriched = Vec::with_capacity(repo_count);

        for mut repository in repositories {
            let pull_requests = self
                .fetch_pull_requests(org, &repository.name, |prs| {
                    total_prs += prs;
                    on_progress(repo_count, total_prs);
                })
                .await?;
            repository.pull_requests = pull_requests;
            enriched.push(repository);
        }

        Ok(enriched)
    }

    /// Approximates the number of repositories in `org` with one request:
    /// the `last` page number times the size of the first page, or the size
    /// of the first page when there is only one.
    pub async fn estimate_repo_count(&self, org: &str) -> Result<u64, FetchError> {
        let repo_count_error = |source| FetchError::RepoCount {
            org: org.to_string(),
            source,
        };

        let url = self
            .endpoint(&["orgs", org, "repos"], false)
            .map_err(repo_count_error)?;
        let page = self
            .get_page::<Repository>(&url)
            .await
            .map_err(repo_count_error)?;

        let per_page = page.items.len() as u64;
        let last_page = parse_link_header(page.link.as_deref())
            .remove("last")
            .and_then(|last| last.page);

        Ok(match last_page {
            Some(last_page) => last_page.saturating_mul(per_page),
            None => per_page,
        })
    }

    /// Builds `{api_root}/{segments...}`, optionally with `?state=all`.
    fn endpoint(&self, segments: &[&str], state_all: bool) -> Result<String, TransportError> {
        let invalid = || TransportError::InvalidUrl {
            url: format!("{}/{}", self.api_root, segments.join("/")),
        };

        let mut url = Url::parse(&self.api_root).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(segments);
        if state_all {
            url.query_pairs_mut().append_pair("state", "all");
        }
        Ok(url.into())
    }

    async fn get_page<T: DeserializeOwned>(&self, url: &str) -> Result<Page<T>, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, self.authorization.clone());

        let response = tokio::time::timeout(self.request_timeout, self.transport.get(url, headers))
            .await
            .map_err(|_| TransportError::Timeout {
                url: url.to_string(),
                timeout: self.request_timeout,
            })??;

        if !(200..300).contains(&response.status) {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: response.status,
            });
        }

        let items = serde_json::from_str(&response.body).map_err(|source| TransportError::Decode {
            url: url.to_string(),
            source,
        })?;
        // Relations may be split across several `Link` headers.
        let links: Vec<&str> = response
            .headers
            .get_all(LINK)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect();
        let link = (!links.is_empty()).then(|| links.join(", "));

        Ok(Page { items, link })
    }
}

/// Ensures a pull request listing URL carries `state=all`. Next links are
/// built by the server and are not guaranteed to keep it.
fn with_state_all(url: &str) -> Result<String, TransportError> {
    let mut parsed = Url::parse(url).map_err(|_| TransportError::InvalidUrl {
        url: url.to_string(),
    })?;
    if !parsed.query_pairs().any(|(key, _)| key == "state") {
        parsed.query_pairs_mut().append_pair("state", "all");
    }
    Ok(parsed.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::HttpResponse;
    use async_trait::async_trait;

    struct NoTransport;

    #[async_trait]
    impl Transport for NoTransport {
        async fn get(&self, url: &str, _: HeaderMap) -> Result<HttpResponse, TransportError> {
            Err(TransportError::Network {
                url: url.to_string(),
                message: "offline".to_string(),
            })
        }
    }

    fn service(api_root: &str) -> GithubService {
        GithubService::new(Arc::new(NoTransport), "t", api_root, Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn test_endpoint_urls() {
        let github = service(DEFAULT_API_ROOT);

        assert_eq!(
            github.endpoint(&["orgs", "ramda", "repos"], false).unwrap(),
            "https://api.github.com/orgs/ramda/repos"
        );
        assert_eq!(
            github
                .endpoint(&["repos", "ramda", "ramda", "pulls"], true)
                .unwrap(),
            "https://api.github.com/repos/ramda/ramda/pulls?state=all"
        );
    }

    #[test]
    fn test_endpoint_respects_api_root_path() {
        let github = service("https://ghe.example.com/api/v3/");
        assert_eq!(
            github.endpoint(&["orgs", "acme", "repos"], false).unwrap(),
            "https://ghe.example.com/api/v3/orgs/acme/repos"
        );
    }

    #[test]
    fn test_endpoint_escapes_segments() {
        let github = service(DEFAULT_API_ROOT);
        assert_eq!(
            github.endpoint(&["orgs", "a/b", "repos"], false).unwrap(),
            "https://api.github.com/orgs/a%2Fb/repos"
        );
    }

    #[test]
    fn test_with_state_all_appends_when_missing() {
        assert_eq!(
            with_state_all("https://api.github.com/repositories/1/pulls?page=2").unwrap(),
            "https://api.github.com/repositories/1/pulls?page=2&state=all"
        );
    }

    #[test]
    fn test_with_state_all_keeps_existing_state() {
        let url = "https://api.github.com/repos/o/r/pulls?state=all&page=2";
        assert_eq!(with_state_all(url).unwrap(), url);
    }

    #[test]
    fn test_invalid_token_is_rejected() {
        let result = GithubService::new(
            Arc::new(NoTransport),
            "bad\ntoken",
            DEFAULT_API_ROOT,
            Duration::from_secs(1),
        );
        assert!(matches!(result, Err(FetchError::InvalidToken)));
    }
}
