pub mod config;
pub mod error;
pub mod fetcher;
pub mod github;
pub mod link_header;
pub mod metrics;
pub mod paginate;
pub mod transport;
pub mod types;

pub use error::{FetchError, TransportError};
pub use github::GithubService;
pub use types::{PullRequest, PullRequestState, RepoId, Repository};
