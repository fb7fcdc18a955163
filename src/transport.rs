//! The HTTP GET capability the fetchers run on.

use crate::error::TransportError;
use async_trait::async_trait;
use http::{HeaderMap, Uri};
use octocrab::service::middleware::retry::RetryConfig;
use octocrab::Octocrab;

/// A raw response: status code, headers and the undecoded body.
#[derive(Clone, Debug, Default)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

/// Issues a single GET request. Implementations do not inspect the status or
/// body; that is left to the caller.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str, headers: HeaderMap) -> Result<HttpResponse, TransportError>;
}

/// Transport backed by octocrab's raw request API.
///
/// The client carries no credentials of its own; the `Authorization` header
/// is supplied per request by the caller. Requests go to the host of
/// `api_root` and are sent exactly once; failed requests are not retried.
#[derive(Clone)]
pub struct OctocrabTransport {
    octocrab: Octocrab,
}

impl OctocrabTransport {
    pub fn new(api_root: &str) -> anyhow::Result<Self> {
        let base_uri: Uri = api_root.parse()?;
        let octocrab = Octocrab::builder()
            .base_uri(base_uri)?
            .add_retry_config(RetryConfig::None)
            .build()?;
        Ok(Self { octocrab })
    }
}

#[async_trait]
impl Transport for OctocrabTransport {
    async fn get(&self, url: &str, headers: HeaderMap) -> Result<HttpResponse, TransportError> {
        let uri: Uri = url.parse().map_err(|_| TransportError::InvalidUrl {
            url: url.to_string(),
        })?;

        tracing::debug!(url, "GET");

        let response = self
            .octocrab
            ._get_with_headers(uri, Some(headers))
            .await
            .map_err(|e| TransportError::Network {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        let response_headers = response.headers().clone();
        let body = self
            .octocrab
            .body_to_string(response)
            .await
            .map_err(|e| TransportError::Network {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        tracing::debug!(url, status, bytes = body.len(), "response received");

        Ok(HttpResponse {
            status,
            headers: response_headers,
            body,
        })
    }
}
