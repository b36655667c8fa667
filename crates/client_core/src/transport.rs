//! Request/response transport to the insights endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use shared::domain::FiscalYear;
use thiserror::Error;
use url::Url;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRequest {
    pub year: Option<FiscalYear>,
    /// Per-call token, sent as the `callback` query parameter.
    pub callback: String,
}

impl RemoteRequest {
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = Vec::with_capacity(2);
        if let Some(year) = &self.year {
            pairs.push(("year", year.as_str()));
        }
        pairs.push(("callback", self.callback.as_str()));
        pairs
    }
}

/// The request could not be completed: connect, timeout, HTTP status, body read.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransportFailure(pub String);

impl From<reqwest::Error> for TransportFailure {
    fn from(value: reqwest::Error) -> Self {
        Self(value.to_string())
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs one exchange and returns the raw reply body.
    async fn send(&self, request: &RemoteRequest) -> Result<String, TransportFailure>;
}

pub struct HttpTransport {
    http: Client,
    endpoint: Url,
}

impl HttpTransport {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, TransportFailure> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &RemoteRequest) -> Result<String, TransportFailure> {
        let body = self
            .http
            .get(self.endpoint.clone())
            .query(&request.query_pairs())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(body)
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
