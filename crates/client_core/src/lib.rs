use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use shared::{
    domain::{ClientRecord, FiscalYear, RequestId, YearData},
    error::{RemoteError, RemoteOperation},
    protocol::{decode_reply, YearDataResponse, YearsResponse},
};
use tracing::{debug, info, warn};
use url::Url;

pub mod transport;

pub use transport::{HttpTransport, RemoteRequest, Transport, TransportFailure};

/// Read-only source of fiscal years and per-year client rows.
#[async_trait]
pub trait InsightsSource: Send + Sync {
    async fn list_available_years(&self) -> Result<Vec<FiscalYear>, RemoteError>;
    async fn fetch_year_data(&self, year: &FiscalYear) -> Result<YearData, RemoteError>;
}

/// Client for the spreadsheet-backed endpoint.
///
/// Every call carries its own [`RequestId`]; a reply is only accepted when it
/// is addressed to that id, so overlapping calls cannot receive each other's
/// data. The id is owned by the call and dropped with it.
pub struct RemoteDataClient<T: Transport> {
    transport: T,
}

impl RemoteDataClient<HttpTransport> {
    pub fn http(endpoint: Url, timeout: Duration) -> Result<Self, TransportFailure> {
        Ok(Self::new(HttpTransport::new(endpoint, timeout)?))
    }
}

impl<T: Transport> RemoteDataClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn call<R: DeserializeOwned>(
        &self,
        operation: RemoteOperation,
        year: Option<&FiscalYear>,
    ) -> Result<R, RemoteError> {
        let request_id = RequestId::generate();
        let request = RemoteRequest {
            year: year.cloned(),
            callback: request_id.callback_name(),
        };
        debug!(%request_id, %operation, year = ?request.year, "issuing remote request");

        let body = self.transport.send(&request).await.map_err(|error| {
            warn!(%request_id, %operation, %error, "remote request did not complete");
            RemoteError::network(operation)
        })?;

        decode_reply(&body, &request.callback).map_err(|error| {
            warn!(%request_id, %operation, %error, "rejected remote reply");
            error
        })
    }
}

#[async_trait]
impl<T: Transport> InsightsSource for RemoteDataClient<T> {
    async fn list_available_years(&self) -> Result<Vec<FiscalYear>, RemoteError> {
        let reply: YearsResponse = self.call(RemoteOperation::ListYears, None).await?;
        if let Some(reason) = reply.failure_reason() {
            warn!(%reason, "endpoint refused to list fiscal years");
            return Err(RemoteError::server(reason));
        }

        let years = reply.available_years.unwrap_or_default();
        info!(count = years.len(), "listed fiscal years");
        Ok(years)
    }

    async fn fetch_year_data(&self, year: &FiscalYear) -> Result<YearData, RemoteError> {
        let reply: YearDataResponse = self
            .call(RemoteOperation::FetchYearData, Some(year))
            .await?;
        if let Some(reason) = reply.failure_reason() {
            warn!(%year, %reason, "endpoint reported failure for fiscal year");
            return Err(RemoteError::server(reason));
        }

        let clients: Vec<ClientRecord> = reply
            .data
            .unwrap_or_default()
            .into_iter()
            .map(ClientRecord::from)
            .collect();
        let fiscal_year = reply
            .fiscal_year
            .filter(|echoed| !echoed.as_str().trim().is_empty())
            .unwrap_or_else(|| year.clone());
        if &fiscal_year != year {
            debug!(requested = %year, echoed = %fiscal_year, "server answered for a different fiscal year");
        }
        info!(%fiscal_year, clients = clients.len(), "loaded fiscal year data");

        Ok(YearData {
            clients,
            fiscal_year,
            available_years: reply.available_years.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
