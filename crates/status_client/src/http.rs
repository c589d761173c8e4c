//! HttpStatusSource - reqwest client against the remote clock service

use std::time::Duration;

use contracts::{ClockStatus, ContractError, StatusSource};
use tracing::{debug, instrument};

use crate::decode::decode_status;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// `StatusSource` over HTTP GET.
pub struct HttpStatusSource {
    client: reqwest::Client,
    href: String,
}

impl HttpStatusSource {
    /// Create a client for the given locator.
    pub fn new(href: impl Into<String>) -> Result<Self, ContractError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ContractError::source_transport(e.to_string()))?;

        Ok(Self {
            client,
            href: href.into(),
        })
    }

    /// The configured locator.
    pub fn href(&self) -> &str {
        &self.href
    }
}

impl StatusSource for HttpStatusSource {
    #[instrument(name = "status_fetch", skip(self), fields(href = %self.href))]
    async fn fetch(&mut self) -> Result<ClockStatus, ContractError> {
        let response = self
            .client
            .get(&self.href)
            .send()
            .await
            .map_err(|e| ContractError::source_transport(e.to_string()))?;

        let code = response.status();
        if !code.is_success() {
            return Err(ContractError::SourceResponse { code: code.as_u16() });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ContractError::source_transport(e.to_string()))?;

        let status = decode_status(&body)?;
        debug!(time = ?status.time, "Status received");
        Ok(status)
    }
}
