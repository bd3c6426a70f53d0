use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio::time::{Instant, sleep};
use tracing::warn;

use crate::config::{GlobalSettings, RequestTemplate};
use crate::error::HttpError;

use super::execution::drain_response_body;
use super::request::build_request;

/// Result of one completed request/response cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpOutcome {
    pub status_code: u16,
    pub elapsed: Duration,
    pub bytes_sent: u64,
    pub bytes_received: u64,
}

/// Executes one HTTP request described by a template.
#[async_trait]
pub trait HttpExecutor: Send + Sync {
    /// Sends the request and waits for the full response.
    ///
    /// # Errors
    ///
    /// Returns an error when the request cannot be built or the transport
    /// fails. Non-2xx statuses are not errors.
    async fn execute(&self, request: &RequestTemplate) -> Result<HttpOutcome, HttpError>;
}

/// [`HttpExecutor`] on top of a shared reqwest client. Applies the test's
/// timeout and retries transport failures.
#[derive(Debug, Clone)]
pub struct ReqwestExecutor {
    client: Client,
    retries: u32,
    retries_delay: Duration,
}

impl ReqwestExecutor {
    /// Builds a client configured from a test's global settings.
    ///
    /// # Errors
    ///
    /// Returns an error if reqwest cannot build the client.
    pub fn new(settings: &GlobalSettings) -> Result<Self, HttpError> {
        let mut builder = Client::builder();
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| HttpError::BuildClientFailed { source: err })?;
        Ok(Self {
            client,
            retries: settings.retries,
            retries_delay: settings.retries_delay,
        })
    }
}

#[async_trait]
impl HttpExecutor for ReqwestExecutor {
    async fn execute(&self, template: &RequestTemplate) -> Result<HttpOutcome, HttpError> {
        let bytes_sent = u64::try_from(template.body.len()).unwrap_or(u64::MAX);
        let mut attempts: u32 = 0;
        loop {
            attempts = attempts.saturating_add(1);
            let request = build_request(&self.client, template)?;
            let start = Instant::now();
            match self.client.execute(request).await {
                Ok(response) => {
                    let status_code = response.status().as_u16();
                    let bytes_received = drain_response_body(response)
                        .await
                        .map_err(|err| HttpError::ReadBody { source: err })?;
                    return Ok(HttpOutcome {
                        status_code,
                        elapsed: start.elapsed(),
                        bytes_sent,
                        bytes_received,
                    });
                }
                Err(err) if attempts <= self.retries => {
                    warn!(
                        "Request to {} failed (attempt {}), retrying in {:?}: {}",
                        template.uri, attempts, self.retries_delay, err
                    );
                    sleep(self.retries_delay).await;
                }
                Err(err) => {
                    return Err(HttpError::Transport {
                        url: template.uri.clone(),
                        attempts,
                        source: err,
                    });
                }
            }
        }
    }
}
