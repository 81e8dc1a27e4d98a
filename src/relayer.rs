use crate::config::{RunConfig, REQUEST_TIMEOUT_SECONDS};
use crate::error::Result;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Outcome of one batch submission to the relayer.
#[derive(Debug, Clone)]
pub struct BatchResult {
    pub submitted: Vec<String>,
    pub success: bool,
    pub response_body: Option<String>,
}

/// The downstream service that registers addresses as users.
#[async_trait::async_trait]
pub trait Relayer: Send + Sync {
    /// Submits the whole batch in one request. A network-level failure is an
    /// error; an HTTP error status is a failed `BatchResult` carrying the
    /// response body when one could be read.
    async fn submit(&self, addresses: &[String]) -> Result<BatchResult>;
}

/// Posts address batches to the Lit relayer's add-users endpoint.
pub struct HttpRelayer {
    client: reqwest::Client,
    url: String,
    api_key: String,
    payer_secret_key: String,
}

impl HttpRelayer {
    pub fn new(config: &RunConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECONDS))
            .build()?;

        Ok(Self {
            client,
            url: config.relayer_url(),
            api_key: config.api_key.clone(),
            payer_secret_key: config.payer_secret_key.clone(),
        })
    }
}

#[async_trait::async_trait]
impl Relayer for HttpRelayer {
    #[instrument(skip(self, addresses), fields(batch_len = addresses.len()))]
    async fn submit(&self, addresses: &[String]) -> Result<BatchResult> {
        let response = self
            .client
            .post(&self.url)
            .header("api-key", &self.api_key)
            .header("payer-secret-key", &self.payer_secret_key)
            .json(&addresses)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.ok().filter(|b| !b.is_empty());

        if status.is_success() {
            info!(count = addresses.len(), "relayer accepted batch");
            return Ok(BatchResult {
                submitted: addresses.to_vec(),
                success: true,
                response_body: body,
            });
        }

        warn!(status = status.as_u16(), "relayer rejected batch");
        let reason = format!(
            "HTTP {} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("unknown")
        );

        Ok(BatchResult {
            submitted: addresses.to_vec(),
            success: false,
            response_body: body.or(Some(reason)),
        })
    }
}
