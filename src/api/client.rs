use anyhow::{Context, Result};
use reqwest::multipart::Form;
use reqwest::Client;
use tracing::{debug, info};

use crate::models::RawCollection;

const DEFAULT_BASE_URL: &str = "http://216.48.190.50:8080";

/// Configuration for the receipt-processing backend client
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Bearer token (from E2E_TOKEN env var)
    pub token: String,
    /// Base URL of the processing backend
    pub base_url: String,
}

impl BackendConfig {
    /// Create config from environment variables
    pub fn from_env() -> Result<Self> {
        let token = std::env::var("E2E_TOKEN").context("E2E_TOKEN environment variable not set")?;
        let base_url = std::env::var("RECEIPT_BACKEND_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        Ok(Self { token, base_url })
    }

    /// Create with custom settings
    pub fn new(token: String, base_url: String) -> Self {
        Self { token, base_url }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// HTTP client for the receipt-processing backend
pub struct BackendClient {
    client: Client,
    config: BackendConfig,
}

impl BackendClient {
    pub fn new(config: BackendConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Fetch the raw per-file record collection for every submitted receipt.
    /// A `null` body is treated as an empty collection.
    pub async fn fetch_all_files(&self) -> Result<RawCollection> {
        let url = self.config.endpoint("getAllFiles");
        debug!(%url, "fetching raw file records");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.config.token)
            .send()
            .await
            .context("Failed to send request to the processing backend")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Backend error fetching files: {} - {}", status, body);
        }

        let collection: Option<RawCollection> = response
            .json()
            .await
            .context("Failed to parse raw file records")?;

        Ok(collection.unwrap_or_default())
    }

    /// Submit one receipt image for processing. Returns the backend's
    /// response body, which carries no contract beyond being loggable.
    pub async fn upload_receipt(&self, receipt_base64: &str, employee_id: &str) -> Result<String> {
        let upload_id = uuid::Uuid::new_v4();
        let url = self.config.endpoint("processReceipt");
        info!(%upload_id, %employee_id, "uploading receipt");

        let form = Form::new()
            .text("receipt_base_64", receipt_base64.to_string())
            .text("employee_id", employee_id.to_string());

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.token)
            .multipart(form)
            .send()
            .await
            .context("Failed to send receipt to the processing backend")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Backend error uploading receipt: {} - {}", status, body);
        }

        let body = response
            .text()
            .await
            .context("Failed to read upload response body")?;
        info!(%upload_id, "receipt accepted");

        Ok(body)
    }
}
