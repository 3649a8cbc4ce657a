//! HTTP client for the device registry.

use crate::registry::models::{HandshakeRequest, StatusReport};
use crate::{ClassboardError, Result};
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

/// The two registry calls a tablet makes while pairing.
#[async_trait]
pub trait RegistryApi: Send + Sync {
    /// Announce the device; creates a PENDING record on first contact.
    async fn handshake(&self, device_id: &str) -> Result<StatusReport>;

    /// Fetch the current pairing status. Unknown devices yield `NotFound`.
    async fn status(&self, device_id: &str) -> Result<StatusReport>;
}

/// HTTP client for the Classboard registry.
pub struct RegistryClient {
    client: reqwest::Client,
    base_url: Url,
}

impl RegistryClient {
    /// Create a new registry client.
    pub fn new(registry_url: &str, timeout: Duration) -> Result<Self> {
        let mut base_url = Url::parse(registry_url)
            .map_err(|e| ClassboardError::Config(format!("Invalid registry URL: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClassboardError::Config(format!(
                "Registry URL cannot be a base: {}",
                registry_url
            )));
        }
        // Keep any path prefix, but without a trailing empty segment
        if let Ok(mut segments) = base_url.path_segments_mut() {
            segments.pop_if_empty();
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.extend(segments);
        }
        url
    }

    async fn read_report(resp: reqwest::Response, device_id: &str) -> Result<StatusReport> {
        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ClassboardError::NotFound(device_id.to_string()));
        }
        if !status.is_success() {
            return Err(ClassboardError::Status(status.as_u16()));
        }

        let body = resp.bytes().await?;
        Ok(StatusReport::from_body(&body))
    }
}

fn require_device_id(device_id: &str) -> Result<()> {
    if device_id.trim().is_empty() {
        return Err(ClassboardError::InvalidInput(
            "device id must not be empty".to_string(),
        ));
    }
    Ok(())
}

#[async_trait]
impl RegistryApi for RegistryClient {
    async fn handshake(&self, device_id: &str) -> Result<StatusReport> {
        require_device_id(device_id)?;

        let url = self.endpoint(&["api", "registry", "handshake"]);
        let body = HandshakeRequest {
            device_id: device_id.to_string(),
        };

        tracing::debug!("Handshake {} -> {}", device_id, url);
        let resp = self.client.post(url).json(&body).send().await?;
        Self::read_report(resp, device_id).await
    }

    async fn status(&self, device_id: &str) -> Result<StatusReport> {
        require_device_id(device_id)?;

        let url = self.endpoint(&["api", "registry", "status", device_id]);
        let resp = self.client.get(url).send().await?;
        Self::read_report(resp, device_id).await
    }
}
