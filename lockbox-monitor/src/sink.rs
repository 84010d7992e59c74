//! Telemetry sink contract and the TagoIO implementation.

use crate::sample::TelemetrySample;

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("telemetry sink returned {0}")]
    Status(reqwest::StatusCode),
}

#[allow(async_fn_in_trait)]
pub trait TelemetrySink {
    async fn push(&self, sample: &TelemetrySample) -> Result<(), SinkError>;
}

/// Posts samples to the TagoIO data API, authenticated by a static device
/// token header.
pub struct TagoSink {
    http: reqwest::Client,
    url: String,
    token: String,
}

impl TagoSink {
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
            token: token.into(),
        }
    }
}

impl TelemetrySink for TagoSink {
    async fn push(&self, sample: &TelemetrySample) -> Result<(), SinkError> {
        let response = self
            .http
            .post(&self.url)
            .header("Device-Token", &self.token)
            .json(&sample.to_entries())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SinkError::Status(status));
        }
        tracing::debug!(%status, "telemetry sample pushed");
        Ok(())
    }
}
