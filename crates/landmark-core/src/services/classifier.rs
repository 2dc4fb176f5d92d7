//! Image classification client.
//!
//! Posts raw JPEG bytes to a Custom Vision style prediction endpoint and
//! returns the prediction list in the order the service sent it.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::{Duration, Instant};

use crate::config::ClassifierEndpoint;
use crate::error::{ServiceError, ServiceKind, ServiceResult};
use crate::types::Prediction;

/// Trait for anything that can turn an image into ranked predictions.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Service name for logging.
    fn name(&self) -> &str;

    /// Classify a JPEG image. An empty list is a valid answer.
    async fn classify(&self, jpeg: &[u8]) -> ServiceResult<Vec<Prediction>>;
}

/// Client for a Custom Vision prediction endpoint.
pub struct CustomVisionClassifier {
    endpoint: ClassifierEndpoint,
    client: reqwest::Client,
    timeout: Duration,
}

impl CustomVisionClassifier {
    pub fn new(endpoint: ClassifierEndpoint, timeout: Duration) -> Self {
        Self {
            endpoint,
            client: reqwest::Client::new(),
            timeout,
        }
    }
}

#[derive(Deserialize)]
struct PredictionResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

/// Parse a prediction response body.
///
/// A body without a `predictions` field yields an empty list.
pub(crate) fn parse_predictions(body: &str) -> ServiceResult<Vec<Prediction>> {
    let parsed: PredictionResponse =
        serde_json::from_str(body).map_err(|e| ServiceError::UnexpectedFormat {
            service: ServiceKind::Classification,
            message: format!("Failed to parse predictions: {e}"),
        })?;
    Ok(parsed.predictions)
}

#[async_trait]
impl Classifier for CustomVisionClassifier {
    fn name(&self) -> &str {
        "custom-vision"
    }

    async fn classify(&self, jpeg: &[u8]) -> ServiceResult<Vec<Prediction>> {
        let start = Instant::now();

        let resp = self
            .client
            .post(&self.endpoint.url)
            .header("Prediction-Key", &self.endpoint.prediction_key)
            .header("Content-Type", "application/octet-stream")
            .body(jpeg.to_vec())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ServiceError::transport(ServiceKind::Classification, &e))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ServiceError::Status {
                service: ServiceKind::Classification,
                status_code: status.as_u16(),
                message: text,
            });
        }

        let body = resp
            .text()
            .await
            .map_err(|e| ServiceError::transport(ServiceKind::Classification, &e))?;
        let predictions = parse_predictions(&body)?;

        tracing::debug!(
            "Classification returned {} prediction(s) in {}ms",
            predictions.len(),
            start.elapsed().as_millis()
        );
        Ok(predictions)
    }
}
