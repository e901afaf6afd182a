use super::*;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Classifier backed by an HTTP inference endpoint.
///
/// The frame is posted as base64 JSON; the endpoint answers with a ranked
/// list of `{label, confidence}` predictions.
pub struct RemoteClassifier {
    url: String,
    top_k: u32,
    timeout: Duration,
    client: reqwest::Client,
}

impl RemoteClassifier {
    pub fn new(url: String, timeout: Duration, top_k: u32) -> ClassifierResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClassifierError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url,
            top_k,
            timeout,
            client,
        })
    }
}

#[derive(Debug, Serialize)]
struct ClassifyRequest {
    image: String,
    top_k: u32,
}

#[derive(Debug, Deserialize)]
struct ClassifyResponse {
    predictions: Vec<Prediction>,
}

#[async_trait]
impl Classifier for RemoteClassifier {
    async fn classify(&self, frame: &Frame) -> ClassifierResult<Vec<Prediction>> {
        use base64::{engine::general_purpose::STANDARD, Engine as _};

        let start = Instant::now();
        let body = ClassifyRequest {
            image: STANDARD.encode(&frame.bytes),
            top_k: self.top_k,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClassifierError::Timeout(self.timeout)
                } else {
                    ClassifierError::Request(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(ClassifierError::Request(format!(
                "endpoint returned status {}",
                response.status()
            )));
        }

        let parsed: ClassifyResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::Parse(e.to_string()))?;

        tracing::debug!(
            "Classified frame ({} bytes) in {}ms: {:?}",
            frame.bytes.len(),
            start.elapsed().as_millis(),
            parsed.predictions
        );

        Ok(parsed.predictions)
    }

    fn name(&self) -> &str {
        "remote"
    }
}
