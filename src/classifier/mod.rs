mod remote;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

pub use remote::RemoteClassifier;

use crate::config::{env_parse, env_value};

/// Result type for classifier operations
pub type ClassifierResult<T> = Result<T, ClassifierError>;

/// Errors that can occur while classifying a frame
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClassifierError {
    #[error("classification request failed: {0}")]
    Request(String),

    #[error("classification timed out after {0:?}")]
    Timeout(Duration),

    #[error("invalid classifier configuration: {0}")]
    Config(String),

    #[error("classifier response could not be parsed: {0}")]
    Parse(String),
}

/// One candidate label, as ranked by the classifier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Prediction {
    pub label: String,
    #[serde(alias = "probability")]
    pub confidence: f32,
}

/// A still image captured from the camera
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub bytes: Vec<u8>,
}

impl Frame {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Decode a frame sent by the browser, either plain base64 or a `data:` URL
    pub fn from_base64(encoded: &str) -> Option<Self> {
        use base64::{engine::general_purpose::STANDARD, Engine as _};

        let payload = match encoded.split_once(";base64,") {
            Some((_, data)) => data,
            None => encoded,
        };
        let bytes = STANDARD.decode(payload.trim()).ok()?;
        (!bytes.is_empty()).then(|| Self::new(bytes))
    }
}

/// Image classification seam used by the scavenger hunt
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Ranked candidate labels for the frame, most likely first
    async fn classify(&self, frame: &Frame) -> ClassifierResult<Vec<Prediction>>;

    /// Name of this classifier, for logging
    fn name(&self) -> &str;
}

/// Configuration for the remote classifier
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Inference endpoint. `None` disables classification entirely.
    pub url: Option<String>,
    pub timeout: Duration,
    /// Number of candidates to request
    pub top_k: u32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout: Duration::from_secs(10),
            top_k: 3,
        }
    }
}

impl ClassifierConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            url: env_value("CLASSIFIER_URL"),
            timeout: env_parse("CLASSIFIER_TIMEOUT")
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            top_k: env_parse("CLASSIFIER_TOP_K").unwrap_or(defaults.top_k),
        }
    }

    /// Build the configured classifier, if any
    pub fn build(&self) -> ClassifierResult<Option<Arc<dyn Classifier>>> {
        let Some(url) = &self.url else {
            return Ok(None);
        };
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ClassifierError::Config(format!(
                "CLASSIFIER_URL must be an http(s) URL, got '{}'",
                url
            )));
        }
        let classifier = RemoteClassifier::new(url.clone(), self.timeout, self.top_k)?;
        Ok(Some(Arc::new(classifier)))
    }
}
