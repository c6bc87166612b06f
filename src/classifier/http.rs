//! Inference-server classifier backend.
//!
//! Speaks the Hugging Face text-classification protocol:
//! `POST {endpoint}/models/{model}` with `{"inputs": text}`, answered by
//! either `[[{label, score}, ...]]` or `[{label, score}, ...]`.

use super::{EmotionClassifier, remap_labels};
use crate::config::ClassifierConfig;
use crate::models::{BaseEmotion, ClassificationResult};
use crate::{Error, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// HTTP emotion classifier.
pub struct HttpClassifier {
    /// Inference server base URL.
    endpoint: String,
    /// Model identifier.
    model: String,
    /// Optional bearer token.
    api_key: Option<SecretString>,
    /// HTTP client.
    client: reqwest::blocking::Client,
}

impl HttpClassifier {
    /// Builds a classifier from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClassifierUnavailable`] if the HTTP client cannot be built.
    pub fn from_config(config: &ClassifierConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::ClassifierUnavailable {
                cause: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            client,
        })
    }

    /// Sets the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(key.into()));
        self
    }

    /// Returns the model identifier.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns the request URL.
    #[must_use]
    pub fn url(&self) -> String {
        format!("{}/models/{}", self.endpoint, self.model)
    }

    /// Sends one inference request.
    fn request(&self, text: &str) -> Result<ClassificationResult> {
        let request = InferenceRequest {
            inputs: text,
            parameters: InferenceParameters {
                top_k: BaseEmotion::recognized().len() + 1,
            },
        };

        let mut builder = self.client.post(self.url()).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key.expose_secret());
        }

        let response = builder.send().map_err(|e| Error::ClassifierUnavailable {
            cause: e.to_string(),
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(Error::ClassifierUnavailable {
                cause: format!("inference server returned status: {status} - {body}"),
            });
        }

        let body = response.text().map_err(|e| Error::ClassifierUnavailable {
            cause: e.to_string(),
        })?;
        parse_response(&body)
    }
}

impl std::fmt::Debug for HttpClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClassifier")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .finish_non_exhaustive()
    }
}

impl EmotionClassifier for HttpClassifier {
    fn name(&self) -> &'static str {
        "http"
    }

    #[tracing::instrument(skip(self, text), fields(model = %self.model, text_len = text.len()))]
    fn classify(&self, text: &str) -> Result<ClassificationResult> {
        if text.trim().is_empty() {
            return Err(Error::InvalidInput("Cannot classify empty text".to_string()));
        }

        let start = Instant::now();
        let result = self.request(text);
        let status = if result.is_ok() { "success" } else { "error" };

        metrics::counter!("classifier_requests_total", "status" => status).increment(1);
        metrics::histogram!("classifier_duration_ms").record(start.elapsed().as_secs_f64() * 1000.0);

        match &result {
            Ok(classification) if classification.is_empty() => {
                tracing::warn!("Classifier returned no labels");
            },
            Ok(_) => {},
            Err(e) => tracing::error!(error = %e, "Classifier request failed"),
        }
        result
    }
}

/// Parses an inference server response body.
///
/// # Errors
///
/// Returns [`Error::ClassifierUnavailable`] if the body is neither shape, or
/// carries an `error` field.
pub(crate) fn parse_response(body: &str) -> Result<ClassificationResult> {
    let parsed: InferenceResponse =
        serde_json::from_str(body).map_err(|e| Error::ClassifierUnavailable {
            cause: format!("unexpected inference response: {e}"),
        })?;

    let raw = match parsed {
        InferenceResponse::Nested(mut batches) => {
            if batches.is_empty() {
                Vec::new()
            } else {
                batches.swap_remove(0)
            }
        },
        InferenceResponse::Flat(scores) => scores,
        InferenceResponse::Failure { error } => {
            return Err(Error::ClassifierUnavailable { cause: error });
        },
    };

    let pairs: Vec<(String, f32)> = raw.into_iter().map(|s| (s.label, s.score)).collect();
    Ok(remap_labels(&pairs))
}

/// Request body.
#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
}

/// Request parameters.
#[derive(Debug, Serialize)]
struct InferenceParameters {
    /// Return every label, not only the top one.
    top_k: usize,
}

/// One raw label score.
#[derive(Debug, Deserialize)]
struct RawScore {
    label: String,
    score: f32,
}

/// Response body shapes.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Nested(Vec<Vec<RawScore>>),
    Flat(Vec<RawScore>),
    Failure { error: String },
}
