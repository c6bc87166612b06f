//! Environment variable overrides.

use super::AimindConfig;
use crate::{Error, Result};
use secrecy::SecretString;
use std::path::PathBuf;
use std::str::FromStr;

/// Applies `AIMIND_*` environment overrides to a loaded configuration.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if a numeric variable cannot be parsed.
pub fn apply_env_overrides(config: &mut AimindConfig) -> Result<()> {
    apply_overrides_from(config, |key| std::env::var(key).ok())
}

/// Applies overrides from an arbitrary lookup.
pub(crate) fn apply_overrides_from<F>(config: &mut AimindConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| {
        lookup(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    };

    if let Some(dir) = get("AIMIND_DATA_DIR") {
        config.data_dir = PathBuf::from(dir);
    }
    if let Some(endpoint) = get("AIMIND_CLASSIFIER_ENDPOINT") {
        config.classifier.endpoint = endpoint;
    }
    if let Some(model) = get("AIMIND_CLASSIFIER_MODEL") {
        config.classifier.model = model;
    }
    if let Some(key) = get("AIMIND_CLASSIFIER_API_KEY") {
        config.classifier.api_key = Some(SecretString::from(key));
    }
    if let Some(value) = get("AIMIND_SIMILARITY_THRESHOLD") {
        config.crisis.similarity_threshold = parse_number("AIMIND_SIMILARITY_THRESHOLD", &value)?;
    }
    if let Some(value) = get("AIMIND_MIN_CONFIDENCE") {
        config.normalizer.min_confidence = parse_number("AIMIND_MIN_CONFIDENCE", &value)?;
    }
    if let Some(value) = get("AIMIND_HISTORY_PAIRS") {
        config.history.max_pairs = parse_number("AIMIND_HISTORY_PAIRS", &value)?;
    }
    if let Some(format) = get("AIMIND_LOG_FORMAT") {
        config.logging.format = Some(format);
    }
    if let Some(file) = get("AIMIND_LOG_FILE") {
        config.logging.file = Some(PathBuf::from(file));
    }
    if let Some(value) = get("AIMIND_METRICS_ENABLED") {
        config.metrics.enabled = parse_bool(&value);
    }
    if config.llm.api_key.is_none() {
        config.llm.api_key = get("OPENAI_API_KEY").map(SecretString::from);
    }

    Ok(())
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::InvalidInput(format!("{key} is not a valid number: {value}")))
}

fn parse_bool(value: &str) -> bool {
    let value = value.to_lowercase();
    value == "true" || value == "1" || value == "yes"
}
