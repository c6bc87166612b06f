//! Configuration management.
//!
//! Configuration is resolved in three layers, later layers winning:
//!
//! 1. Built-in defaults
//! 2. A TOML file (`--config`, else the platform config dir `aimind/config.toml`)
//! 3. `AIMIND_*` environment variables

mod env;

pub use env::apply_env_overrides;

use crate::{Error, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration for aimind.
#[derive(Debug, Clone)]
pub struct AimindConfig {
    /// Path to the data directory (SQLite database lives here).
    pub data_dir: PathBuf,
    /// Classifier backend configuration.
    pub classifier: ClassifierConfig,
    /// Crisis detector configuration.
    pub crisis: CrisisConfig,
    /// Emotion normalizer configuration.
    pub normalizer: NormalizerConfig,
    /// History window configuration.
    pub history: HistoryConfig,
    /// Prompt composer configuration.
    pub prompt: PromptConfig,
    /// Completion model configuration.
    pub llm: LlmConfig,
    /// Logging configuration.
    pub logging: LoggingSettings,
    /// Metrics configuration.
    pub metrics: MetricsSettings,
}

/// Classifier backend configuration.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Inference server endpoint.
    pub endpoint: String,
    /// Model identifier sent to the inference server.
    pub model: String,
    /// Optional bearer token.
    pub api_key: Option<SecretString>,
    /// Request timeout.
    pub timeout: Duration,
}

impl ClassifierConfig {
    /// Default inference server endpoint.
    pub const DEFAULT_ENDPOINT: &'static str = "http://localhost:8080";
    /// Default model identifier.
    pub const DEFAULT_MODEL: &'static str = "pysentimiento/robertuito-emotion-analysis";
    /// Default request timeout in milliseconds.
    pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: Self::DEFAULT_ENDPOINT.to_string(),
            model: Self::DEFAULT_MODEL.to_string(),
            api_key: None,
            timeout: Duration::from_millis(Self::DEFAULT_TIMEOUT_MS),
        }
    }
}

/// Crisis detector configuration.
#[derive(Debug, Clone)]
pub struct CrisisConfig {
    /// Fuzzy-match threshold in `[0.0, 1.0]`.
    pub similarity_threshold: f64,
    /// Phrases added on top of the built-in set.
    pub extra_patterns: Vec<String>,
}

impl Default for CrisisConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: crate::crisis::DEFAULT_SIMILARITY_THRESHOLD,
            extra_patterns: Vec::new(),
        }
    }
}

/// Emotion normalizer configuration.
#[derive(Debug, Clone, Copy)]
pub struct NormalizerConfig {
    /// Minimum confidence for the top label, in `[0.0, 1.0]`.
    pub min_confidence: f32,
    /// Evaluate the combination rule before single-label mapping.
    pub prefer_combinations: bool,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            min_confidence: crate::emotion::DEFAULT_MIN_CONFIDENCE,
            prefer_combinations: false,
        }
    }
}

/// History window configuration.
#[derive(Debug, Clone, Copy)]
pub struct HistoryConfig {
    /// Maximum user/assistant pairs in the window.
    pub max_pairs: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_pairs: crate::history::DEFAULT_MAX_PAIRS,
        }
    }
}

/// Prompt composer configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptConfig {
    /// Ask the completion model to annotate the tone it chose.
    pub request_affect_annotation: bool,
}

/// Completion model configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// API endpoint (`None` uses the provider default).
    pub endpoint: Option<String>,
    /// Model name (`None` uses the provider default).
    pub model: Option<String>,
    /// API key (`None` falls back to `OPENAI_API_KEY`).
    pub api_key: Option<SecretString>,
    /// Completion token limit.
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            model: None,
            api_key: None,
            max_tokens: 300,
        }
    }
}

/// Logging settings as configured (resolved by [`crate::observability`]).
#[derive(Debug, Clone, Default)]
pub struct LoggingSettings {
    /// Output format: `pretty` or `json`.
    pub format: Option<String>,
    /// Optional log file path.
    pub file: Option<PathBuf>,
    /// Filter directive, e.g. `info` or `aimind=debug`.
    pub level: Option<String>,
}

/// Metrics settings.
#[derive(Debug, Clone, Copy)]
pub struct MetricsSettings {
    /// Install the Prometheus recorder.
    pub enabled: bool,
    /// Port for the Prometheus HTTP listener.
    pub port: u16,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            port: 9090,
        }
    }
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// Data directory.
    pub data_dir: Option<String>,
    /// Classifier section.
    pub classifier: Option<ConfigFileClassifier>,
    /// Crisis section.
    pub crisis: Option<ConfigFileCrisis>,
    /// Normalizer section.
    pub normalizer: Option<ConfigFileNormalizer>,
    /// History section.
    pub history: Option<ConfigFileHistory>,
    /// Prompt section.
    pub prompt: Option<ConfigFilePrompt>,
    /// LLM section.
    pub llm: Option<ConfigFileLlm>,
    /// Logging section.
    pub logging: Option<ConfigFileLogging>,
    /// Metrics section.
    pub metrics: Option<ConfigFileMetrics>,
}

/// Classifier section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileClassifier {
    /// Endpoint.
    pub endpoint: Option<String>,
    /// Model.
    pub model: Option<String>,
    /// API key.
    pub api_key: Option<String>,
    /// Timeout in milliseconds.
    pub timeout_ms: Option<u64>,
}

/// Crisis section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileCrisis {
    /// Similarity threshold.
    pub similarity_threshold: Option<f64>,
    /// Extra phrases.
    pub extra_patterns: Option<Vec<String>>,
}

/// Normalizer section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileNormalizer {
    /// Minimum confidence.
    pub min_confidence: Option<f32>,
    /// Combination rule first.
    pub prefer_combinations: Option<bool>,
}

/// History section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileHistory {
    /// Maximum pairs.
    pub max_pairs: Option<usize>,
}

/// Prompt section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFilePrompt {
    /// Affect annotation trailer.
    pub request_affect_annotation: Option<bool>,
}

/// LLM section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileLlm {
    /// Endpoint.
    pub endpoint: Option<String>,
    /// Model name.
    pub model: Option<String>,
    /// API key.
    pub api_key: Option<String>,
    /// Token limit.
    pub max_tokens: Option<u32>,
}

/// Logging section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileLogging {
    /// Format.
    pub format: Option<String>,
    /// File path.
    pub file: Option<String>,
    /// Level or filter directive.
    pub level: Option<String>,
}

/// Metrics section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileMetrics {
    /// Enabled.
    pub enabled: Option<bool>,
    /// Listener port.
    pub port: Option<u16>,
}

impl Default for AimindConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".aimind"),
            classifier: ClassifierConfig::default(),
            crisis: CrisisConfig::default(),
            normalizer: NormalizerConfig::default(),
            history: HistoryConfig::default(),
            prompt: PromptConfig::default(),
            llm: LlmConfig::default(),
            logging: LoggingSettings::default(),
            metrics: MetricsSettings::default(),
        }
    }
}

impl AimindConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML for [`ConfigFile`].
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(contents).map_err(|e| Error::OperationFailed {
            operation: "parse_config_file".to_string(),
            cause: e.to_string(),
        })?;
        Ok(Self::from_config_file(file))
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
            operation: "read_config_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the platform config dir, then `~/.config/aimind/`. Returns
    /// defaults if no readable config file is found.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default();
        };

        let candidates = [
            base_dirs.config_dir().join("aimind").join("config.toml"),
            base_dirs
                .home_dir()
                .join(".config")
                .join("aimind")
                .join("config.toml"),
        ];

        for path in candidates.iter().filter(|p| p.exists()) {
            match Self::load_from_file(path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable config file");
                },
            }
        }

        Self::default()
    }

    /// Loads configuration: explicit path if given, else the default
    /// location; then applies environment overrides and validates.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit file cannot be loaded, or if the
    /// resolved values are out of range.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load_default(),
        };
        apply_env_overrides(&mut config)?;
        config.validate()?;
        Ok(config)
    }

    /// Converts a `ConfigFile` to `AimindConfig`.
    fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(data_dir) = file.data_dir {
            config.data_dir = PathBuf::from(data_dir);
        }
        if let Some(classifier) = file.classifier {
            if let Some(endpoint) = classifier.endpoint {
                config.classifier.endpoint = endpoint;
            }
            if let Some(model) = classifier.model {
                config.classifier.model = model;
            }
            config.classifier.api_key = classifier.api_key.map(SecretString::from);
            if let Some(ms) = classifier.timeout_ms {
                config.classifier.timeout = Duration::from_millis(ms);
            }
        }
        if let Some(crisis) = file.crisis {
            if let Some(threshold) = crisis.similarity_threshold {
                config.crisis.similarity_threshold = threshold;
            }
            if let Some(extra) = crisis.extra_patterns {
                config.crisis.extra_patterns = extra;
            }
        }
        if let Some(normalizer) = file.normalizer {
            if let Some(min) = normalizer.min_confidence {
                config.normalizer.min_confidence = min;
            }
            if let Some(v) = normalizer.prefer_combinations {
                config.normalizer.prefer_combinations = v;
            }
        }
        if let Some(max_pairs) = file.history.and_then(|h| h.max_pairs) {
            config.history.max_pairs = max_pairs;
        }
        if let Some(v) = file.prompt.and_then(|p| p.request_affect_annotation) {
            config.prompt.request_affect_annotation = v;
        }
        if let Some(llm) = file.llm {
            config.llm.endpoint = llm.endpoint;
            config.llm.model = llm.model;
            config.llm.api_key = llm.api_key.map(SecretString::from);
            if let Some(max_tokens) = llm.max_tokens {
                config.llm.max_tokens = max_tokens;
            }
        }
        if let Some(logging) = file.logging {
            config.logging = LoggingSettings {
                format: logging.format,
                file: logging.file.map(PathBuf::from),
                level: logging.level,
            };
        }
        if let Some(metrics) = file.metrics {
            if let Some(enabled) = metrics.enabled {
                config.metrics.enabled = enabled;
            }
            if let Some(port) = metrics.port {
                config.metrics.port = port;
            }
        }

        config
    }

    /// Checks that thresholds and sizes are in range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] naming the first offending key.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.crisis.similarity_threshold) {
            return Err(Error::InvalidInput(format!(
                "crisis.similarity_threshold must be within [0, 1], got {}",
                self.crisis.similarity_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.normalizer.min_confidence) {
            return Err(Error::InvalidInput(format!(
                "normalizer.min_confidence must be within [0, 1], got {}",
                self.normalizer.min_confidence
            )));
        }
        if self.history.max_pairs == 0 {
            return Err(Error::InvalidInput(
                "history.max_pairs must be at least 1".to_string(),
            ));
        }
        if self.classifier.endpoint.trim().is_empty() {
            return Err(Error::InvalidInput(
                "classifier.endpoint must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the SQLite database path inside the data directory.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("aimind.db")
    }

    /// Sets the data directory.
    #[must_use]
    pub fn with_data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_dir = path.into();
        self
    }
}
