use crate::{
    semantic::{StopWordLanguage, TextNormalizer, DEFAULT_MODEL},
    storage::{BackendLocal, StorageManager},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.yaml";

/// Default model download timeout in seconds
const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 300;
/// Decimal digits kept when scores are written out
const DEFAULT_SCORE_PRECISION: usize = 6;
const MAX_SCORE_PRECISION: usize = 9;

/// Intent sentences used when the config does not list any.
pub const DEFAULT_INTENTS: [&str; 10] = [
    "What are the latest AI breakthroughs?",
    "How can AI improve productivity?",
    "Will AI replace human jobs?",
    "What are the ethical concerns of AI?",
    "What is the best AI model for my use case?",
    "How can AI help small businesses grow?",
    "Which AI tools are worth using in 2025?",
    "Best AI research papers to read this year?",
    "How can I start learning AI development?",
    "What's the future of AI in creative industries?",
];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config is malformed: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("config file is not valid utf8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("{field}: {message}")]
    Invalid { field: String, message: String },
}

impl ConfigError {
    fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StopWordsConfig {
    /// Built-in list: "english" or "none"
    #[serde(default = "default_stop_word_language")]
    pub language: String,

    /// Additional words to drop during normalization
    #[serde(default)]
    pub extra: Vec<String>,
}

impl Default for StopWordsConfig {
    fn default() -> Self {
        Self {
            language: default_stop_word_language(),
            extra: vec![],
        }
    }
}

fn default_stop_word_language() -> String {
    "english".to_string()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Model name for embeddings (e.g., "all-MiniLM-L6-v2")
    #[serde(default = "default_model")]
    pub model: String,

    /// Timeout for model download in seconds
    #[serde(default = "default_download_timeout_secs")]
    pub download_timeout_secs: u64,

    /// Batch size passed to the embedding model, model default when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<usize>,

    #[serde(default)]
    pub stop_words: StopWordsConfig,

    /// Reference sentences every text is matched against
    #[serde(default = "default_intents")]
    pub intents: Vec<String>,

    #[serde(default = "default_score_precision")]
    pub score_precision: usize,

    #[serde(skip_serializing, skip_deserializing)]
    base_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: default_model(),
            download_timeout_secs: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
            batch_size: None,
            stop_words: StopWordsConfig::default(),
            intents: default_intents(),
            score_precision: DEFAULT_SCORE_PRECISION,
            base_path: PathBuf::new(),
        }
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_download_timeout_secs() -> u64 {
    DEFAULT_DOWNLOAD_TIMEOUT_SECS
}

fn default_intents() -> Vec<String> {
    DEFAULT_INTENTS.iter().map(|s| s.to_string()).collect()
}

fn default_score_precision() -> usize {
    DEFAULT_SCORE_PRECISION
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::invalid("model", "must not be empty"));
        }

        if self.download_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "download_timeout_secs",
                "must be greater than 0",
            ));
        }

        if self.batch_size == Some(0) {
            return Err(ConfigError::invalid("batch_size", "must be greater than 0"));
        }

        if StopWordLanguage::parse(&self.stop_words.language).is_none() {
            return Err(ConfigError::invalid(
                "stop_words.language",
                format!(
                    "must be 'english' or 'none', got '{}'",
                    self.stop_words.language
                ),
            ));
        }

        if !(1..=MAX_SCORE_PRECISION).contains(&self.score_precision) {
            return Err(ConfigError::invalid(
                "score_precision",
                format!(
                    "must be between 1 and {MAX_SCORE_PRECISION}, got {}",
                    self.score_precision
                ),
            ));
        }

        for (idx, intent) in self.intents.iter().enumerate() {
            if intent.trim().is_empty() {
                return Err(ConfigError::invalid(
                    "intents",
                    format!("intent #{} is empty", idx + 1),
                ));
            }
        }

        Ok(())
    }

    pub fn load_with(base_path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let base_path = base_path.as_ref();
        let store = BackendLocal::new(base_path)?;

        // create new if does not exist
        if !store.exists(CONFIG_FILE) {
            log::info!("Creating default config at {}", base_path.join(CONFIG_FILE).display());
            store.write(CONFIG_FILE, serde_yml::to_string(&Self::default())?.as_bytes())?;
        }

        let config_str = String::from_utf8(store.read(CONFIG_FILE)?)?;
        let mut config: Self = serde_yml::from_str(&config_str)?;

        config.base_path = base_path.to_path_buf();

        config.validate()?;

        // resave in case config version needs an upgrade
        if config_str != serde_yml::to_string(&config)? {
            log::debug!("Upgrading config file format");
            config.save()?;
        }

        Ok(config)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let store = BackendLocal::new(&self.base_path)?;

        let config_str = serde_yml::to_string(&self)?;
        store.write(CONFIG_FILE, config_str.as_bytes())?;
        Ok(())
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Build the normalizer described by `stop_words`.
    pub fn normalizer(&self) -> TextNormalizer {
        let language =
            StopWordLanguage::parse(&self.stop_words.language).unwrap_or(StopWordLanguage::English);
        TextNormalizer::new(language, &self.stop_words.extra)
    }
}
