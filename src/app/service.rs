//! Intent matching service.
//!
//! Owns the loaded configuration and lazily builds the similarity matcher
//! (normalizer + embedding model) on first use. The model is loaded once and
//! then shared read-only for every call.

use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;

use crate::{
    analysis::{AnalyzedRecord, IntentAnalyzer},
    app::errors::AppError,
    config::Config,
    records::RecordSource,
    semantic::{Embedder, EmbeddingModel, MatchResult, SimilarityMatcher, SimilarityMatrix},
};

pub struct IntentService {
    config: Config,
    matcher: OnceCell<SimilarityMatcher>,
}

impl IntentService {
    /// Create a service that loads the configured model on first use.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            matcher: OnceCell::new(),
        }
    }

    /// Create a service around an already constructed embedding provider.
    pub fn with_embedder(config: Config, embedder: Arc<dyn Embedder>) -> Self {
        let matcher = SimilarityMatcher::new(Arc::new(config.normalizer()), embedder);
        Self {
            config,
            matcher: OnceCell::with_value(matcher),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn intents(&self) -> &[String] {
        &self.config.intents
    }

    /// Check if the embedding model has been loaded.
    pub fn is_initialized(&self) -> bool {
        self.matcher.get().is_some()
    }

    pub fn matcher(&self) -> Result<&SimilarityMatcher, AppError> {
        self.matcher.get_or_try_init(|| self.init_matcher())
    }

    /// Normalized form of each text; never touches the model.
    pub fn normalize(&self, texts: &[String]) -> Vec<String> {
        match self.matcher.get() {
            Some(matcher) => matcher.normalizer().normalize_batch(texts),
            None => self.config.normalizer().normalize_batch(texts),
        }
    }

    /// Similarity matrix of `queries` against `references`, or against the
    /// configured intents when no references are given.
    pub fn score(
        &self,
        queries: &[String],
        references: Option<&[String]>,
    ) -> Result<SimilarityMatrix, AppError> {
        let references = references.unwrap_or(self.intents());
        Ok(self.matcher()?.score(queries, references)?)
    }

    pub fn best_matches(
        &self,
        queries: &[String],
        references: Option<&[String]>,
    ) -> Result<Vec<MatchResult>, AppError> {
        let references = references.unwrap_or(self.intents());
        Ok(self.matcher()?.best_matches(queries, references)?)
    }

    /// Load records from `source` and match `text_column` against the intents.
    pub fn analyze(
        &self,
        source: &dyn RecordSource,
        text_column: &str,
    ) -> Result<Vec<AnalyzedRecord>, AppError> {
        let _span = tracing::info_span!("analyze", source = source.name(), column = text_column)
            .entered();

        let records = source.load()?;
        log::info!("Loaded {} records from {}", records.len(), source.name());

        let analyzer = IntentAnalyzer::new(self.matcher()?, self.intents());
        Ok(analyzer.analyze(records, text_column)?)
    }

    fn init_matcher(&self) -> Result<SimilarityMatcher, AppError> {
        log::info!("Initializing intent matcher with model '{}'", self.config.model);

        let timeout = Duration::from_secs(self.config.download_timeout_secs);
        let model = EmbeddingModel::new(
            &self.config.model,
            self.config.base_path().to_path_buf(),
            Some(timeout),
        )?
        .with_batch_size(self.config.batch_size);

        Ok(SimilarityMatcher::new(
            Arc::new(self.config.normalizer()),
            Arc::new(model),
        ))
    }
}
