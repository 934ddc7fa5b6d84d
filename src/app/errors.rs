use crate::{
    analysis::AnalysisError, config::ConfigError, records::RecordSourceError,
    semantic::{EmbeddingError, MatchError},
};

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("matching failed: {0}")]
    Match(#[from] MatchError),

    #[error("analysis failed: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("could not load records: {0}")]
    Records(#[from] RecordSourceError),
}
