//! Semantic intent matching.
//!
//! Scores scraped texts against reference intent sentences using
//! sentence embeddings and cosine similarity.
//!
//! # Architecture
//!
//! - `preprocess`: Text normalization and stop words
//! - `embeddings`: Embedding provider trait and the fastembed implementation
//! - `matcher`: Similarity matrix and best-match extraction

pub mod embeddings;
mod matcher;
mod preprocess;

pub use embeddings::{Embedder, EmbeddingError, EmbeddingModel};
pub use matcher::{
    argmax, best_matches_from_matrix, cosine_similarity, BatchSide, MatchError, MatchResult,
    SimilarityMatcher, SimilarityMatrix,
};
pub use preprocess::{RawText, StopWordLanguage, TextNormalizer, EMPTY_TEXT};

/// Default embedding model name
pub const DEFAULT_MODEL: &str = "all-MiniLM-L6-v2";
