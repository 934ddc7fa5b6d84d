//! Pairwise cosine similarity between query texts and reference intents.
//!
//! The matcher normalizes both batches, embeds each with a single provider
//! call, and fills a `queries × references` matrix. `best_matches` reduces
//! every row to its highest-scoring reference.

use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::semantic::embeddings::{Embedder, EmbeddingError};
use crate::semantic::preprocess::{RawText, TextNormalizer};

/// Errors that abort a scoring call.
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Embedding provider returned {got} vectors for {expected} {side} texts")]
    CountMismatch {
        side: BatchSide,
        expected: usize,
        got: usize,
    },

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

/// Which batch a contract violation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchSide {
    Query,
    Reference,
}

impl std::fmt::Display for BatchSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Query => write!(f, "query"),
            Self::Reference => write!(f, "reference"),
        }
    }
}

/// Cosine similarities, one row per query and one column per reference.
///
/// An empty matrix keeps its shape: `0 × M` for no queries, `N × 0` for no
/// references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityMatrix {
    rows: Vec<Vec<f32>>,
    cols: usize,
}

impl SimilarityMatrix {
    /// Build an empty-valued matrix of the given shape. At least one side is zero.
    fn empty(num_rows: usize, cols: usize) -> Self {
        let rows = if cols == 0 {
            vec![Vec::new(); num_rows]
        } else {
            Vec::new()
        };
        Self { rows, cols }
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.num_rows(), self.cols)
    }

    /// True when the matrix holds no scores.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.cols == 0
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        self.rows.get(row).and_then(|r| r.get(col)).copied()
    }

    pub fn row(&self, row: usize) -> Option<&[f32]> {
        self.rows.get(row).map(|r| r.as_slice())
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.rows.iter().map(|r| r.as_slice())
    }
}

/// Best reference for one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub query_index: usize,
    pub best_reference_index: usize,
    pub best_reference_text: String,
    pub best_score: f32,
}

/// Scores query texts against reference texts.
///
/// Holds only immutable state: the normalizer and a shared embedding
/// provider. Every call recomputes embeddings from scratch.
#[derive(Clone)]
pub struct SimilarityMatcher {
    normalizer: Arc<TextNormalizer>,
    embedder: Arc<dyn Embedder>,
}

impl SimilarityMatcher {
    pub fn new(normalizer: Arc<TextNormalizer>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            normalizer,
            embedder,
        }
    }

    pub fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }

    pub fn embedder_name(&self) -> &str {
        self.embedder.name()
    }

    /// Compute the full similarity matrix.
    pub fn score<Q, R>(&self, queries: &[Q], references: &[R]) -> Result<SimilarityMatrix, MatchError>
    where
        Q: RawText,
        R: RawText,
    {
        let _span = tracing::debug_span!(
            "score",
            queries = queries.len(),
            references = references.len(),
            model = self.embedder.name()
        )
        .entered();

        let queries = self.normalizer.normalize_batch(queries);
        let references = self.normalizer.normalize_batch(references);

        if queries.is_empty() || references.is_empty() {
            log::warn!(
                "Empty input to similarity scoring ({} queries, {} references)",
                queries.len(),
                references.len()
            );
            return Ok(SimilarityMatrix::empty(queries.len(), references.len()));
        }

        let query_vectors = self.embed(&queries, BatchSide::Query)?;
        let reference_vectors = self.embed(&references, BatchSide::Reference)?;

        let dimensions = query_vectors[0].len();
        for vector in query_vectors.iter().chain(reference_vectors.iter()) {
            if vector.len() != dimensions {
                return Err(MatchError::DimensionMismatch {
                    expected: dimensions,
                    got: vector.len(),
                });
            }
        }

        log::debug!(
            "Query embeddings shape: ({}, {}), reference embeddings shape: ({}, {})",
            query_vectors.len(),
            dimensions,
            reference_vectors.len(),
            dimensions
        );

        let reference_norms: Vec<f32> = reference_vectors.iter().map(|r| l2_norm(r)).collect();

        let rows: Vec<Vec<f32>> = query_vectors
            .par_iter()
            .map(|query| {
                let query_norm = l2_norm(query);
                reference_vectors
                    .iter()
                    .zip(reference_norms.iter())
                    .map(|(reference, &reference_norm)| {
                        cosine_with_norms(query, query_norm, reference, reference_norm)
                    })
                    .collect()
            })
            .collect();

        Ok(SimilarityMatrix {
            rows,
            cols: reference_vectors.len(),
        })
    }

    /// Best reference per query. Ties go to the lowest reference index.
    ///
    /// Returns an empty list when there are no queries or no references.
    pub fn best_matches<Q, R>(
        &self,
        queries: &[Q],
        references: &[R],
    ) -> Result<Vec<MatchResult>, MatchError>
    where
        Q: RawText,
        R: RawText,
    {
        let matrix = self.score(queries, references)?;
        Ok(best_matches_from_matrix(&matrix, references))
    }

    fn embed(&self, texts: &[String], side: BatchSide) -> Result<Vec<Vec<f32>>, MatchError> {
        let vectors = self.embedder.embed_batch(texts)?;
        if vectors.len() != texts.len() {
            return Err(MatchError::CountMismatch {
                side,
                expected: texts.len(),
                got: vectors.len(),
            });
        }
        Ok(vectors)
    }
}

/// Reduce each matrix row to its argmax, resolving references to their raw text.
pub fn best_matches_from_matrix<R: RawText>(
    matrix: &SimilarityMatrix,
    references: &[R],
) -> Vec<MatchResult> {
    if matrix.is_empty() {
        return vec![];
    }

    matrix
        .rows()
        .enumerate()
        .filter_map(|(query_index, row)| {
            argmax(row).map(|(best_reference_index, best_score)| MatchResult {
                query_index,
                best_reference_index,
                best_reference_text: references
                    .get(best_reference_index)
                    .and_then(|r| r.as_raw())
                    .unwrap_or_default()
                    .to_string(),
                best_score,
            })
        })
        .collect()
}

/// Index and value of the first maximum. Only a strictly greater value
/// replaces the current best, so ties keep the lowest index and NaN never wins.
pub fn argmax(values: &[f32]) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (index, &value) in values.iter().enumerate() {
        match best {
            Some((_, best_value)) if value > best_value || best_value.is_nan() => {
                best = Some((index, value))
            }
            Some(_) => {}
            None => best = Some((index, value)),
        }
    }
    best
}

/// Cosine similarity between two vectors, 0 when either has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    cosine_with_norms(a, l2_norm(a), b, l2_norm(b))
}

fn cosine_with_norms(a: &[f32], a_norm: f32, b: &[f32], b_norm: f32) -> f32 {
    if a_norm == 0.0 || b_norm == 0.0 {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let similarity = dot_product / (a_norm * b_norm);

    if !similarity.is_finite() {
        return 0.0;
    }
    similarity.clamp(-1.0, 1.0)
}

fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}
