mod config;

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::semantic::{Embedder, EmbeddingError};

/// Deterministic embedder backed by a lookup table of normalized texts.
///
/// Unknown texts embed to `fallback`. Every call is counted.
pub struct LookupEmbedder {
    table: HashMap<String, Vec<f32>>,
    fallback: Vec<f32>,
    calls: AtomicUsize,
}

impl LookupEmbedder {
    pub fn new(entries: &[(&str, Vec<f32>)], fallback: Vec<f32>) -> Self {
        Self {
            table: entries
                .iter()
                .map(|(text, vector)| (text.to_string(), vector.clone()))
                .collect(),
            fallback,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Embedder for LookupEmbedder {
    fn name(&self) -> &str {
        "lookup"
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts
            .iter()
            .map(|t| self.table.get(t).unwrap_or(&self.fallback).clone())
            .collect())
    }
}

/// Embedder that breaks its contract in a configurable way.
pub enum BrokenEmbedder {
    /// Drops the last vector of every batch
    Short,
    /// Returns a longer vector for the first text of every batch
    Ragged,
    /// Always fails
    Failing,
}

impl Embedder for BrokenEmbedder {
    fn name(&self) -> &str {
        "broken"
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        match self {
            Self::Short => Ok(vec![vec![1.0, 0.0]; texts.len().saturating_sub(1)]),
            Self::Ragged => Ok(texts
                .iter()
                .enumerate()
                .map(|(i, _)| if i == 0 { vec![1.0, 0.0, 0.0] } else { vec![1.0, 0.0] })
                .collect()),
            Self::Failing => Err(EmbeddingError::EmbeddingFailed("model crashed".to_string())),
        }
    }
}
