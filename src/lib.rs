//! Rank scraped social-network texts against intent sentences.
//!
//! The core lives in [`semantic`]: a [`semantic::TextNormalizer`], an
//! [`semantic::Embedder`] and the [`semantic::SimilarityMatcher`] that ties
//! them together. [`records`] and [`analysis`] load scraped dumps and write
//! annotated CSV; [`app`] and [`cli`] wire everything to config.yaml and the
//! command line.

pub mod analysis;
pub mod app;
pub mod cli;
pub mod config;
pub mod records;
pub mod semantic;
pub mod storage;

#[cfg(test)]
mod tests;
