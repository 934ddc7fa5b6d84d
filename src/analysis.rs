//! Per-record intent analysis and CSV export.

use std::io::Write;

use serde::Serialize;

use crate::records::Record;
use crate::semantic::{best_matches_from_matrix, MatchError, SimilarityMatcher};

pub const INTENT_COLUMN: &str = "Best Matched Intent";
pub const SCORE_COLUMN: &str = "Similarity Score";

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("no intents configured to match against")]
    NoIntents,

    #[error(transparent)]
    Match(#[from] MatchError),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A record annotated with its closest intent.
#[derive(Debug, Clone)]
pub struct AnalyzedRecord {
    pub record: Record,
    pub best_matched_intent: String,
    pub similarity_score: f32,
}

/// Serializable view used for JSON output.
#[derive(Debug, Serialize)]
pub struct AnalyzedRow<'a> {
    pub text: Option<&'a str>,
    pub best_matched_intent: &'a str,
    pub similarity_score: f32,
}

pub struct IntentAnalyzer<'a> {
    matcher: &'a SimilarityMatcher,
    intents: &'a [String],
}

impl<'a> IntentAnalyzer<'a> {
    pub fn new(matcher: &'a SimilarityMatcher, intents: &'a [String]) -> Self {
        Self { matcher, intents }
    }

    /// Match the `text_column` of every record against the intents.
    ///
    /// Records without the column are skipped. Records whose column is null
    /// or blank are kept and scored as empty text.
    pub fn analyze(
        &self,
        records: Vec<Record>,
        text_column: &str,
    ) -> Result<Vec<AnalyzedRecord>, AnalysisError> {
        if self.intents.is_empty() {
            return Err(AnalysisError::NoIntents);
        }

        let total = records.len();
        let records: Vec<Record> = records
            .into_iter()
            .filter(|r| r.contains(text_column))
            .collect();

        if records.len() < total {
            log::warn!(
                "Skipping {} of {} records without a '{}' column",
                total - records.len(),
                total,
                text_column
            );
        }

        let texts: Vec<Option<&str>> = records.iter().map(|r| r.text(text_column)).collect();
        let matrix = self.matcher.score(&texts, self.intents)?;
        let matches = best_matches_from_matrix(&matrix, self.intents);

        log::info!(
            "Matched {} records against {} intents",
            matches.len(),
            self.intents.len()
        );

        // one match per row, in row order
        Ok(records
            .into_iter()
            .zip(matches)
            .map(|(record, m)| AnalyzedRecord {
                record,
                best_matched_intent: m.best_reference_text,
                similarity_score: m.best_score,
            })
            .collect())
    }
}

impl AnalyzedRecord {
    pub fn row<'a>(&'a self, text_column: &str) -> AnalyzedRow<'a> {
        AnalyzedRow {
            text: self.record.text(text_column),
            best_matched_intent: &self.best_matched_intent,
            similarity_score: self.similarity_score,
        }
    }
}

/// Write analyzed records as CSV.
///
/// Columns are every record column in first-seen order, followed by the
/// matched intent and the score rounded to `precision` decimals. Intent and
/// score columns already present in the input (a re-analyzed export) are
/// replaced, not repeated.
pub fn write_csv<W: Write>(
    rows: &[AnalyzedRecord],
    writer: W,
    precision: usize,
) -> Result<(), AnalysisError> {
    let mut columns: Vec<&str> = vec![];
    for row in rows {
        for column in row.record.columns() {
            if column == INTENT_COLUMN || column == SCORE_COLUMN {
                continue;
            }
            if !columns.contains(&column) {
                columns.push(column);
            }
        }
    }

    let mut csv_wrt = csv::Writer::from_writer(writer);
    csv_wrt.write_record(columns.iter().copied().chain([INTENT_COLUMN, SCORE_COLUMN]))?;

    for row in rows {
        let mut cells: Vec<String> = columns.iter().map(|c| row.record.display(c)).collect();
        cells.push(row.best_matched_intent.clone());
        cells.push(format!("{:.*}", precision, row.similarity_score));
        csv_wrt.write_record(&cells)?;
    }

    csv_wrt.flush()?;
    Ok(())
}
