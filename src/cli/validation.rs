use std::path::Path;

use crate::cli::errors::{CliError, CliResult};

/// Validates the name of the text column
pub fn validate_column(column: &str) -> CliResult<()> {
    if column.trim().is_empty() {
        return Err(CliError::validation("column", "Column name cannot be empty"));
    }
    Ok(())
}

/// Validates that the output will not overwrite the input
pub fn validate_output(input: &Path, output: &Path) -> CliResult<()> {
    if input == output {
        return Err(CliError::validation(
            "output",
            "Output path must differ from the input file",
        ));
    }

    if output
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| !e.eq_ignore_ascii_case("csv"))
        .unwrap_or(true)
    {
        return Err(CliError::validation("output", "Output file must end in .csv"));
    }

    Ok(())
}

/// Validates that there is something to match against
pub fn validate_references(references: &[String]) -> CliResult<()> {
    if references.is_empty() {
        return Err(CliError::configuration(
            "No references given and no intents configured in config.yaml",
        ));
    }
    Ok(())
}
