use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::{
    analysis,
    app::IntentService,
    cli::validation::{validate_column, validate_output, validate_references},
    records,
    storage::{BackendLocal, StorageManager},
};

use super::types::TextArgs;

pub fn handle_score(text_args: TextArgs, service: &IntentService) -> Result<()> {
    validate_references(text_args.references().unwrap_or(service.intents()))?;

    let matrix = service.score(&text_args.queries, text_args.references())?;
    println!("{}", serde_json::to_string_pretty(&matrix)?);
    Ok(())
}

pub fn handle_match(text_args: TextArgs, service: &IntentService) -> Result<()> {
    validate_references(text_args.references().unwrap_or(service.intents()))?;

    let matches = service.best_matches(&text_args.queries, text_args.references())?;
    println!("{}", serde_json::to_string_pretty(&matches)?);
    Ok(())
}

pub fn handle_analyze(
    input: PathBuf,
    column: String,
    output: Option<PathBuf>,
    json: bool,
    service: &IntentService,
) -> Result<()> {
    validate_column(&column)?;
    validate_references(service.intents())?;

    let source = records::source_for_path(&input)?;
    let rows = service.analyze(source.as_ref(), &column)?;

    if json {
        let view: Vec<_> = rows.iter().map(|r| r.row(&column)).collect();
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    let output = output.unwrap_or_else(|| default_output_path(&input));
    validate_output(&input, &output)?;

    let mut buffer = Vec::new();
    analysis::write_csv(&rows, &mut buffer, service.config().score_precision)?;
    write_atomic(&output, &buffer)?;

    println!("{} records analyzed, saved to {}", rows.len(), output.display());
    Ok(())
}

pub fn handle_normalize(texts: Vec<String>, service: &IntentService) -> Result<()> {
    for normalized in service.normalize(&texts) {
        println!("{normalized}");
    }
    Ok(())
}

pub fn handle_intents(service: &IntentService) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(service.intents())?);
    Ok(())
}

/// Replace `path` in one step so a failed run never leaves a partial file.
fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let name = path
        .file_name()
        .with_context(|| format!("Invalid output path {}", path.display()))?
        .to_string_lossy();

    BackendLocal::new(dir)
        .and_then(|store| store.write(&name, data))
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// `<dir>/<stem>_intents_<YYYY-MM-DD>.csv` next to the input.
fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "records".to_string());
    let date = chrono::Local::now().format("%Y-%m-%d");

    input.with_file_name(format!("{stem}_intents_{date}.csv"))
}
