//! Typed failures of the input side of a run.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to pick exactly one input file.
#[derive(Debug, Error)]
pub enum LocateError {
    /// No candidate CSV file in the searched directory.
    #[error("no .csv file found in {}; place exactly one inventory export there and re-run", .dir.display())]
    NoInput { dir: PathBuf },

    /// More than one candidate; the run refuses to guess.
    #[error(
        "found {} .csv files in {}, expected exactly one: {}",
        .candidates.len(),
        .dir.display(),
        candidate_names(.candidates)
    )]
    Ambiguous {
        dir: PathBuf,
        candidates: Vec<PathBuf>,
    },

    #[error("failed to list {}: {source}", .dir.display())]
    Io {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure to read host entries from the tabular input.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("column '{0}' not found in input header")]
    MissingColumn(String),

    #[error("malformed row at line {line}: {source}")]
    Row {
        line: u64,
        #[source]
        source: csv::Error,
    },

    #[error("failed to read input: {0}")]
    Csv(#[from] csv::Error),
}

fn candidate_names(candidates: &[PathBuf]) -> String {
    candidates
        .iter()
        .map(|p| {
            p.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| p.display().to_string())
        })
        .collect::<Vec<_>>()
        .join(", ")
}
