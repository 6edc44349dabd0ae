use std::fs;
use std::path::{Path, PathBuf};

use crate::error::LocateError;

/// Find the single `.csv` file in `dir`.
///
/// The extension match is ASCII case-insensitive. Zero or several candidates
/// are both errors; the run never guesses.
pub fn find_input(dir: &Path) -> Result<PathBuf, LocateError> {
    let io_err = |source| LocateError::Io {
        dir: dir.to_path_buf(),
        source,
    };

    let mut candidates = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let path = entry.path();
        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv && entry.file_type().map_err(io_err)?.is_file() {
            candidates.push(path);
        }
    }
    candidates.sort();

    match candidates.len() {
        0 => Err(LocateError::NoInput {
            dir: dir.to_path_buf(),
        }),
        1 => Ok(candidates.remove(0)),
        _ => Err(LocateError::Ambiguous {
            dir: dir.to_path_buf(),
            candidates,
        }),
    }
}
