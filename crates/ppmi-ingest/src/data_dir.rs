//! Study data directory resolution.
//!
//! Source files are addressed by logical file name inside one flat export
//! directory. The directory is found, in order: an explicit path, the
//! `$PPMI_PATH` environment variable, the current working directory.

use std::path::{Path, PathBuf};

use ppmi_model::{DeriveError, Result};

/// Environment variable naming the export directory.
pub const DATA_DIR_ENV: &str = "PPMI_PATH";

/// Resolve the export directory and verify that every file in `required`
/// exists there.
///
/// Fails with [`DeriveError::SourceNotFound`] naming the first missing
/// file. Callers deriving many measures check prerequisites per measure
/// instead, so one missing instrument never blocks the rest.
pub fn resolve_data_dir(path: Option<&Path>, required: &[&str]) -> Result<PathBuf> {
    let dir = match path {
        Some(path) => path.to_path_buf(),
        None => match std::env::var_os(DATA_DIR_ENV) {
            Some(value) => PathBuf::from(value),
            None => std::env::current_dir()?,
        },
    };
    for file in required {
        ensure_file(&dir, file)?;
    }
    Ok(dir)
}

/// Verify a single source file exists under `dir`.
pub fn ensure_file(dir: &Path, file: &str) -> Result<()> {
    if dir.join(file).is_file() {
        Ok(())
    } else {
        Err(DeriveError::SourceNotFound {
            file: file.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_required_file_is_source_not_found() {
        let dir = std::env::temp_dir();
        let err = resolve_data_dir(Some(&dir), &["No_Such_Instrument.csv"]).unwrap_err();
        assert!(matches!(err, DeriveError::SourceNotFound { .. }));
    }
}
