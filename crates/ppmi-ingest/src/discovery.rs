//! Export directory discovery helpers.

use std::path::Path;

use ppmi_model::Result;

/// List the delimited source files present in an export directory, sorted
/// by name. Used for diagnostics when an expected instrument is missing.
pub fn list_source_files(dir: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if name.to_lowercase().ends_with(".csv") {
            files.push(name);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_only_csv_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.csv"), "PATNO\n1\n").unwrap();
        std::fs::write(dir.path().join("a.csv"), "PATNO\n1\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let files = list_source_files(dir.path()).unwrap();
        assert_eq!(files, ["a.csv", "b.csv"]);
    }
}
