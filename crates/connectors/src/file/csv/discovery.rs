use crate::file::csv::error::FileError;
use std::path::{Path, PathBuf};

/// Every `*.csv` file directly inside `dir`, sorted by path.
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>, FileError> {
    let entries = std::fs::read_dir(dir).map_err(|e| FileError::from_io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_lists_sorted_csv_files_only() {
        let dir = tempdir().unwrap();
        for name in ["categories.csv", "businesses.csv", "notes.txt", "Countries.CSV"] {
            fs::write(dir.path().join(name), "a\n1\n").unwrap();
        }
        fs::create_dir(dir.path().join("nested.csv")).unwrap();

        let files = list_csv_files(dir.path()).unwrap();
        let names = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["Countries.CSV", "businesses.csv", "categories.csv"]);
    }

    #[test]
    fn test_empty_and_missing_directories() {
        let dir = tempdir().unwrap();
        assert!(list_csv_files(dir.path()).unwrap().is_empty());
        assert!(matches!(
            list_csv_files(&dir.path().join("missing")),
            Err(FileError::NotFound(_))
        ));
    }
}
