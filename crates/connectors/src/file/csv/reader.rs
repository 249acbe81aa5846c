//! Reads a whole CSV file into a [`Dataset`].

use crate::file::csv::error::FileError;
use csv::{ReaderBuilder, StringRecord};
use model::{
    core::{utils::is_na_token, value::Value},
    records::dataset::Dataset,
};
use std::{fs::File, io::Read, path::Path};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct CsvSettings {
    pub delimiter: u8,
    /// Treat pandas' default NA tokens as null. Empty cells are always null.
    pub na_tokens: bool,
}

impl Default for CsvSettings {
    fn default() -> Self {
        CsvSettings {
            delimiter: b',',
            na_tokens: true,
        }
    }
}

pub struct CsvReader {
    settings: CsvSettings,
}

impl Default for CsvReader {
    fn default() -> Self {
        CsvReader::new(CsvSettings::default())
    }
}

impl CsvReader {
    pub fn new(settings: CsvSettings) -> Self {
        CsvReader { settings }
    }

    /// Reads `path` fully. Column labels are kept verbatim; every cell is a
    /// `Value::String` or `Value::Null`.
    pub fn read_path(&self, path: &Path, name: &str) -> Result<Dataset, FileError> {
        let file = File::open(path).map_err(|e| FileError::from_io(path, e))?;
        let dataset = self.read(file, name)?;
        debug!(
            "Read {} rows and {} columns from {}",
            dataset.row_count(),
            dataset.columns.len(),
            path.display()
        );
        Ok(dataset)
    }

    pub fn read<R: Read>(&self, source: R, name: &str) -> Result<Dataset, FileError> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.settings.delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(source);

        let headers = reader.headers()?.clone();
        if headers.is_empty() {
            return Err(FileError::InvalidFormat(format!("'{name}' has no header row")));
        }

        let columns = headers
            .iter()
            .enumerate()
            .map(|(idx, h)| {
                let h = h.trim_start_matches('\u{feff}');
                // Same placeholder pandas gives a blank header, e.g. an index column.
                if h.trim().is_empty() {
                    format!("Unnamed: {idx}")
                } else {
                    h.to_string()
                }
            })
            .collect();
        let mut dataset = Dataset::new(name, columns);

        for (idx, record) in reader.records().enumerate() {
            let record = record?;
            if record.len() > headers.len() {
                // Line numbers count the header as line 1.
                return Err(FileError::ReadError(format!(
                    "'{name}' line {}: expected {} fields, found {}",
                    record.position().map_or(idx as u64 + 2, |p| p.line()),
                    headers.len(),
                    record.len()
                )));
            }
            dataset.push_row(self.to_values(&record));
        }

        Ok(dataset)
    }

    fn to_values(&self, record: &StringRecord) -> Vec<Value> {
        record
            .iter()
            .map(|cell| {
                if cell.is_empty() || (self.settings.na_tokens && is_na_token(cell)) {
                    Value::Null
                } else {
                    Value::String(cell.to_string())
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn s(v: &str) -> Value {
        Value::String(v.into())
    }

    #[test]
    fn test_reads_headers_and_nulls() {
        let data = "Client Type,Total,Warehouse\nRetail,10.5,North\nWholesale,,NA\n";
        let ds = CsvReader::default().read(data.as_bytes(), "sales").unwrap();

        assert_eq!(ds.columns, vec!["Client Type", "Total", "Warehouse"]);
        assert_eq!(ds.row_count(), 2);
        assert_eq!(ds.rows[0], vec![s("Retail"), s("10.5"), s("North")]);
        assert_eq!(ds.rows[1], vec![s("Wholesale"), Value::Null, Value::Null]);
    }

    #[test]
    fn test_na_tokens_can_be_kept() {
        let reader = CsvReader::new(CsvSettings {
            na_tokens: false,
            ..Default::default()
        });
        let ds = reader.read("code\nNA\n\n".as_bytes(), "codes").unwrap();
        assert_eq!(ds.rows, vec![vec![s("NA")]]);
    }

    #[test]
    fn test_short_rows_are_padded_and_long_rows_fail() {
        let ds = CsvReader::default()
            .read("a,b,c\n1,2\n".as_bytes(), "t")
            .unwrap();
        assert_eq!(ds.rows[0], vec![s("1"), s("2"), Value::Null]);

        let err = CsvReader::default()
            .read("a,b\n1,2,3\n".as_bytes(), "t")
            .unwrap_err();
        assert!(matches!(err, FileError::ReadError(msg) if msg.contains("expected 2 fields")));
    }

    #[test]
    fn test_quoted_cells_and_bom() {
        let data = "\u{feff}name,notes\n\"Kongo, Gumi\",\"said \"\"hi\"\"\"\n";
        let ds = CsvReader::default().read(data.as_bytes(), "t").unwrap();
        assert_eq!(ds.columns[0], "name");
        assert_eq!(ds.rows[0], vec![s("Kongo, Gumi"), s("said \"hi\"")]);
    }

    #[test]
    fn test_blank_headers_get_placeholders() {
        let ds = CsvReader::default()
            .read(",brand\n0,Acme\n".as_bytes(), "t")
            .unwrap();
        assert_eq!(ds.columns, vec!["Unnamed: 0", "brand"]);
    }

    #[test]
    fn test_empty_file_is_invalid() {
        let err = CsvReader::default().read("".as_bytes(), "empty").unwrap_err();
        assert!(matches!(err, FileError::InvalidFormat(_)));
    }

    #[test]
    fn test_read_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "product_id,year_added").unwrap();
        writeln!(file, "1,2018").unwrap();

        let ds = CsvReader::default().read_path(file.path(), "products").unwrap();
        assert_eq!(ds.name, "products");
        assert_eq!(ds.row_count(), 1);

        let missing = CsvReader::default().read_path(Path::new("/no/such/file.csv"), "x");
        assert!(matches!(missing, Err(FileError::NotFound(_))));
    }
}
