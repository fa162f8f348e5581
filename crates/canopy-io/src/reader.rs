//! CSV dataset reader with dynamic cell typing.

use std::path::{Path, PathBuf};

use canopy_tree::{Dataset, TreeError, Value};
use tracing::{debug, info, instrument};

use crate::IoError;

/// Reads a headed CSV file into a [`Dataset`].
///
/// Expected CSV format:
/// - Header row required; header names are trimmed
/// - All data rows must have as many fields as the header
/// - Blank lines are skipped
///
/// With dynamic typing (the default) each cell goes through
/// [`Value::parse`]: `true`/`false` become booleans, finite floats become
/// numbers, everything else stays text. Without it every cell is text.
///
/// A header with zero data rows is a valid, empty dataset.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::EmptyHeader`] | No header row, or a header without columns |
/// | [`IoError::InconsistentRowLength`] | Row has different column count than header |
pub struct CsvReader {
    path: PathBuf,
    dynamic_typing: bool,
}

impl CsvReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            dynamic_typing: true,
        }
    }

    /// Enable or disable type inference for cells.
    #[must_use]
    pub fn with_dynamic_typing(mut self, dynamic_typing: bool) -> Self {
        self.dynamic_typing = dynamic_typing;
        self
    }

    fn parse_error(&self, e: csv::Error) -> IoError {
        IoError::CsvParse {
            path: self.path.clone(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        }
    }

    /// Read the CSV file, returning a [`Dataset`].
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<Dataset, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible(true) so ragged rows surface as InconsistentRowLength
        // instead of a low-level CsvParse error.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(file);

        let header: Vec<String> = rdr
            .headers()
            .map_err(|e| self.parse_error(e))?
            .iter()
            .map(str::to_string)
            .collect();
        if header.is_empty() || header.iter().all(String::is_empty) {
            return Err(IoError::EmptyHeader {
                path: self.path.clone(),
            });
        }
        let expected = header.len();
        debug!(expected, "read CSV header");

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| self.parse_error(e))?;
            let row: Vec<Value> = if self.dynamic_typing {
                record.iter().map(Value::parse).collect()
            } else {
                record.iter().map(Value::from).collect()
            };
            rows.push(row);
        }

        let n_rows = rows.len();
        let dataset = Dataset::new(header, rows).map_err(|e| match e {
            TreeError::RowLengthMismatch {
                row_index,
                expected,
                got,
            } => IoError::InconsistentRowLength {
                path: self.path.clone(),
                row_index,
                expected,
                got,
            },
            other => IoError::InvalidDataset {
                path: self.path.clone(),
                source: other,
            },
        })?;

        info!(n_rows, n_columns = expected, "dataset loaded");
        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn read_typed_cells() {
        let csv = "Outlook,Temperature,Windy\nsunny,85,FALSE\novercast,71.5,TRUE\n";
        let f = write_csv(csv);
        let ds = CsvReader::new(f.path()).read().unwrap();
        assert_eq!(ds.header(), ["Outlook", "Temperature", "Windy"]);
        assert_eq!(ds.n_rows(), 2);
        assert_eq!(
            ds.row(0).unwrap(),
            &[Value::from("sunny"), Value::from(85.0), Value::from(false)]
        );
        assert_eq!(ds.row(1).unwrap()[1], Value::from(71.5));
    }

    #[test]
    fn read_untyped_cells() {
        let csv = "a,b\n1,true\n";
        let f = write_csv(csv);
        let ds = CsvReader::new(f.path())
            .with_dynamic_typing(false)
            .read()
            .unwrap();
        assert_eq!(ds.row(0).unwrap(), &[Value::from("1"), Value::from("true")]);
    }

    #[test]
    fn header_names_are_trimmed() {
        let csv = " a , b\n1,2\n";
        let f = write_csv(csv);
        let ds = CsvReader::new(f.path()).read().unwrap();
        assert_eq!(ds.header(), ["a", "b"]);
    }

    #[test]
    fn blank_lines_skipped() {
        let csv = "a,b\n1,2\n\n3,4\n\n";
        let f = write_csv(csv);
        let ds = CsvReader::new(f.path()).read().unwrap();
        assert_eq!(ds.n_rows(), 2);
    }

    #[test]
    fn header_only_is_empty_dataset() {
        let f = write_csv("a,b\n");
        let ds = CsvReader::new(f.path()).read().unwrap();
        assert!(ds.is_empty());
        assert_eq!(ds.n_columns(), 2);
    }

    #[test]
    fn error_file_not_found() {
        let result = CsvReader::new(Path::new("/nonexistent/file.csv")).read();
        assert!(matches!(result, Err(IoError::FileNotFound { .. })));
    }

    #[test]
    fn error_empty_file() {
        let f = write_csv("");
        let result = CsvReader::new(f.path()).read();
        assert!(matches!(result, Err(IoError::EmptyHeader { .. })));
    }

    #[test]
    fn error_inconsistent_row_length() {
        let csv = "a,b,c\n1,2,3\n1,2\n";
        let f = write_csv(csv);
        let result = CsvReader::new(f.path()).read();
        assert!(matches!(
            result,
            Err(IoError::InconsistentRowLength { row_index: 1, expected: 3, got: 2, .. })
        ));
    }
}
