//! Streaming tabular reader over a delimited file.
//!
//! Opening a [`TabularSource`] reads the header row and runs one inference
//! pass over the whole file. [`TabularSource::into_records`] then re-opens the
//! file and yields typed [`RawRecord`]s one at a time, so memory use does not
//! grow with the file.

use crate::error::SourceReadError;
use crate::infer::{parse_cell, ColumnInference};
use csv::StringRecord;
use report_core::{ColumnType, RawRecord};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Options for reading the source file.
#[derive(Debug, Clone)]
pub struct SourceOptions {
    /// Field delimiter
    pub delimiter: u8,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

/// A delimited file with a validated header and inferred column types.
#[derive(Debug)]
pub struct TabularSource {
    path: PathBuf,
    options: SourceOptions,
    columns: Arc<[String]>,
    column_types: Vec<ColumnType>,
    row_count: u64,
}

impl TabularSource {
    /// Open `path`, validate its header row and infer column types.
    pub fn open(path: impl AsRef<Path>, options: SourceOptions) -> Result<Self, SourceReadError> {
        Self::open_cancellable(path, options, &AtomicBool::new(false))
    }

    /// Like [`TabularSource::open`], but checks `cancel` before every row and
    /// closes the file with [`SourceReadError::Cancelled`] once it is set.
    pub fn open_cancellable(
        path: impl AsRef<Path>,
        options: SourceOptions,
        cancel: &AtomicBool,
    ) -> Result<Self, SourceReadError> {
        let path = path.as_ref().to_path_buf();
        let started = Instant::now();
        info!("Opening source file: {}", path.display());

        let mut reader = open_reader(&path, &options)?;
        let columns = read_header(&mut reader, &path)?;

        let mut inference = ColumnInference::new(columns.len());
        let mut row_count = 0u64;
        let mut record = StringRecord::new();
        loop {
            if cancel.load(Ordering::Relaxed) {
                debug!("Inference over {} cancelled after {} rows", path.display(), row_count);
                return Err(SourceReadError::Cancelled { path });
            }
            match reader.read_record(&mut record) {
                Ok(true) => {
                    row_count += 1;
                    inference.observe(record.iter());
                }
                Ok(false) => break,
                Err(source) => {
                    return Err(SourceReadError::Row {
                        path,
                        row: row_count + 1,
                        source,
                    })
                }
            }
        }
        let column_types = inference.finish();

        for (column, ty) in columns.iter().zip(&column_types) {
            debug!("Column '{}' inferred as {}", column, ty);
        }
        info!(
            "Inferred {} columns over {} rows in {:?}",
            columns.len(),
            row_count,
            started.elapsed()
        );

        Ok(Self {
            path,
            options,
            columns,
            column_types,
            row_count,
        })
    }

    /// Column headers in file order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Inferred type of the named column.
    pub fn column_type(&self, column: &str) -> Option<ColumnType> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| self.column_types[i])
    }

    /// Number of data rows seen by the inference pass.
    pub fn row_count(&self) -> u64 {
        self.row_count
    }

    /// Consume the source and stream its rows.
    ///
    /// The stream is finite and cannot be restarted.
    pub fn into_records(self) -> Result<RecordStream, SourceReadError> {
        let mut reader = open_reader(&self.path, &self.options)?;
        let columns = read_header(&mut reader, &self.path)?;
        if columns != self.columns {
            return Err(SourceReadError::MalformedHeader {
                path: self.path,
                reason: "header changed after type inference".to_string(),
            });
        }
        Ok(RecordStream {
            reader,
            path: self.path,
            columns: self.columns,
            column_types: self.column_types,
            row: 0,
            buffer: StringRecord::new(),
            finished: false,
        })
    }
}

/// Lazy sequence of typed rows from a [`TabularSource`].
pub struct RecordStream {
    reader: csv::Reader<BufReader<File>>,
    path: PathBuf,
    columns: Arc<[String]>,
    column_types: Vec<ColumnType>,
    row: u64,
    buffer: StringRecord,
    finished: bool,
}

impl RecordStream {
    fn typed_record(&self) -> Result<RawRecord, SourceReadError> {
        let mut values = Vec::with_capacity(self.columns.len());
        for ((cell, ty), column) in self
            .buffer
            .iter()
            .zip(&self.column_types)
            .zip(self.columns.iter())
        {
            let value = parse_cell(cell, *ty).ok_or_else(|| SourceReadError::TypeDrift {
                row: self.row,
                column: column.clone(),
                value: cell.to_string(),
                expected: *ty,
            })?;
            values.push(value);
        }
        let found = values.len();
        RawRecord::new(Arc::clone(&self.columns), values).ok_or(SourceReadError::ColumnCount {
            row: self.row,
            expected: self.columns.len(),
            found,
        })
    }
}

impl Iterator for RecordStream {
    type Item = Result<RawRecord, SourceReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.reader.read_record(&mut self.buffer) {
            Ok(true) => {
                self.row += 1;
                let record = self.typed_record();
                if record.is_err() {
                    self.finished = true;
                }
                Some(record)
            }
            Ok(false) => {
                self.finished = true;
                None
            }
            Err(source) => {
                self.finished = true;
                Some(Err(SourceReadError::Row {
                    path: self.path.clone(),
                    row: self.row + 1,
                    source,
                }))
            }
        }
    }
}

impl Drop for RecordStream {
    fn drop(&mut self) {
        debug!(
            "Releasing source file {} after {} rows",
            self.path.display(),
            self.row
        );
    }
}

fn open_reader(
    path: &Path,
    options: &SourceOptions,
) -> Result<csv::Reader<BufReader<File>>, SourceReadError> {
    let file = File::open(path).map_err(|source| SourceReadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(options.delimiter)
        .from_reader(BufReader::new(file)))
}

fn read_header(
    reader: &mut csv::Reader<BufReader<File>>,
    path: &Path,
) -> Result<Arc<[String]>, SourceReadError> {
    let headers = reader
        .headers()
        .map_err(|e| SourceReadError::MalformedHeader {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    if headers.is_empty() {
        return Err(SourceReadError::MissingHeader {
            path: path.to_path_buf(),
        });
    }

    let mut seen = HashSet::new();
    for (i, name) in headers.iter().enumerate() {
        if name.is_empty() {
            return Err(SourceReadError::MalformedHeader {
                path: path.to_path_buf(),
                reason: format!("column {} has an empty name", i + 1),
            });
        }
        if !seen.insert(name) {
            return Err(SourceReadError::MalformedHeader {
                path: path.to_path_buf(),
                reason: format!("duplicate column name '{name}'"),
            });
        }
    }

    Ok(headers.iter().map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use report_core::FieldValue;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{contents}").unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_open_infers_column_types() {
        let file = csv_file("Report ID,Age,LAT,Area Name\n1,30,34.05,Central\n2,,34.1,Hollywood\n");
        let source = TabularSource::open(file.path(), SourceOptions::default()).unwrap();

        assert_eq!(source.columns(), ["Report ID", "Age", "LAT", "Area Name"]);
        assert_eq!(source.row_count(), 2);
        assert_eq!(source.column_type("Report ID"), Some(ColumnType::Integer));
        assert_eq!(source.column_type("Age"), Some(ColumnType::Integer));
        assert_eq!(source.column_type("LAT"), Some(ColumnType::Float));
        assert_eq!(source.column_type("Area Name"), Some(ColumnType::String));
        assert_eq!(source.column_type("LON"), None);
    }

    #[test]
    fn test_records_are_typed_and_ordered() {
        let file = csv_file("Report ID,Age,LAT\n1,30,34\n2,,34.5\n");
        let source = TabularSource::open(file.path(), SourceOptions::default()).unwrap();
        let records: Vec<_> = source
            .into_records()
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("Report ID"), Some(&FieldValue::Integer(1)));
        // LAT widened to float, so the integral cell is a float too
        assert_eq!(records[0].get("LAT"), Some(&FieldValue::Float(34.0)));
        assert_eq!(records[1].get("Age"), Some(&FieldValue::Null));
    }

    #[test]
    fn test_custom_delimiter() {
        let file = csv_file("Report ID;Sex Code\n7;F\n");
        let options = SourceOptions { delimiter: b';' };
        let source = TabularSource::open(file.path(), options).unwrap();
        let record = source.into_records().unwrap().next().unwrap().unwrap();
        assert_eq!(record.get("Sex Code"), Some(&FieldValue::String("F".into())));
    }

    #[test]
    fn test_missing_file() {
        let err = TabularSource::open("/nonexistent/arrests.csv", SourceOptions::default())
            .unwrap_err();
        assert!(matches!(err, SourceReadError::Open { .. }));
    }

    #[test]
    fn test_empty_file_has_no_header() {
        let file = csv_file("");
        let err = TabularSource::open(file.path(), SourceOptions::default()).unwrap_err();
        assert!(matches!(err, SourceReadError::MissingHeader { .. }));
    }

    #[test]
    fn test_duplicate_header_is_malformed() {
        let file = csv_file("Age,Age\n1,2\n");
        let err = TabularSource::open(file.path(), SourceOptions::default()).unwrap_err();
        assert!(matches!(err, SourceReadError::MalformedHeader { .. }));
    }

    #[test]
    fn test_empty_header_name_is_malformed() {
        let file = csv_file("Age,,LAT\n1,2,3\n");
        let err = TabularSource::open(file.path(), SourceOptions::default()).unwrap_err();
        assert!(matches!(err, SourceReadError::MalformedHeader { .. }));
    }

    #[test]
    fn test_cancelled_inference_stops_reading() {
        let file = csv_file("Report ID,Age\n1,30\n2,41\n");
        let cancel = AtomicBool::new(true);
        let err = TabularSource::open_cancellable(file.path(), SourceOptions::default(), &cancel)
            .unwrap_err();
        assert!(matches!(err, SourceReadError::Cancelled { .. }));
    }

    #[test]
    fn test_short_row_fails_inference() {
        let file = csv_file("Report ID,Age\n1,30\n2\n");
        let err = TabularSource::open(file.path(), SourceOptions::default()).unwrap_err();
        match err {
            SourceReadError::Row { row, .. } => assert_eq!(row, 2),
            other => panic!("unexpected error: {other}"),
        }
    }
}
