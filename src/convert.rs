//! CSV → SQLite conversion.
//!
//! The whole load runs inside one transaction: the old table is dropped, the
//! new one created and filled, and indexes built before a single commit. Any
//! error rolls the transaction back, so readers see either the previous table
//! or the complete new one.

use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use flate2::read::GzDecoder;
use rusqlite::types::Value;
use rusqlite::{Connection as SqliteConnection, ErrorCode};
use tracing::{debug, info, warn};

use crate::config;
use crate::error::{PortwatchError, Result};
use crate::schema::{HeaderLayout, TableSchema};

/// Outcome of a successful conversion.
#[derive(Debug, Clone)]
pub struct ConversionReport {
    pub table: String,
    /// Data rows inserted (header excluded).
    pub rows: u64,
    pub columns: usize,
    pub elapsed: Duration,
}

/// Loads a PortWatch CSV export into a single SQLite table.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    schema: TableSchema,
}

impl Converter {
    pub fn new(schema: TableSchema) -> Self {
        Self { schema }
    }

    /// Override the target table name.
    pub fn table(mut self, name: &str) -> Self {
        self.schema.table = name.to_string();
        self
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Convert the CSV at `input` into the database file at `output`.
    ///
    /// The header is validated before the database is touched. If `output`
    /// did not exist and the conversion fails, the file is removed again.
    pub fn convert<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input: P,
        output: Q,
    ) -> Result<ConversionReport> {
        let input = input.as_ref();
        let output = output.as_ref();
        self.schema.validate()?;

        if !input.is_file() {
            return Err(PortwatchError::FileNotFound(input.to_path_buf()));
        }

        let started = Instant::now();
        let mut reader = csv_reader(open_input(input)?);
        let layout = read_layout(&mut reader, &self.schema, input)?;

        prepare_output(output)?;
        let existed = output.exists();
        info!(
            input = %input.display(),
            output = %output.display(),
            table = %layout.table,
            "converting CSV"
        );

        let result = SqliteConnection::open(output)
            .map_err(PortwatchError::from)
            .and_then(|mut conn| load(&mut reader, &layout, input, &mut conn))
            .map_err(|e| output_failure(output, e));

        match result {
            Ok(rows) => {
                let report = ConversionReport {
                    table: layout.table.clone(),
                    rows,
                    columns: layout.columns.len(),
                    elapsed: started.elapsed(),
                };
                info!(
                    table = %report.table,
                    rows = report.rows,
                    columns = report.columns,
                    elapsed_ms = report.elapsed.as_millis() as u64,
                    "conversion complete"
                );
                Ok(report)
            }
            Err(e) => {
                if !existed && output.exists() {
                    if let Err(rm) = fs::remove_file(output) {
                        warn!(output = %output.display(), error = %rm, "could not remove partial database");
                    }
                }
                Err(e)
            }
        }
    }

    /// Run the conversion over any reader into an already open connection.
    ///
    /// `source` is only used to label errors.
    pub fn convert_reader<R: Read>(
        &self,
        input: R,
        source: &Path,
        conn: &mut SqliteConnection,
    ) -> Result<ConversionReport> {
        self.schema.validate()?;
        let started = Instant::now();
        let mut reader = csv_reader(input);
        let layout = read_layout(&mut reader, &self.schema, source)?;
        let rows = load(&mut reader, &layout, source, conn)?;
        Ok(ConversionReport {
            table: layout.table,
            rows,
            columns: layout.columns.len(),
            elapsed: started.elapsed(),
        })
    }
}

// ---------------------------------------------------------------------------
// Pipeline steps
// ---------------------------------------------------------------------------

fn open_input(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => PortwatchError::FileNotFound(path.to_path_buf()),
        _ => PortwatchError::Io(e),
    })?;
    let gzipped = path.extension().map(|e| e == "gz").unwrap_or(false);
    if gzipped {
        debug!(input = %path.display(), "reading gzip-compressed input");
        Ok(Box::new(GzDecoder::new(BufReader::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

fn csv_reader<R: Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        // Field counts are checked per record so the error can name the line.
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(input)
}

fn read_layout<R: Read>(
    reader: &mut csv::Reader<R>,
    schema: &TableSchema,
    source: &Path,
) -> Result<HeaderLayout> {
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let h = if i == 0 { h.trim_start_matches('\u{feff}') } else { h };
            h.trim().to_string()
        })
        .collect();
    // A zero-byte file yields a single empty header.
    let headers = if headers.len() == 1 && headers[0].is_empty() {
        Vec::new()
    } else {
        headers
    };
    schema.resolve(&headers, source)
}

fn prepare_output(output: &Path) -> Result<()> {
    if output.is_dir() {
        return Err(PortwatchError::Write {
            path: output.to_path_buf(),
            source: std::io::Error::other("output path is a directory"),
        });
    }
    if let Some(parent) = output.parent() {
        if parent.is_file() {
            return Err(PortwatchError::Write {
                path: output.to_path_buf(),
                source: std::io::Error::other(format!(
                    "parent {} is not a directory",
                    parent.display()
                )),
            });
        }
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|source| PortwatchError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    Ok(())
}

/// Reclassify SQLite failures that mean the output file itself cannot be
/// opened or written.
fn output_failure(output: &Path, err: PortwatchError) -> PortwatchError {
    match err {
        PortwatchError::Sqlite(rusqlite::Error::SqliteFailure(code, msg))
            if matches!(
                code.code,
                ErrorCode::CannotOpen
                    | ErrorCode::ReadOnly
                    | ErrorCode::DiskFull
                    | ErrorCode::SystemIoFailure
                    | ErrorCode::PermissionDenied
            ) =>
        {
            PortwatchError::Write {
                path: output.to_path_buf(),
                source: std::io::Error::other(rusqlite::Error::SqliteFailure(code, msg)),
            }
        }
        other => other,
    }
}

/// Recreate the table and insert every record in one transaction.
fn load<R: Read>(
    reader: &mut csv::Reader<R>,
    layout: &HeaderLayout,
    source: &Path,
    conn: &mut SqliteConnection,
) -> Result<u64> {
    let tx = conn.transaction()?;
    tx.execute_batch(&layout.drop_table_sql())?;
    tx.execute_batch(&layout.create_table_sql())?;

    let mut rows: u64 = 0;
    {
        let mut stmt = tx.prepare(&layout.insert_sql())?;
        let mut record = csv::StringRecord::new();
        let mut values: Vec<Value> = Vec::with_capacity(layout.columns.len());

        while reader.read_record(&mut record)? {
            let line = record
                .position()
                .map(|p| p.line())
                .unwrap_or(rows + 2);
            coerce_record(&record, layout, source, line, &mut values)?;
            stmt.execute(rusqlite::params_from_iter(values.iter()))?;
            rows += 1;
            if rows % config::PROGRESS_INTERVAL == 0 {
                debug!(rows, "rows loaded");
            }
        }
    }

    for sql in layout.index_sql() {
        tx.execute_batch(&sql)?;
    }
    tx.commit()?;
    Ok(rows)
}

fn coerce_record(
    record: &csv::StringRecord,
    layout: &HeaderLayout,
    source: &Path,
    line: u64,
    values: &mut Vec<Value>,
) -> Result<()> {
    if record.len() != layout.columns.len() {
        return Err(PortwatchError::Parse {
            path: source.to_path_buf(),
            line,
            column: "*".to_string(),
            value: format!("{} fields", record.len()),
            expected: format!("{} fields", layout.columns.len()),
        });
    }

    values.clear();
    for (raw, col) in record.iter().zip(&layout.columns) {
        if raw.trim().is_empty() {
            if col.nullable {
                values.push(Value::Null);
                continue;
            }
            return Err(parse_error(source, line, &col.name, raw, format!("non-empty {}", col.column_type)));
        }
        match col.column_type.coerce(raw) {
            Some(v) => values.push(v),
            None => {
                return Err(parse_error(source, line, &col.name, raw, col.column_type.to_string()))
            }
        }
    }
    Ok(())
}

fn parse_error(source: &Path, line: u64, column: &str, value: &str, expected: String) -> PortwatchError {
    PortwatchError::Parse {
        path: PathBuf::from(source),
        line,
        column: column.to_string(),
        value: value.to_string(),
        expected,
    }
}
