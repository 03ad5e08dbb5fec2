use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PortwatchError {
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("schema mismatch in {}: {detail}", .path.display())]
    SchemaMismatch {
        path: PathBuf,
        /// Expected columns absent from the header.
        missing: Vec<String>,
        detail: String,
    },

    #[error(
        "parse error in {} at line {line}, column '{column}': cannot read {value:?} as {expected}",
        .path.display()
    )]
    Parse {
        path: PathBuf,
        line: u64,
        column: String,
        value: String,
        expected: String,
    },

    #[error("cannot write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, PortwatchError>;
