//! Expected column layout of the CSV export and its mapping onto SQLite.
//!
//! The layout published by PortWatch is treated as data: the built-in
//! [`TableSchema::portwatch()`] describes the current export, and a JSON file
//! with the same shape can replace it when the upstream layout changes.
//!
//! ```json
//! {
//!   "table": "Ports",
//!   "columns": [
//!     { "name": "portid", "type": "text" },
//!     { "name": "date", "type": "date", "nullable": false },
//!     { "name": "import", "type": "real" }
//!   ],
//!   "indexes": ["portid"]
//! }
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;

use chrono::{NaiveDate, NaiveTime};
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

use crate::config;
use crate::error::{PortwatchError, Result};

// ---------------------------------------------------------------------------
// ColumnType
// ---------------------------------------------------------------------------

/// Storage type of a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Integer,
    Real,
    /// Calendar date, stored as ISO-8601 `YYYY-MM-DD` text.
    Date,
}

impl ColumnType {
    /// SQLite type name used in `CREATE TABLE`.
    pub fn sql_type(self) -> &'static str {
        match self {
            ColumnType::Text | ColumnType::Date => "TEXT",
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
        }
    }

    /// Coerce a non-empty raw CSV field into a SQLite value.
    ///
    /// Returns `None` when the field cannot be read as this type.
    pub fn coerce(self, raw: &str) -> Option<Value> {
        match self {
            ColumnType::Text => Some(Value::Text(raw.to_string())),
            ColumnType::Integer => parse_integer(raw.trim()).map(Value::Integer),
            ColumnType::Real => parse_real(raw.trim()).map(Value::Real),
            ColumnType::Date => {
                parse_date(raw.trim()).map(|d| Value::Text(d.format("%Y-%m-%d").to_string()))
            }
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Text => "text",
            ColumnType::Integer => "integer",
            ColumnType::Real => "real",
            ColumnType::Date => "date",
        };
        f.write_str(name)
    }
}

fn parse_integer(s: &str) -> Option<i64> {
    if let Ok(n) = s.parse::<i64>() {
        return Some(n);
    }
    // Spreadsheet exports write whole numbers as `12.0`.
    let f = s.parse::<f64>().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn parse_real(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Parse a date written as `YYYY-MM-DD` or `YYYY/MM/DD`, optionally followed
/// by a `T`- or space-separated time of day (`HH:MM:SS`, fractional seconds
/// allowed) and a UTC offset (`Z`, `+00`, `+0000` or `+00:00`). The time
/// part is validated, then discarded.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let date_part = s.get(..10)?;
    if s.len() > 10 {
        let rest = s.get(10..)?;
        let time = rest.strip_prefix('T').or_else(|| rest.strip_prefix(' '))?;
        if !is_time_of_day(time) {
            return None;
        }
    }
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(date_part, "%Y/%m/%d"))
        .ok()
}

fn is_time_of_day(s: &str) -> bool {
    let s = s
        .strip_suffix('Z')
        .or_else(|| s.strip_suffix('z'))
        .unwrap_or(s);
    let (time, offset) = match s.find(|c: char| c == '+' || c == '-') {
        Some(i) => (&s[..i], Some(&s[i + 1..])),
        None => (s, None),
    };
    NaiveTime::parse_from_str(time, "%H:%M:%S%.f").is_ok() && offset.map_or(true, is_utc_offset)
}

/// `HH`, `HHMM` or `HH:MM`, sign already stripped.
fn is_utc_offset(s: &str) -> bool {
    if !s.is_ascii() {
        return false;
    }
    let (hours, minutes) = match (s.len(), s.find(':')) {
        (2, None) => (s, "00"),
        (4, None) => (&s[..2], &s[2..]),
        (5, Some(2)) => (&s[..2], &s[3..]),
        _ => return false,
    };
    let in_range = |v: &str, max: u32| v.parse::<u32>().map_or(false, |n| n <= max);
    hours.bytes().chain(minutes.bytes()).all(|b| b.is_ascii_digit())
        && in_range(hours, 23)
        && in_range(minutes, 59)
}

// ---------------------------------------------------------------------------
// ColumnSpec
// ---------------------------------------------------------------------------

fn default_nullable() -> bool {
    true
}

/// One expected column of the CSV export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Whether an empty field is stored as `NULL` rather than rejected.
    #[serde(default = "default_nullable")]
    pub nullable: bool,
}

impl ColumnSpec {
    pub fn new(name: &str, column_type: ColumnType) -> Self {
        Self {
            name: name.to_string(),
            column_type,
            nullable: true,
        }
    }

    pub fn required(mut self) -> Self {
        self.nullable = false;
        self
    }
}

// ---------------------------------------------------------------------------
// TableSchema
// ---------------------------------------------------------------------------

/// Target table name, expected columns and secondary indexes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub table: String,
    pub columns: Vec<ColumnSpec>,
    #[serde(default)]
    pub indexes: Vec<String>,
}

impl TableSchema {
    pub fn new(table: &str, columns: Vec<ColumnSpec>) -> Self {
        Self {
            table: table.to_string(),
            columns,
            indexes: Vec::new(),
        }
    }

    /// Layout of the PortWatch "Daily Port Activity Data and Trade
    /// Estimates" export.
    pub fn portwatch() -> Self {
        use ColumnType::*;

        let mut columns = vec![
            ColumnSpec::new("date", Date).required(),
            ColumnSpec::new("year", Integer).required(),
            ColumnSpec::new("month", Integer).required(),
            ColumnSpec::new("day", Integer).required(),
            ColumnSpec::new("portid", Text).required(),
            ColumnSpec::new("portname", Text),
            ColumnSpec::new("country", Text),
            ColumnSpec::new("ISO3", Text),
        ];
        for measure in ["portcalls", "import", "export"] {
            // Port calls are vessel counts, trade estimates are metric tons.
            let ty = if measure == "portcalls" { Integer } else { Real };
            for category in [
                "container",
                "dry_bulk",
                "general_cargo",
                "roro",
                "tanker",
                "cargo",
            ] {
                columns.push(ColumnSpec::new(&format!("{measure}_{category}"), ty));
            }
            columns.push(ColumnSpec::new(measure, ty));
        }
        columns.push(ColumnSpec::new("ObjectId", Integer));

        Self {
            table: config::DEFAULT_TABLE.to_string(),
            columns,
            indexes: ["year", "country", "ISO3", "portid"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    /// Load a schema from a JSON file and validate it.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PortwatchError::FileNotFound(path.to_path_buf()));
        }
        let text = fs::read_to_string(path)?;
        let schema: TableSchema = serde_json::from_str(&text)?;
        schema.validate()?;
        Ok(schema)
    }

    /// Replace the target table name.
    pub fn with_table(mut self, table: &str) -> Self {
        self.table = table.to_string();
        self
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Check internal consistency: a table name, at least one column, no
    /// duplicate column names, and indexes only on declared columns.
    pub fn validate(&self) -> Result<()> {
        if self.table.trim().is_empty() {
            return Err(PortwatchError::InvalidArgument(
                "table name must not be empty".into(),
            ));
        }
        if self.columns.is_empty() {
            return Err(PortwatchError::InvalidArgument(format!(
                "schema for table '{}' declares no columns",
                self.table
            )));
        }
        let mut seen = HashSet::new();
        let mut folded = HashSet::new();
        for col in &self.columns {
            seen.insert(col.name.as_str());
            if !folded.insert(col.name.to_ascii_lowercase()) {
                return Err(PortwatchError::InvalidArgument(format!(
                    "column '{}' declared twice",
                    col.name
                )));
            }
        }
        for idx in &self.indexes {
            if !seen.contains(idx.as_str()) {
                return Err(PortwatchError::InvalidArgument(format!(
                    "index on undeclared column '{}'",
                    idx
                )));
            }
        }
        Ok(())
    }

    /// Match a CSV header against this schema.
    ///
    /// Every declared column must appear in the header. Header columns the
    /// schema does not describe are kept as nullable text so the table still
    /// mirrors the file.
    pub fn resolve(&self, headers: &[String], path: &Path) -> Result<HeaderLayout> {
        let mut positions: HashMap<&str, usize> = HashMap::new();
        // SQLite column names are case-insensitive.
        let mut folded: HashSet<String> = HashSet::new();
        for (i, name) in headers.iter().enumerate() {
            if name.is_empty() {
                return Err(PortwatchError::SchemaMismatch {
                    path: path.to_path_buf(),
                    missing: Vec::new(),
                    detail: format!("header column {} has no name", i + 1),
                });
            }
            if !folded.insert(name.to_ascii_lowercase()) {
                return Err(PortwatchError::SchemaMismatch {
                    path: path.to_path_buf(),
                    missing: Vec::new(),
                    detail: format!("header column '{}' appears more than once", name),
                });
            }
            positions.insert(name.as_str(), i);
        }

        let missing: Vec<String> = self
            .columns
            .iter()
            .filter(|c| !positions.contains_key(c.name.as_str()))
            .map(|c| c.name.clone())
            .collect();
        if !missing.is_empty() {
            let detail = format!("missing expected column(s): {}", missing.join(", "));
            return Err(PortwatchError::SchemaMismatch {
                path: path.to_path_buf(),
                missing,
                detail,
            });
        }

        let columns = headers
            .iter()
            .map(|name| {
                self.column(name)
                    .cloned()
                    .unwrap_or_else(|| ColumnSpec::new(name, ColumnType::Text))
            })
            .collect();

        Ok(HeaderLayout {
            table: self.table.clone(),
            columns,
            indexes: self.indexes.clone(),
        })
    }
}

impl Default for TableSchema {
    fn default() -> Self {
        Self::portwatch()
    }
}

// ---------------------------------------------------------------------------
// HeaderLayout
// ---------------------------------------------------------------------------

/// A schema resolved against a concrete header: one column spec per CSV
/// column, in file order.
#[derive(Debug, Clone)]
pub struct HeaderLayout {
    pub table: String,
    pub columns: Vec<ColumnSpec>,
    pub indexes: Vec<String>,
}

impl HeaderLayout {
    pub fn drop_table_sql(&self) -> String {
        format!("DROP TABLE IF EXISTS {}", quote_ident(&self.table))
    }

    pub fn create_table_sql(&self) -> String {
        let cols: Vec<String> = self
            .columns
            .iter()
            .map(|c| {
                let not_null = if c.nullable { "" } else { " NOT NULL" };
                format!("{} {}{}", quote_ident(&c.name), c.column_type.sql_type(), not_null)
            })
            .collect();
        format!(
            "CREATE TABLE {} (\n    {}\n)",
            quote_ident(&self.table),
            cols.join(",\n    ")
        )
    }

    pub fn insert_sql(&self) -> String {
        let names: Vec<String> = self.columns.iter().map(|c| quote_ident(&c.name)).collect();
        let placeholders: Vec<&str> = self.columns.iter().map(|_| "?").collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(&self.table),
            names.join(", "),
            placeholders.join(", ")
        )
    }

    pub fn index_sql(&self) -> Vec<String> {
        self.indexes
            .iter()
            .map(|col| {
                format!(
                    "CREATE INDEX {} ON {} ({})",
                    quote_ident(&format!("idx_{}_{}", self.table, col)),
                    quote_ident(&self.table),
                    quote_ident(col)
                )
            })
            .collect()
    }
}

/// Quote an SQL identifier, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
