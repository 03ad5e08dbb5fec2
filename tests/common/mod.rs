//! Shared test fixtures for the portwatch integration tests.
//!
//! `setup_sample_db()` converts a small PortWatch-shaped CSV into a SQLite
//! file in a temporary directory and opens it with `TradeApi`.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use portwatch::{Converter, TableSchema, TradeApi};

/// One fixture row: (date, portid, portname, country, ISO3, portcalls, import, export).
type Row = (
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    i64,
    f64,
    f64,
);

/// Six port-days over two years and three countries.
///
/// 2023: USA trades 7.0 Mt, CHN 10.0 Mt; 42 port calls.
/// 2024: USA 2.0 Mt, BRA 2.0 Mt, CHN 6.0 Mt; 20 port calls.
pub const SAMPLE_ROWS: &[Row] = &[
    ("2023-01-15", "port1", "Los Angeles", "United States", "USA", 10, 2_000_000.0, 1_000_000.0),
    ("2023/02/10 00:00:00+00", "port1", "Los Angeles", "United States", "USA", 12, 3_000_000.0, 1_000_000.0),
    ("2023-01-20", "port2", "Shanghai", "China", "CHN", 20, 4_000_000.0, 6_000_000.0),
    ("2024-03-05", "port1", "Los Angeles", "United States", "USA", 5, 1_000_000.0, 1_000_000.0),
    ("2024/03/06 00:00:00+00", "port3", "Santos", "Brazil", "BRA", 7, 500_000.0, 1_500_000.0),
    ("2024-04-01", "port2", "Shanghai", "China", "CHN", 8, 2_000_000.0, 4_000_000.0),
];

/// Render `rows` as a CSV in the column order of `TableSchema::portwatch()`.
/// Per-category breakdown columns are left empty.
pub fn sample_csv(rows: &[Row]) -> String {
    let schema = TableSchema::portwatch();
    let header: Vec<&str> = schema.columns.iter().map(|c| c.name.as_str()).collect();
    let mut out = header.join(",");
    out.push('\n');

    for (i, (date, portid, portname, country, iso3, calls, imp, exp)) in rows.iter().enumerate() {
        let ymd: Vec<u32> = date[..10]
            .split(|c: char| c == '-' || c == '/')
            .map(|p| p.parse().unwrap())
            .collect();
        let mut fields: HashMap<&str, String> = HashMap::new();
        fields.insert("date", date.to_string());
        fields.insert("year", ymd[0].to_string());
        fields.insert("month", ymd[1].to_string());
        fields.insert("day", ymd[2].to_string());
        fields.insert("portid", portid.to_string());
        fields.insert("portname", portname.to_string());
        fields.insert("country", country.to_string());
        fields.insert("ISO3", iso3.to_string());
        fields.insert("portcalls", calls.to_string());
        fields.insert("import", imp.to_string());
        fields.insert("export", exp.to_string());
        fields.insert("ObjectId", (i + 1).to_string());

        let line: Vec<String> = header
            .iter()
            .map(|h| fields.get(h).cloned().unwrap_or_default())
            .collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }
    out
}

pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

/// Convert the sample rows into `<tmp>/port_activity.db` and open it.
///
/// Returns `(TradeApi, tempfile::TempDir)`. The caller must keep the
/// `TempDir` alive for the duration of the test.
pub fn setup_sample_db() -> (TradeApi, tempfile::TempDir) {
    let tmp_dir = tempfile::tempdir().unwrap();
    let csv = write_file(tmp_dir.path(), "port_activity.csv", &sample_csv(SAMPLE_ROWS));
    let db = tmp_dir.path().join("port_activity.db");

    Converter::new(TableSchema::portwatch())
        .convert(&csv, &db)
        .unwrap();

    let api = TradeApi::builder().db_path(&db).build().unwrap();
    (api, tmp_dir)
}

/// Open a database file read-write for direct inspection.
pub fn open_rw(path: &Path) -> rusqlite::Connection {
    rusqlite::Connection::open(path).unwrap()
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

pub fn count_rows(conn: &rusqlite::Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM \"{}\"", table), [], |r| r.get(0))
        .unwrap()
}
