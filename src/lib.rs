//! World trade statistics from the IMF PortWatch dataset.
//!
//! Two halves:
//!
//! - [`Converter`] turns a downloaded PortWatch CSV export into a table in a
//!   single-file SQLite database.
//! - [`TradeApi`] opens that database read-only and answers the questions
//!   the dashboard asks (yearly totals, import/export split, per-country
//!   trade, monthly history), with [`figures`] and [`dashboard`] turning the
//!   answers into Plotly figures and an HTML page.
//!
//! # Quick start
//!
//! ```no_run
//! use portwatch::{Converter, TableSchema, TradeApi};
//!
//! Converter::new(TableSchema::portwatch())
//!     .convert("data/port_activity.csv", "db/port_activity.db")
//!     .unwrap();
//!
//! let api = TradeApi::builder().db_path("db/port_activity.db").build().unwrap();
//! let years = api.trade().years().unwrap();
//! let world = api.trade().world_trade(*years.last().unwrap()).unwrap();
//! ```

#[cfg(feature = "async")]
pub mod async_client;
pub mod config;
pub mod connection;
pub mod convert;
pub mod dashboard;
pub mod error;
pub mod figures;
pub mod models;
pub mod queries;
pub mod schema;
pub mod sql_builder;

#[cfg(feature = "async")]
pub use async_client::AsyncTradeApi;
pub use connection::Connection;
pub use convert::{ConversionReport, Converter};
pub use error::{PortwatchError, Result};
pub use schema::{ColumnSpec, ColumnType, TableSchema};
pub use sql_builder::SqlBuilder;

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// TradeApiBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`TradeApi`] instance.
///
/// Use [`TradeApi::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](TradeApiBuilder::build) to open the
/// database.
pub struct TradeApiBuilder {
    db_path: Option<PathBuf>,
    table: String,
}

impl Default for TradeApiBuilder {
    fn default() -> Self {
        Self {
            db_path: None,
            table: config::DEFAULT_TABLE.to_string(),
        }
    }
}

impl TradeApiBuilder {
    /// Set the database file produced by the converter.
    ///
    /// Defaults to [`config::default_db_path()`].
    pub fn db_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.db_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the table holding the trade records. Defaults to `Ports`.
    pub fn table(mut self, table: &str) -> Self {
        self.table = table.to_string();
        self
    }

    /// Open the database read-only and check that the table exists.
    pub fn build(self) -> Result<TradeApi> {
        let path = self.db_path.unwrap_or_else(config::default_db_path);
        let conn = Connection::open_read_only(&path)?;
        TradeApi::from_connection(conn, &self.table)
    }
}

// ---------------------------------------------------------------------------
// TradeApi
// ---------------------------------------------------------------------------

/// Read-only access to a converted PortWatch database.
///
/// Query interfaces are lightweight wrappers borrowing the connection.
#[derive(Debug)]
pub struct TradeApi {
    conn: Connection,
    table: String,
}

impl TradeApi {
    /// Create a new builder for configuring the API.
    pub fn builder() -> TradeApiBuilder {
        TradeApiBuilder::default()
    }

    /// Wrap an existing connection. Fails if `table` does not exist.
    pub fn from_connection(conn: Connection, table: &str) -> Result<Self> {
        conn.ensure_tables(&[table])?;
        Ok(Self {
            conn,
            table: table.to_string(),
        })
    }

    // -- Query accessors ---------------------------------------------------

    /// Yearly and per-country aggregates.
    pub fn trade(&self) -> queries::TradeQuery<'_> {
        queries::TradeQuery::new(&self.conn, &self.table)
    }

    /// Filtered series, port listings and raw records.
    pub fn series(&self) -> queries::SeriesQuery<'_> {
        queries::SeriesQuery::new(&self.conn, &self.table)
    }

    /// Dashboard views with default plot dimensions.
    pub fn dashboard(&self) -> dashboard::Dashboard<'_> {
        dashboard::Dashboard::new(self)
    }

    // -- Metadata and utility methods --------------------------------------

    /// Name of the table being queried.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Number of trade records in the table.
    pub fn row_count(&self) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", schema::quote_ident(&self.table));
        Ok(self
            .conn
            .execute_scalar(&sql, &[])?
            .and_then(|v| v.as_i64())
            .unwrap_or(0))
    }

    /// Execute a raw SQL query against the database.
    ///
    /// The connection is read-only, so statements that write fail.
    pub fn sql(
        &self,
        query: &str,
        params: &[rusqlite::types::Value],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        self.conn.execute(query, params)
    }

    /// Consume the API and close the database.
    pub fn close(self) {
        drop(self);
    }

    /// Return a reference to the underlying [`Connection`].
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for TradeApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let db = self
            .conn
            .path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| ":memory:".to_string());
        write!(f, "TradeApi(db={}, table={})", db, self.table)
    }
}
