//! Async wrapper around [`TradeApi`] for use in async runtimes (Tokio, etc.).
//!
//! Runs every query on the blocking thread pool via
//! [`tokio::task::spawn_blocking`], keeping the event loop free.
//!
//! # Example
//!
//! ```no_run
//! use portwatch::AsyncTradeApi;
//!
//! #[tokio::main]
//! async fn main() {
//!     let api = AsyncTradeApi::builder()
//!         .db_path("db/port_activity.db")
//!         .build()
//!         .await
//!         .unwrap();
//!
//!     let world = api.run(|a| a.trade().world_trade(2024)).await.unwrap();
//! }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::config;
use crate::error::{PortwatchError, Result};
use crate::TradeApi;

// ---------------------------------------------------------------------------
// AsyncTradeApiBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing an [`AsyncTradeApi`] instance.
pub struct AsyncTradeApiBuilder {
    db_path: Option<PathBuf>,
    table: String,
}

impl Default for AsyncTradeApiBuilder {
    fn default() -> Self {
        Self {
            db_path: None,
            table: config::DEFAULT_TABLE.to_string(),
        }
    }
}

impl AsyncTradeApiBuilder {
    pub fn db_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.db_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn table(mut self, table: &str) -> Self {
        self.table = table.to_string();
        self
    }

    /// Open the database on the blocking thread pool.
    pub async fn build(self) -> Result<AsyncTradeApi> {
        tokio::task::spawn_blocking(move || {
            let mut builder = TradeApi::builder().table(&self.table);
            if let Some(path) = self.db_path {
                builder = builder.db_path(path);
            }
            let api = builder.build()?;
            Ok(AsyncTradeApi {
                inner: Arc::new(Mutex::new(api)),
            })
        })
        .await
        .map_err(|e| PortwatchError::InvalidArgument(format!("Task join error: {e}")))?
    }
}

// ---------------------------------------------------------------------------
// AsyncTradeApi
// ---------------------------------------------------------------------------

/// Async wrapper around [`TradeApi`].
///
/// The SQLite connection is not `Sync`, so the API sits behind a [`Mutex`]
/// and queries run one at a time.
pub struct AsyncTradeApi {
    inner: Arc<Mutex<TradeApi>>,
}

impl AsyncTradeApi {
    pub fn builder() -> AsyncTradeApiBuilder {
        AsyncTradeApiBuilder::default()
    }

    /// Run a sync [`TradeApi`] operation on the blocking thread pool.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&TradeApi) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let api = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = api
                .lock()
                .map_err(|_| PortwatchError::InvalidArgument("API lock poisoned".into()))?;
            f(&guard)
        })
        .await
        .map_err(|e| PortwatchError::InvalidArgument(format!("Task join error: {e}")))?
    }

    /// Execute a raw SQL query asynchronously.
    pub async fn sql(
        &self,
        query: &str,
        params: &[rusqlite::types::Value],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        let query = query.to_string();
        let params = params.to_vec();
        self.run(move |a| a.sql(&query, &params)).await
    }

    pub async fn years(&self) -> Result<Vec<i32>> {
        self.run(|a| a.trade().years()).await
    }

    pub async fn countries(&self) -> Result<Vec<String>> {
        self.run(|a| a.trade().countries()).await
    }
}
