//! Read-only query modules for the dashboard.
//!
//! Each module provides a query struct that borrows a
//! [`Connection`](crate::connection::Connection) and the name of the
//! converted table, and exposes methods returning typed `Result<T>` values.

pub mod series;
pub mod trade;

pub use series::{Granularity, SeriesFilter, SeriesQuery};
pub use trade::TradeQuery;
