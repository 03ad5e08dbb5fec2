//! Headline trade statistics: the figures behind the world map tab and the
//! country tab of the dashboard.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde_json::Value;
use tracing::warn;

use crate::config::TRADE_SCALE;
use crate::error::{PortwatchError, Result};
use crate::models::{CountryTrade, MonthlyTrade, TradeSplit};
use crate::schema::quote_ident;
use crate::sql_builder::SqlBuilder;

// ---------------------------------------------------------------------------
// TradeQuery
// ---------------------------------------------------------------------------

/// Aggregate queries over the converted port activity table.
pub struct TradeQuery<'a> {
    conn: &'a crate::connection::Connection,
    table: &'a str,
}

impl<'a> TradeQuery<'a> {
    /// Create a new `TradeQuery` bound to the given connection and table.
    pub fn new(conn: &'a crate::connection::Connection, table: &'a str) -> Self {
        Self { conn, table }
    }

    /// All distinct years present, ascending.
    pub fn years(&self) -> Result<Vec<i32>> {
        self.conn.ensure_tables(&[self.table])?;

        let (sql, params) = SqlBuilder::new(&quote_ident(self.table))
            .select(&["year"])
            .distinct()
            .where_not_null("year")
            .order_by(&["year ASC"])
            .build();

        let rows = self.conn.execute(&sql, &params)?;
        Ok(rows
            .iter()
            .filter_map(|r| r.get("year").and_then(|v| v.as_i64()))
            .map(|y| y as i32)
            .collect())
    }

    /// All distinct country names, ascending.
    pub fn countries(&self) -> Result<Vec<String>> {
        self.conn.ensure_tables(&[self.table])?;

        let (sql, params) = SqlBuilder::new(&quote_ident(self.table))
            .select(&["country"])
            .distinct()
            .where_not_null("country")
            .order_by(&["country ASC"])
            .build();

        let rows = self.conn.execute(&sql, &params)?;
        Ok(rows
            .iter()
            .filter_map(|r| r.get("country").and_then(|v| v.as_str()))
            .map(|s| s.to_string())
            .collect())
    }

    /// Total ship arrivals (port calls) in a year; `0` when the year has no
    /// data.
    pub fn total_port_calls(&self, year: i32) -> Result<i64> {
        self.conn.ensure_tables(&[self.table])?;

        let (sql, params) = SqlBuilder::new(&quote_ident(self.table))
            .select(&["COALESCE(SUM(portcalls), 0) AS total"])
            .where_eq("year", year)
            .build();

        let total = self.conn.execute_scalar(&sql, &params)?;
        Ok(total.and_then(|v| v.as_i64()).unwrap_or(0))
    }

    /// Share of imports and exports in the year's total trade.
    pub fn trade_split(&self, year: i32) -> Result<TradeSplit> {
        self.conn.ensure_tables(&[self.table])?;

        let (sql, params) = SqlBuilder::new(&quote_ident(self.table))
            .select(&["SUM(import) AS imports", "SUM(export) AS exports"])
            .where_eq("year", year)
            .build();

        let rows = self.conn.execute(&sql, &params)?;
        let (imports, exports) = rows
            .first()
            .map(|r| (num(r, "imports"), num(r, "exports")))
            .unwrap_or((0.0, 0.0));

        let total = imports + exports;
        if total <= 0.0 {
            return Err(PortwatchError::NotFound(format!(
                "no trade recorded for {}",
                year
            )));
        }

        Ok(TradeSplit {
            import_pct: round1(imports / total * 100.0),
            export_pct: round1(exports / total * 100.0),
        })
    }

    /// Per-country trade for a year, keyed by ISO3 code, in millions of
    /// metric tons.
    ///
    /// Rows without an ISO3 code cannot be placed on the map and are left
    /// out, so [`top_share`](Self::top_share) over this result divides by
    /// mapped trade only, while [`trade_split`](Self::trade_split) counts
    /// every row of the year.
    pub fn world_trade(&self, year: i32) -> Result<Vec<CountryTrade>> {
        self.conn.ensure_tables(&[self.table])?;

        let (sql, params) = SqlBuilder::new(&quote_ident(self.table))
            .select(&["ISO3", "SUM(import) AS imports", "SUM(export) AS exports"])
            .where_eq("year", year)
            .where_not_null("ISO3")
            .group_by(&["ISO3"])
            .order_by(&["ISO3 ASC"])
            .build();

        let rows = self.conn.execute(&sql, &params)?;
        Ok(rows
            .iter()
            .filter_map(|r| {
                let iso3 = r.get("ISO3").and_then(|v| v.as_str())?.to_string();
                let imports = num(r, "imports") / TRADE_SCALE;
                let exports = num(r, "exports") / TRADE_SCALE;
                Some(CountryTrade {
                    iso3,
                    imports,
                    exports,
                    trade: imports + exports,
                })
            })
            .collect())
    }

    /// Monthly imports and exports of one country, oldest first, in millions
    /// of metric tons. Unknown countries yield an empty series.
    pub fn country_monthly(&self, country: &str) -> Result<Vec<MonthlyTrade>> {
        self.conn.ensure_tables(&[self.table])?;

        let (sql, params) = SqlBuilder::new(&quote_ident(self.table))
            .select(&[
                "year",
                "month",
                "SUM(import) AS imports",
                "SUM(export) AS exports",
            ])
            .where_eq("country", country.to_string())
            .group_by(&["year", "month"])
            .order_by(&["year ASC", "month ASC"])
            .build();

        let rows = self.conn.execute(&sql, &params)?;
        let mut out = Vec::with_capacity(rows.len());
        for r in &rows {
            let year = r.get("year").and_then(|v| v.as_i64()).unwrap_or(0) as i32;
            let month = r.get("month").and_then(|v| v.as_i64()).unwrap_or(0) as u32;
            let Some(date) = NaiveDate::from_ymd_opt(year, month, 1) else {
                warn!(country, year, month, "skipping row with invalid year/month");
                continue;
            };
            out.push(MonthlyTrade {
                date,
                year,
                month,
                imports: num(r, "imports") / TRADE_SCALE,
                exports: num(r, "exports") / TRADE_SCALE,
            });
        }
        Ok(out)
    }

    /// Percentage of total trade held by the largest country in `rows`.
    ///
    /// Returns `0.0` for an empty slice or when no trade was recorded.
    pub fn top_share(rows: &[CountryTrade]) -> f64 {
        let sum: f64 = rows.iter().map(|r| r.trade).sum();
        if sum <= 0.0 {
            return 0.0;
        }
        let max = rows.iter().map(|r| r.trade).fold(0.0_f64, f64::max);
        round1(max / sum * 100.0)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Numeric column of a result row; `NULL` and missing read as zero.
pub(crate) fn num(row: &HashMap<String, Value>, key: &str) -> f64 {
    row.get(key).and_then(|v| v.as_f64()).unwrap_or(0.0)
}

pub(crate) fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}
