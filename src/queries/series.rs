//! Filtered time series and raw record access for the dashboard's filter
//! controls (date range, country, port).

use chrono::NaiveDate;

use crate::config::TRADE_SCALE;
use crate::error::{PortwatchError, Result};
use crate::models::{PortInfo, SeriesPoint, TradeRecord};
use crate::queries::trade::num;
use crate::schema::quote_ident;
use crate::sql_builder::SqlBuilder;

// ---------------------------------------------------------------------------
// SeriesFilter
// ---------------------------------------------------------------------------

/// Bucket size of a volume series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Granularity {
    Day,
    #[default]
    Month,
    Year,
}

impl Granularity {
    /// SQL expression producing the bucket label from the ISO date column.
    fn period_expr(self) -> &'static str {
        match self {
            Granularity::Day => "date",
            Granularity::Month => "substr(date, 1, 7)",
            Granularity::Year => "substr(date, 1, 4)",
        }
    }
}

/// Filters shared by the series and record queries. Date bounds are
/// inclusive.
#[derive(Debug, Clone, Default)]
pub struct SeriesFilter {
    pub country: Option<String>,
    pub portid: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub granularity: Granularity,
}

impl SeriesFilter {
    fn validate(&self) -> Result<()> {
        if let (Some(from), Some(to)) = (self.date_from, self.date_to) {
            if from > to {
                return Err(PortwatchError::InvalidArgument(format!(
                    "date range is empty: {} is after {}",
                    from, to
                )));
            }
        }
        Ok(())
    }

    fn apply(&self, qb: &mut SqlBuilder) {
        if let Some(c) = &self.country {
            qb.where_eq("country", c.clone());
        }
        if let Some(p) = &self.portid {
            qb.where_eq("portid", p.clone());
        }
        if let Some(from) = self.date_from {
            qb.where_gte("date", from.format("%Y-%m-%d").to_string());
        }
        if let Some(to) = self.date_to {
            qb.where_lte("date", to.format("%Y-%m-%d").to_string());
        }
    }
}

// ---------------------------------------------------------------------------
// SeriesQuery
// ---------------------------------------------------------------------------

/// Query interface for filtered series, ports and raw records.
pub struct SeriesQuery<'a> {
    conn: &'a crate::connection::Connection,
    table: &'a str,
}

impl<'a> SeriesQuery<'a> {
    /// Create a new `SeriesQuery` bound to the given connection and table.
    pub fn new(conn: &'a crate::connection::Connection, table: &'a str) -> Self {
        Self { conn, table }
    }

    /// Distinct ports, optionally restricted to one country.
    pub fn ports(&self, country: Option<&str>) -> Result<Vec<PortInfo>> {
        self.conn.ensure_tables(&[self.table])?;

        let mut qb = SqlBuilder::new(&quote_ident(self.table));
        qb.select(&["portid", "portname", "country"])
            .distinct()
            .order_by(&["country ASC", "portname ASC", "portid ASC"]);
        if let Some(c) = country {
            qb.where_eq("country", c.to_string());
        }

        let (sql, params) = qb.build();
        self.conn.execute_into(&sql, &params)
    }

    /// Imports and exports (millions of metric tons) and port calls,
    /// bucketed by the filter's granularity, oldest first.
    pub fn volume_series(&self, filter: &SeriesFilter) -> Result<Vec<SeriesPoint>> {
        filter.validate()?;
        self.conn.ensure_tables(&[self.table])?;

        let period = format!("{} AS period", filter.granularity.period_expr());
        let mut qb = SqlBuilder::new(&quote_ident(self.table));
        qb.select(&[
            period.as_str(),
            "SUM(import) AS imports",
            "SUM(export) AS exports",
            "COALESCE(SUM(portcalls), 0) AS port_calls",
        ])
        .where_not_null("date");
        filter.apply(&mut qb);
        qb.group_by(&["period"]).order_by(&["period ASC"]);

        let (sql, params) = qb.build();
        let rows = self.conn.execute(&sql, &params)?;
        Ok(rows
            .iter()
            .filter_map(|r| {
                Some(SeriesPoint {
                    period: r.get("period").and_then(|v| v.as_str())?.to_string(),
                    imports: num(r, "imports") / TRADE_SCALE,
                    exports: num(r, "exports") / TRADE_SCALE,
                    port_calls: r.get("port_calls").and_then(|v| v.as_i64()).unwrap_or(0),
                })
            })
            .collect())
    }

    /// Raw records matching the filter, ordered by date then port.
    pub fn records(&self, filter: &SeriesFilter, limit: Option<usize>) -> Result<Vec<TradeRecord>> {
        filter.validate()?;
        self.conn.ensure_tables(&[self.table])?;

        let mut qb = SqlBuilder::new(&quote_ident(self.table));
        filter.apply(&mut qb);
        qb.order_by(&["date ASC", "portid ASC"]);
        if let Some(l) = limit {
            qb.limit(l);
        }

        let (sql, params) = qb.build();
        self.conn.execute_into(&sql, &params)
    }
}
