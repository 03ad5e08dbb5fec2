use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CountryTrade: Yearly trade of one country (map row)
// ---------------------------------------------------------------------------

/// Imports, exports and their sum for one ISO3 code, in millions of metric
/// tons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryTrade {
    #[serde(rename = "ISO3")]
    pub iso3: String,
    pub imports: f64,
    pub exports: f64,
    pub trade: f64,
}

// ---------------------------------------------------------------------------
// MonthlyTrade: One month of a country's trade (line plot point)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTrade {
    /// First day of the month.
    pub date: NaiveDate,
    pub year: i32,
    pub month: u32,
    pub imports: f64,
    pub exports: f64,
}

// ---------------------------------------------------------------------------
// TradeSplit: Import / export share of total trade
// ---------------------------------------------------------------------------

/// Percentages rounded to one decimal place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeSplit {
    pub import_pct: f64,
    pub export_pct: f64,
}

// ---------------------------------------------------------------------------
// SeriesPoint: One bucket of a filtered volume series
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// Bucket label: `YYYY-MM-DD`, `YYYY-MM` or `YYYY`.
    pub period: String,
    pub imports: f64,
    pub exports: f64,
    pub port_calls: i64,
}

// ---------------------------------------------------------------------------
// PortInfo: Distinct port identity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortInfo {
    pub portid: String,
    pub portname: Option<String>,
    pub country: Option<String>,
}
