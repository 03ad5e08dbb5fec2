use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// TradeRecord: One port on one day, as loaded by the converter
// ---------------------------------------------------------------------------

/// A row of the PortWatch daily port activity table.
///
/// Vessel counts are `portcalls*`; `import*` and `export*` are estimated
/// volumes in metric tons, split by vessel category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub date: String,
    pub year: i64,
    pub month: i64,
    pub day: i64,
    pub portid: String,
    pub portname: Option<String>,
    pub country: Option<String>,
    #[serde(rename = "ISO3")]
    pub iso3: Option<String>,

    pub portcalls_container: Option<i64>,
    pub portcalls_dry_bulk: Option<i64>,
    pub portcalls_general_cargo: Option<i64>,
    pub portcalls_roro: Option<i64>,
    pub portcalls_tanker: Option<i64>,
    pub portcalls_cargo: Option<i64>,
    pub portcalls: Option<i64>,

    pub import_container: Option<f64>,
    pub import_dry_bulk: Option<f64>,
    pub import_general_cargo: Option<f64>,
    pub import_roro: Option<f64>,
    pub import_tanker: Option<f64>,
    pub import_cargo: Option<f64>,
    pub import: Option<f64>,

    pub export_container: Option<f64>,
    pub export_dry_bulk: Option<f64>,
    pub export_general_cargo: Option<f64>,
    pub export_roro: Option<f64>,
    pub export_tanker: Option<f64>,
    pub export_cargo: Option<f64>,
    pub export: Option<f64>,

    #[serde(rename = "ObjectId")]
    pub object_id: Option<i64>,
}

impl TradeRecord {
    /// Imports plus exports in metric tons, treating missing values as zero.
    pub fn total_trade(&self) -> f64 {
        self.import.unwrap_or(0.0) + self.export.unwrap_or(0.0)
    }
}
