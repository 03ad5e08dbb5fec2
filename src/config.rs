use std::path::PathBuf;

/// Landing page of the dataset the converter expects.
pub const DATA_SOURCE_URL: &str =
    "https://portwatch.imf.org/datasets/959214444157458aad969389b3ebe1a0/about";

/// Table name used when none is configured.
pub const DEFAULT_TABLE: &str = "Ports";

pub const DEFAULT_DB_FILE: &str = "port_activity.db";

/// Raw volumes are metric tons; the dashboard reports millions of them.
pub const TRADE_SCALE: f64 = 1_000_000.0;

/// Upper bound of the choropleth colour range, in millions of metric tons.
pub const DEFAULT_MAP_VMAX: f64 = 7000.0;

pub const DEFAULT_WIDTH: u32 = 900;
pub const DEFAULT_HEIGHT: u32 = 500;
pub const WIDTH_RANGE: (u32, u32) = (600, 1500);
pub const HEIGHT_RANGE: (u32, u32) = (400, 900);

/// Rows between progress log lines during conversion.
pub const PROGRESS_INTERVAL: u64 = 100_000;

pub const DATA_NOTE: &str = "Note: Recent trade volumes may seem unusually low \
because data is still incomplete for the current period.";

pub fn default_data_dir() -> PathBuf {
    if let Some(data) = dirs::data_local_dir() {
        data.join("portwatch")
    } else {
        PathBuf::from(".portwatch")
    }
}

pub fn default_db_path() -> PathBuf {
    default_data_dir().join(DEFAULT_DB_FILE)
}
