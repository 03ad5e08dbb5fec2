//! Plotly figure descriptions for the dashboard.
//!
//! Figures are plain JSON (`{"data": [...], "layout": {...}}`) handed to
//! plotly.js in the browser, so nothing here depends on a plotting library.

use serde_json::{json, Value};

use crate::config;
use crate::error::Result;
use crate::models::{CountryTrade, MonthlyTrade, SeriesPoint};

const VOLUME_LABEL: &str = "Trade Volume (in millions of metric tons)";

/// Plot size in pixels, clamped to the ranges the dashboard offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        let (wmin, wmax) = config::WIDTH_RANGE;
        let (hmin, hmax) = config::HEIGHT_RANGE;
        Self {
            width: width.clamp(wmin, wmax),
            height: height.clamp(hmin, hmax),
        }
    }
}

impl Default for Dimensions {
    fn default() -> Self {
        Self::new(config::DEFAULT_WIDTH, config::DEFAULT_HEIGHT)
    }
}

/// A Plotly figure.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    spec: Value,
}

impl Figure {
    pub fn spec(&self) -> &Value {
        &self.spec
    }

    pub fn data(&self) -> &Value {
        &self.spec["data"]
    }

    pub fn layout(&self) -> &Value {
        &self.spec["layout"]
    }

    pub fn title(&self) -> Option<&str> {
        self.spec["layout"]["title"]["text"].as_str()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.spec)?)
    }
}

fn base_layout(title: &str, dims: Dimensions) -> Value {
    json!({
        "title": { "text": title },
        "width": dims.width,
        "height": dims.height,
        "autosize": false,
    })
}

/// World map shading each ISO3 country by its total trade.
///
/// The colour range is fixed to `0..=vmax` so years stay comparable.
pub fn choropleth(rows: &[CountryTrade], year: i32, dims: Dimensions, vmax: f64) -> Figure {
    let locations: Vec<&str> = rows.iter().map(|r| r.iso3.as_str()).collect();
    let trade: Vec<f64> = rows.iter().map(|r| r.trade).collect();

    let mut layout = base_layout(&format!("Trade Volume Around the World in {}", year), dims);
    layout["geo"] = json!({ "showframe": false, "projection": { "type": "natural earth" } });

    Figure {
        spec: json!({
            "data": [{
                "type": "choropleth",
                "locationmode": "ISO-3",
                "locations": locations,
                "z": trade,
                "zmin": 0.0,
                "zmax": vmax,
                "colorscale": "Viridis",
                "reversescale": true,
                "colorbar": { "title": { "text": "Millions of Metric Tons" } },
                "hovertemplate": "%{location}<br>Trade: %{z:.2f}<extra></extra>",
            }],
            "layout": layout,
        }),
    }
}

/// Imports and exports of one country over time.
pub fn line_plot(series: &[MonthlyTrade], country: &str, dims: Dimensions) -> Figure {
    let dates: Vec<String> = series
        .iter()
        .map(|p| p.date.format("%Y-%m-%d").to_string())
        .collect();
    let imports: Vec<f64> = series.iter().map(|p| p.imports).collect();
    let exports: Vec<f64> = series.iter().map(|p| p.exports).collect();

    two_line_figure(&format!("{} Trade Volume", country), dates, imports, exports, dims)
}

/// Imports and exports of a filtered [`SeriesPoint`] series.
pub fn series_plot(series: &[SeriesPoint], title: &str, dims: Dimensions) -> Figure {
    let periods: Vec<String> = series.iter().map(|p| p.period.clone()).collect();
    let imports: Vec<f64> = series.iter().map(|p| p.imports).collect();
    let exports: Vec<f64> = series.iter().map(|p| p.exports).collect();

    two_line_figure(title, periods, imports, exports, dims)
}

fn two_line_figure(
    title: &str,
    x: Vec<String>,
    imports: Vec<f64>,
    exports: Vec<f64>,
    dims: Dimensions,
) -> Figure {
    let mut layout = base_layout(title, dims);
    layout["xaxis"] = json!({ "title": { "text": "Date" } });
    layout["yaxis"] = json!({ "title": { "text": VOLUME_LABEL } });
    layout["legend"] = json!({ "title": { "text": "Category" } });

    Figure {
        spec: json!({
            "data": [
                { "type": "scatter", "mode": "lines", "name": "Imports", "x": &x, "y": imports },
                { "type": "scatter", "mode": "lines", "name": "Exports", "x": &x, "y": exports },
            ],
            "layout": layout,
        }),
    }
}
