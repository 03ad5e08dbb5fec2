//! Dashboard views and the static HTML page that shows them.
//!
//! The page has the two tabs of the interactive dashboard laid out one
//! after the other: the world view for a year (headline numbers and the
//! choropleth) and the trade history of one country.

use serde::Serialize;

use crate::config;
use crate::error::{PortwatchError, Result};
use crate::figures::{self, Dimensions, Figure};
use crate::models::{CountryTrade, MonthlyTrade, TradeSplit};
use crate::queries::TradeQuery;
use crate::TradeApi;

const PLOTLY_JS: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Country shown when none is requested and it exists in the data.
pub const DEFAULT_COUNTRY: &str = "United States";

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// Headline numbers and map for one year.
#[derive(Debug, Clone)]
pub struct YearOverview {
    pub year: i32,
    pub total_port_calls: i64,
    /// `None` when the year has rows but no recorded trade.
    pub split: Option<TradeSplit>,
    /// Percentage of world trade held by the largest country.
    pub top_share: f64,
    pub countries: Vec<CountryTrade>,
    pub map: Figure,
}

/// Monthly trade history of one country.
#[derive(Debug, Clone)]
pub struct CountryView {
    pub country: String,
    pub series: Vec<MonthlyTrade>,
    pub plot: Figure,
}

/// Serializable headline numbers, used by `portwatch summary --json`.
#[derive(Debug, Clone, Serialize)]
pub struct YearSummary {
    pub year: i32,
    pub total_port_calls: i64,
    pub import_pct: Option<f64>,
    pub export_pct: Option<f64>,
    pub top_share: f64,
    pub countries: usize,
}

impl From<&YearOverview> for YearSummary {
    fn from(o: &YearOverview) -> Self {
        Self {
            year: o.year,
            total_port_calls: o.total_port_calls,
            import_pct: o.split.map(|s| s.import_pct),
            export_pct: o.split.map(|s| s.export_pct),
            top_share: o.top_share,
            countries: o.countries.len(),
        }
    }
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// Builds dashboard views from a [`TradeApi`].
pub struct Dashboard<'a> {
    api: &'a TradeApi,
    dims: Dimensions,
    vmax: f64,
}

impl<'a> Dashboard<'a> {
    pub fn new(api: &'a TradeApi) -> Self {
        Self {
            api,
            dims: Dimensions::default(),
            vmax: config::DEFAULT_MAP_VMAX,
        }
    }

    pub fn dimensions(mut self, dims: Dimensions) -> Self {
        self.dims = dims;
        self
    }

    /// Upper bound of the map colour range, in millions of metric tons.
    pub fn map_vmax(mut self, vmax: f64) -> Self {
        self.vmax = vmax;
        self
    }

    /// Most recent year in the data.
    pub fn default_year(&self) -> Result<i32> {
        self.api
            .trade()
            .years()?
            .last()
            .copied()
            .ok_or_else(|| PortwatchError::NotFound("database contains no years".into()))
    }

    /// [`DEFAULT_COUNTRY`] if present, otherwise the first country by name.
    pub fn default_country(&self) -> Result<String> {
        let countries = self.api.trade().countries()?;
        if countries.iter().any(|c| c == DEFAULT_COUNTRY) {
            return Ok(DEFAULT_COUNTRY.to_string());
        }
        countries
            .into_iter()
            .next()
            .ok_or_else(|| PortwatchError::NotFound("database contains no countries".into()))
    }

    pub fn year_overview(&self, year: i32) -> Result<YearOverview> {
        let trade = self.api.trade();
        if !trade.years()?.contains(&year) {
            return Err(PortwatchError::NotFound(format!("no data for year {}", year)));
        }

        let split = match trade.trade_split(year) {
            Ok(s) => Some(s),
            Err(PortwatchError::NotFound(_)) => None,
            Err(e) => return Err(e),
        };
        let countries = trade.world_trade(year)?;
        let map = figures::choropleth(&countries, year, self.dims, self.vmax);

        Ok(YearOverview {
            year,
            total_port_calls: trade.total_port_calls(year)?,
            split,
            top_share: TradeQuery::top_share(&countries),
            countries,
            map,
        })
    }

    pub fn country_view(&self, country: &str) -> Result<CountryView> {
        let series = self.api.trade().country_monthly(country)?;
        if series.is_empty() {
            return Err(PortwatchError::NotFound(format!(
                "no data for country '{}'",
                country
            )));
        }
        let plot = figures::line_plot(&series, country, self.dims);
        Ok(CountryView {
            country: country.to_string(),
            series,
            plot,
        })
    }
}

// ---------------------------------------------------------------------------
// HTML rendering
// ---------------------------------------------------------------------------

/// Render a standalone HTML page. plotly.js is loaded from its CDN when the
/// page is opened.
pub fn render_html(overview: &YearOverview, country: Option<&CountryView>) -> Result<String> {
    let pct = |v: Option<f64>| v.map(|p| format!("{:.1}%", p)).unwrap_or_else(|| "n/a".into());

    let indicators = [
        ("#1 Country's Trade Share", format!("{:.1}%", overview.top_share)),
        ("Total Ship Arrivals", format!("{} ships", overview.total_port_calls)),
        ("Imports % of Total Trade", pct(overview.split.map(|s| s.import_pct))),
        ("Exports % of Total Trade", pct(overview.split.map(|s| s.export_pct))),
    ];

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!(
        "<title>World Trade Dashboard {}</title>\n",
        overview.year
    ));
    html.push_str(&format!("<script src=\"{}\"></script>\n", PLOTLY_JS));
    html.push_str(STYLE);
    html.push_str("</head>\n<body>\n<h1>World Trade Dashboard</h1>\n");
    html.push_str(&format!("<p class=\"note\">{}</p>\n", escape_html(config::DATA_NOTE)));

    html.push_str(&format!(
        "<section>\n<h2>World, {}</h2>\n<div class=\"row\">\n<div class=\"indicators\">\n",
        overview.year
    ));
    for (name, value) in &indicators {
        html.push_str(&format!(
            "<div class=\"indicator\"><div class=\"name\">{}</div><div class=\"value\">{}</div></div>\n",
            escape_html(name),
            escape_html(value)
        ));
    }
    html.push_str("</div>\n<div id=\"worldmap\"></div>\n</div>\n</section>\n");

    if let Some(view) = country {
        html.push_str(&format!(
            "<section>\n<h2>{}</h2>\n<div id=\"lineplot\"></div>\n</section>\n",
            escape_html(&view.country)
        ));
    }

    html.push_str("<script>\n");
    html.push_str(&plot_call("worldmap", &overview.map)?);
    if let Some(view) = country {
        html.push_str(&plot_call("lineplot", &view.plot)?);
    }
    html.push_str("</script>\n");
    html.push_str(&format!(
        "<footer>Data: <a href=\"{0}\">{0}</a></footer>\n</body>\n</html>\n",
        config::DATA_SOURCE_URL
    ));
    Ok(html)
}

fn plot_call(div: &str, figure: &Figure) -> Result<String> {
    // `</` inside a script block would end it early.
    let data = serde_json::to_string(figure.data())?.replace("</", "<\\/");
    let layout = serde_json::to_string(figure.layout())?.replace("</", "<\\/");
    Ok(format!("Plotly.newPlot(\"{}\", {}, {});\n", div, data, layout))
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const STYLE: &str = "<style>
body { font-family: sans-serif; margin: 1.5em; }
.note { color: #555; }
.row { display: flex; gap: 2em; align-items: flex-start; }
.indicators { display: flex; flex-direction: column; gap: 1em; min-width: 16em; }
.indicator .name { font-size: 12pt; }
.indicator .value { font-size: 30pt; color: #F0802B; }
h2 { background: #0078A8; color: #FFFFFF; padding: 0.3em 0.6em; }
</style>
";
