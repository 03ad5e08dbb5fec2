mod common;

use common::assert_close;
use portwatch::models::CountryTrade;
use portwatch::queries::TradeQuery;
use portwatch::{Converter, PortwatchError, TableSchema, TradeApi};

fn country(iso3: &str, trade: f64) -> CountryTrade {
    CountryTrade {
        iso3: iso3.to_string(),
        imports: trade / 2.0,
        exports: trade / 2.0,
        trade,
    }
}

// ---------------------------------------------------------------------------
// Distinct values
// ---------------------------------------------------------------------------

#[test]
fn years_are_sorted_and_distinct() {
    let (api, _tmp) = common::setup_sample_db();
    assert_eq!(api.trade().years().unwrap(), vec![2023, 2024]);
}

#[test]
fn countries_are_sorted_and_distinct() {
    let (api, _tmp) = common::setup_sample_db();
    assert_eq!(
        api.trade().countries().unwrap(),
        vec!["Brazil", "China", "United States"]
    );
}

// ---------------------------------------------------------------------------
// Yearly totals
// ---------------------------------------------------------------------------

#[test]
fn total_port_calls_per_year() {
    let (api, _tmp) = common::setup_sample_db();
    assert_eq!(api.trade().total_port_calls(2023).unwrap(), 42);
    assert_eq!(api.trade().total_port_calls(2024).unwrap(), 20);
}

#[test]
fn total_port_calls_for_absent_year_is_zero() {
    let (api, _tmp) = common::setup_sample_db();
    assert_eq!(api.trade().total_port_calls(1999).unwrap(), 0);
}

#[test]
fn trade_split_rounds_to_one_decimal() {
    let (api, _tmp) = common::setup_sample_db();

    let split = api.trade().trade_split(2023).unwrap();
    assert_close(split.import_pct, 52.9);
    assert_close(split.export_pct, 47.1);

    let split = api.trade().trade_split(2024).unwrap();
    assert_close(split.import_pct, 35.0);
    assert_close(split.export_pct, 65.0);
}

#[test]
fn trade_split_without_trade_is_not_found() {
    let (api, _tmp) = common::setup_sample_db();
    let err = api.trade().trade_split(1999).unwrap_err();
    assert!(matches!(err, PortwatchError::NotFound(_)));
}

// ---------------------------------------------------------------------------
// World trade
// ---------------------------------------------------------------------------

#[test]
fn world_trade_is_grouped_by_iso3_in_millions() {
    let (api, _tmp) = common::setup_sample_db();
    let rows = api.trade().world_trade(2023).unwrap();

    let codes: Vec<&str> = rows.iter().map(|r| r.iso3.as_str()).collect();
    assert_eq!(codes, vec!["CHN", "USA"]);

    assert_close(rows[0].imports, 4.0);
    assert_close(rows[0].exports, 6.0);
    assert_close(rows[0].trade, 10.0);
    assert_close(rows[1].imports, 5.0);
    assert_close(rows[1].exports, 2.0);
    assert_close(rows[1].trade, 7.0);
}

#[test]
fn world_trade_trade_is_imports_plus_exports() {
    let (api, _tmp) = common::setup_sample_db();
    for row in api.trade().world_trade(2024).unwrap() {
        assert_close(row.trade, row.imports + row.exports);
    }
}

#[test]
fn world_trade_for_absent_year_is_empty() {
    let (api, _tmp) = common::setup_sample_db();
    assert!(api.trade().world_trade(1999).unwrap().is_empty());
}

#[test]
fn world_trade_skips_rows_without_iso3() {
    let tmp = tempfile::tempdir().unwrap();
    let csv = common::write_file(
        tmp.path(),
        "ports.csv",
        &common::sample_csv(&[
            ("2023-06-01", "port1", "Los Angeles", "United States", "USA", 1, 1_000_000.0, 0.0),
            ("2023-06-01", "port8", "Unknown", "", "", 1, 5_000_000.0, 0.0),
        ]),
    );
    let db = tmp.path().join("ports.db");
    Converter::new(TableSchema::portwatch()).convert(&csv, &db).unwrap();
    let api = TradeApi::builder().db_path(&db).build().unwrap();

    let rows = api.trade().world_trade(2023).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].iso3, "USA");
    // Share of mapped trade only.
    assert_close(TradeQuery::top_share(&rows), 100.0);
}

// ---------------------------------------------------------------------------
// top_share
// ---------------------------------------------------------------------------

#[test]
fn top_share_from_world_trade() {
    let (api, _tmp) = common::setup_sample_db();
    let t = api.trade();
    assert_close(TradeQuery::top_share(&t.world_trade(2023).unwrap()), 58.8);
    assert_close(TradeQuery::top_share(&t.world_trade(2024).unwrap()), 60.0);
}

#[test]
fn top_share_of_single_country_is_hundred() {
    assert_close(TradeQuery::top_share(&[country("USA", 3.0)]), 100.0);
}

#[test]
fn top_share_of_empty_or_zero_trade_is_zero() {
    assert_eq!(TradeQuery::top_share(&[]), 0.0);
    assert_eq!(
        TradeQuery::top_share(&[country("USA", 0.0), country("CHN", 0.0)]),
        0.0
    );
}

// ---------------------------------------------------------------------------
// Country history
// ---------------------------------------------------------------------------

#[test]
fn country_monthly_groups_by_month() {
    let (api, _tmp) = common::setup_sample_db();
    let series = api.trade().country_monthly("United States").unwrap();

    let months: Vec<(i32, u32)> = series.iter().map(|m| (m.year, m.month)).collect();
    assert_eq!(months, vec![(2023, 1), (2023, 2), (2024, 3)]);

    assert_close(series[0].imports, 2.0);
    assert_close(series[0].exports, 1.0);
    assert_close(series[1].imports, 3.0);
    assert_close(series[1].exports, 1.0);
    assert_close(series[2].imports, 1.0);
    assert_close(series[2].exports, 1.0);
}

#[test]
fn country_monthly_dates_are_first_of_month() {
    let (api, _tmp) = common::setup_sample_db();
    let series = api.trade().country_monthly("United States").unwrap();
    let dates: Vec<String> = series.iter().map(|m| m.date.to_string()).collect();
    assert_eq!(dates, vec!["2023-01-01", "2023-02-01", "2024-03-01"]);
}

#[test]
fn country_monthly_unknown_country_is_empty() {
    let (api, _tmp) = common::setup_sample_db();
    assert!(api.trade().country_monthly("Atlantis").unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Missing table
// ---------------------------------------------------------------------------

#[test]
fn queries_fail_when_table_is_dropped() {
    let (api, tmp) = common::setup_sample_db();
    {
        let rw = common::open_rw(&tmp.path().join("port_activity.db"));
        rw.execute_batch("DROP TABLE \"Ports\"").unwrap();
    }
    let err = api.trade().years().unwrap_err();
    assert!(matches!(err, PortwatchError::NotFound(_)));
}
