mod common;

use portwatch::{Connection, PortwatchError, TableSchema, TradeApi};
use rusqlite::types::Value;

#[test]
fn missing_database_is_file_not_found() {
    let tmp = tempfile::tempdir().unwrap();
    let err = TradeApi::builder()
        .db_path(tmp.path().join("absent.db"))
        .build()
        .unwrap_err();
    assert!(matches!(err, PortwatchError::FileNotFound(_)));
}

#[test]
fn missing_table_is_not_found_with_hint() {
    let (_api, tmp) = common::setup_sample_db();
    let err = TradeApi::builder()
        .db_path(tmp.path().join("port_activity.db"))
        .table("Harbours")
        .build()
        .unwrap_err();
    match err {
        PortwatchError::NotFound(msg) => {
            assert!(msg.contains("Harbours"));
            assert!(msg.contains("portwatch convert"));
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn execute_returns_rows_as_maps() {
    let (api, _tmp) = common::setup_sample_db();
    let rows = api
        .connection()
        .execute(
            "SELECT portname, portcalls FROM Ports WHERE ISO3 = ? ORDER BY date",
            &[Value::Text("CHN".into())],
        )
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["portname"], "Shanghai");
    assert_eq!(rows[0]["portcalls"], 20);
    assert_eq!(rows[1]["portcalls"], 8);
}

#[test]
fn execute_maps_null_to_json_null() {
    let (api, _tmp) = common::setup_sample_db();
    let rows = api
        .sql("SELECT import_tanker FROM Ports LIMIT 1", &[])
        .unwrap();
    assert!(rows[0]["import_tanker"].is_null());
}

#[test]
fn execute_scalar_reads_first_cell() {
    let (api, _tmp) = common::setup_sample_db();
    let conn = api.connection();

    let total = conn
        .execute_scalar("SELECT SUM(portcalls) FROM Ports", &[])
        .unwrap();
    assert_eq!(total.and_then(|v| v.as_i64()), Some(62));

    let none = conn
        .execute_scalar("SELECT portid FROM Ports WHERE 0", &[])
        .unwrap();
    assert!(none.is_none());
}

#[test]
fn table_and_column_listing() {
    let (api, _tmp) = common::setup_sample_db();
    let conn = api.connection();

    assert_eq!(conn.tables().unwrap(), vec!["Ports"]);
    assert!(conn.has_table("Ports").unwrap());
    assert!(!conn.has_table("Harbours").unwrap());

    let columns = conn.columns("Ports").unwrap();
    let expected: Vec<String> = TableSchema::portwatch()
        .columns
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(columns, expected);
}

#[test]
fn connection_is_read_only() {
    let (api, _tmp) = common::setup_sample_db();
    let err = api.sql("DELETE FROM Ports", &[]).unwrap_err();
    assert!(matches!(err, PortwatchError::Sqlite(_)));
    assert_eq!(api.row_count().unwrap(), 6);
}

#[test]
fn from_raw_wraps_in_memory_database() {
    let raw = rusqlite::Connection::open_in_memory().unwrap();
    raw.execute_batch("CREATE TABLE t (x INTEGER); INSERT INTO t VALUES (1), (2);")
        .unwrap();
    let conn = Connection::from_raw(raw);

    assert!(conn.path().is_none());
    conn.ensure_tables(&["t"]).unwrap();
    assert!(matches!(
        conn.ensure_tables(&["t", "u"]),
        Err(PortwatchError::NotFound(_))
    ));

    let api = TradeApi::from_connection(conn, "t").unwrap();
    assert_eq!(api.row_count().unwrap(), 2);
    assert_eq!(api.to_string(), "TradeApi(db=:memory:, table=t)");
}

#[test]
fn display_names_database_and_table() {
    let (api, tmp) = common::setup_sample_db();
    let shown = api.to_string();
    assert!(shown.contains(&tmp.path().join("port_activity.db").display().to_string()));
    assert!(shown.ends_with("table=Ports)"));
    assert_eq!(api.table(), "Ports");
    api.close();
}

#[test]
fn raw_connection_is_the_same_database() {
    let (api, _tmp) = common::setup_sample_db();
    let raw = api.connection().raw();

    let ports: i64 = raw
        .query_row("SELECT COUNT(DISTINCT portid) FROM Ports", [], |r| r.get(0))
        .unwrap();
    assert_eq!(ports, 3);
}
