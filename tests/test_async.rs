#![cfg(feature = "async")]

mod common;

use portwatch::AsyncTradeApi;

#[tokio::test]
async fn async_queries_run_on_blocking_pool() {
    let (_api, tmp) = common::setup_sample_db();
    let api = AsyncTradeApi::builder()
        .db_path(tmp.path().join("port_activity.db"))
        .build()
        .await
        .unwrap();

    assert_eq!(api.years().await.unwrap(), vec![2023, 2024]);
    assert_eq!(api.countries().await.unwrap().len(), 3);

    let world = api.run(|a| a.trade().world_trade(2023)).await.unwrap();
    assert_eq!(world.len(), 2);

    let rows = api
        .sql("SELECT COUNT(*) AS n FROM Ports", &[])
        .await
        .unwrap();
    assert_eq!(rows[0]["n"], 6);
}

#[tokio::test]
async fn async_build_missing_database() {
    let tmp = tempfile::tempdir().unwrap();
    let result = AsyncTradeApi::builder()
        .db_path(tmp.path().join("absent.db"))
        .build()
        .await;
    assert!(matches!(
        result,
        Err(portwatch::PortwatchError::FileNotFound(_))
    ));
}
