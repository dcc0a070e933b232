use std::time::Duration;

use todosvc::config::{AppConfig, ClickHouseSection, StoreBackendKind, StoreSection};
use todosvc::store::StoreConfig;

#[test]
fn clickhouse_backend_requires_section() {
    let config = AppConfig {
        store: StoreSection {
            backend: StoreBackendKind::ClickHouse,
            clickhouse: None,
            ..Default::default()
        },
        ..Default::default()
    };

    let result = config.store.to_runtime();
    assert!(
        result.is_err(),
        "Expected clickhouse backend without settings to fail validation"
    );
}

#[test]
fn clickhouse_settings_propagate() {
    let config = AppConfig {
        store: StoreSection {
            backend: StoreBackendKind::ClickHouse,
            ping_timeout_secs: 2,
            clickhouse: Some(ClickHouseSection {
                url: " http://ch.internal:8123 ".into(),
                database: "analytics".into(),
                username: "svc".into(),
                password: "secret".into(),
                table: "analytics.todos".into(),
                query_timeout_secs: 3,
                wait_for_mutations: true,
                ..Default::default()
            }),
        },
        ..Default::default()
    };

    let runtime = config.store.to_runtime().expect("valid store configuration");
    assert_eq!(runtime.table, "analytics.todos");
    assert_eq!(runtime.ping_timeout, Duration::from_secs(2));

    match runtime.store {
        StoreConfig::ClickHouse(ch) => {
            assert_eq!(ch.url, "http://ch.internal:8123");
            assert_eq!(ch.database, "analytics");
            assert_eq!(ch.username, "svc");
            assert_eq!(ch.password, "secret");
            assert_eq!(ch.query_timeout, Duration::from_secs(3));
            assert_eq!(ch.connect_timeout, Duration::from_secs(5));
            assert!(ch.wait_for_mutations);
        }
        other => panic!("Expected ClickHouse store config, got {:?}", other),
    }
}

#[test]
fn empty_database_is_rejected() {
    let config = AppConfig {
        store: StoreSection {
            clickhouse: Some(ClickHouseSection {
                database: "  ".into(),
                ..Default::default()
            }),
            ..Default::default()
        },
        ..Default::default()
    };

    assert!(config.store.to_runtime().is_err());
}

#[test]
fn zero_ping_timeout_is_rejected() {
    let config = AppConfig {
        store: StoreSection {
            backend: StoreBackendKind::Memory,
            ping_timeout_secs: 0,
            clickhouse: None,
        },
        ..Default::default()
    };

    assert!(config.store.to_runtime().is_err());
}
