use sql_mapper::SqlMapperError;
use sql_mapper::engine::{self, ConnectionConfig, Engine};
use sql_mapper::raw::RawConnection;

fn dummy_engine() -> std::sync::Arc<Engine> {
    Engine::new(|| -> Result<Box<dyn RawConnection>, SqlMapperError> {
        Err(SqlMapperError::ConnectionError("dummy".into()))
    })
}

#[test]
fn installing_twice_is_a_config_error() {
    assert!(engine::installed().is_none());

    engine::install(dummy_engine()).unwrap();
    assert!(engine::installed().is_some());

    match engine::install(dummy_engine()) {
        Err(SqlMapperError::ConfigError(msg)) => {
            assert!(msg.contains("already installed"), "unexpected message: {msg}");
        }
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn config_defaults_are_documented_values() {
    let config = ConnectionConfig::default();
    assert_eq!(config.user, "root");
    assert_eq!(config.password, "");
    assert_eq!(config.database, ":memory:");
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 3306);
}

#[test]
fn config_deserializes_with_partial_fields() {
    let config: ConnectionConfig =
        serde_json::from_str(r#"{"database": "app.db", "port": 5432}"#).unwrap();
    assert_eq!(config.database, "app.db");
    assert_eq!(config.port, 5432);
    assert_eq!(config.user, "root");
}
