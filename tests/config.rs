use ankermake_monitor::config::{ConfigError, SourceKind, load_config, parse_config};
use std::io::Write;
use std::path::PathBuf;

#[test]
fn test_full_config() {
    let config = parse_config(
        r#"
        [printer]
        name = "Workshop M5"

        [source]
        kind = "file"
        path = "traces/overnight.jsonl"

        [monitor]
        heartbeat_timeout_secs = 45
        restart_backoff_secs = 2
        poll_interval_secs = 10
        status_document = "/run/ankerctl/status.json"

        [web]
        enabled = false
        bind = "127.0.0.1:8080"
        "#,
    )
    .unwrap();

    assert_eq!(config.printer.name, "Workshop M5");
    assert_eq!(config.source.kind, SourceKind::File);
    assert_eq!(config.source.path, Some(PathBuf::from("traces/overnight.jsonl")));
    assert_eq!(config.monitor.heartbeat_timeout_secs, 45);
    assert_eq!(config.monitor.restart_backoff_secs, 2);
    assert_eq!(config.monitor.poll_interval_secs, 10);
    assert_eq!(config.monitor.status_document, Some(PathBuf::from("/run/ankerctl/status.json")));
    assert!(!config.web.enabled);
    assert_eq!(config.web.bind, "127.0.0.1:8080");
}

#[test]
fn test_empty_config_uses_defaults() {
    let config = parse_config("").unwrap();
    assert_eq!(config.printer.name, "AnkerMake");
    assert_eq!(config.source.kind, SourceKind::WebSocket);
    assert_eq!(config.source.host.as_deref(), Some("ws://127.0.0.1:4470"));
    assert!(config.source.address.is_none());
    assert!(config.monitor.status_url.is_none());
    assert_eq!(config.monitor.heartbeat_timeout_secs, 30);
    assert_eq!(config.monitor.restart_backoff_secs, 5);
    assert_eq!(config.monitor.poll_interval_secs, 5);
    assert!(config.monitor.status_document.is_none());
    assert!(config.web.enabled);
}

#[test]
fn test_validation() {
    let err = parse_config("[monitor]\nheartbeat_timeout_secs = 0\n").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));

    let err = parse_config("[monitor]\npoll_interval_secs = 0\n").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));

    let err = parse_config("[source]\nkind = \"file\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));

    let err = parse_config("[source]\nkind = \"tcp\"\naddress = \"\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));

    let err = parse_config("[source]\nkind = \"tcp\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));

    let err = parse_config("[source]\nkind = \"websocket\"\nhost = \"\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));

    let err = parse_config(
        "[monitor]\nstatus_url = \"http://printer.lan/api/ankerctl/status\"\nstatus_document = \"status.json\"\n",
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn test_bad_toml() {
    let err = parse_config("[source]\nkind = \"carrier-pigeon\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Toml(_)));
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[printer]\nname = \"Garage\"").unwrap();
    let config = load_config(file.path()).unwrap();
    assert_eq!(config.printer.name, "Garage");

    let err = load_config("/definitely/not/here/printer.toml").unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn test_websocket_source() {
    let config = parse_config(
        r#"
        [source]
        kind = "websocket"
        host = "ws://printer.lan:4470"

        [monitor]
        status_url = "http://printer.lan:4470/api/ankerctl/status"
        "#,
    )
    .unwrap();
    assert_eq!(config.source.kind, SourceKind::WebSocket);
    assert_eq!(config.source.host.as_deref(), Some("ws://printer.lan:4470"));
    assert_eq!(
        config.monitor.status_url.as_deref(),
        Some("http://printer.lan:4470/api/ankerctl/status")
    );
}
