use super::*;

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(4000);
    raw.logging.level = Some("info".to_string());

    let overrides = ServeOverrides {
        server_port: Some(4321),
        log_level: Some("debug".to_string()),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
}

#[test]
fn defaults_resolve_without_any_source() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.server.addr.to_string(), "127.0.0.1:3000");
    assert_eq!(settings.server.graceful_shutdown, Duration::from_secs(30));
    assert_eq!(settings.logging.level, LevelFilter::INFO);
    assert!(matches!(settings.logging.format, LogFormat::Compact));
}

#[test]
fn cache_settings_use_correct_defaults() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert!(settings.cache.enabled);
    assert_eq!(settings.cache.default_ttl, Duration::from_secs(300));
    assert_eq!(settings.cache.max_entries.get(), 1000);
    assert_eq!(settings.cache.sweep_interval, Duration::from_millis(60_000));
    assert_eq!(settings.cache.response_body_limit_bytes.get(), 1_048_576);
    assert_eq!(settings.cache.invalidation_mode, InvalidationMode::Inline);
}

#[test]
fn resolved_cache_defaults_round_trip_to_cache_config() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");
    let resolved = CacheConfig::from(&settings.cache);
    let defaults = CacheConfig::default();

    assert_eq!(resolved.enabled, defaults.enabled);
    assert_eq!(resolved.default_ttl_secs, defaults.default_ttl_secs);
    assert_eq!(resolved.max_entries, defaults.max_entries);
    assert_eq!(resolved.sweep_interval_ms, defaults.sweep_interval_ms);
    assert_eq!(
        resolved.response_body_limit_bytes,
        defaults.response_body_limit_bytes
    );
    assert_eq!(resolved.invalidation_mode, defaults.invalidation_mode);
}

#[test]
fn cache_overrides_apply() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        cache: CacheOverrides {
            cache_enabled: Some(false),
            cache_default_ttl_seconds: Some(60),
            cache_max_entries: Some(16),
            cache_invalidation_mode: Some("Detached".to_string()),
            ..Default::default()
        },
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(!settings.cache.enabled);
    assert_eq!(settings.cache.default_ttl, Duration::from_secs(60));
    assert_eq!(settings.cache.max_entries.get(), 16);
    assert_eq!(settings.cache.invalidation_mode, InvalidationMode::Detached);
}

#[test]
fn zero_cache_values_are_rejected() {
    let mut raw = RawSettings::default();
    raw.cache.max_entries = Some(0);
    let err = Settings::from_raw(raw).expect_err("zero max entries");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "cache.max_entries",
            ..
        }
    ));

    let mut raw = RawSettings::default();
    raw.cache.default_ttl_seconds = Some(0);
    assert!(Settings::from_raw(raw).is_err());

    let mut raw = RawSettings::default();
    raw.cache.sweep_interval_ms = Some(0);
    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn unknown_invalidation_mode_is_rejected() {
    let mut raw = RawSettings::default();
    raw.cache.invalidation_mode = Some("eventually".to_string());

    let err = Settings::from_raw(raw).expect_err("bad mode");
    assert!(err.to_string().contains("cache.invalidation_mode"));
}

#[test]
fn zero_port_is_rejected() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(0);
    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn invalid_log_level_is_rejected() {
    let mut raw = RawSettings::default();
    raw.logging.level = Some("loud".to_string());
    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn default_to_serve_command() {
    let args = CliArgs::parse_from(["quillpost"]);
    let command = args
        .command
        .unwrap_or(Command::Serve(Box::<ServeArgs>::default()));
    assert!(matches!(command, Command::Serve(_)));
}

#[test]
fn parse_serve_overrides() {
    let args = CliArgs::parse_from([
        "quillpost",
        "serve",
        "--server-host",
        "0.0.0.0",
        "--cache-enabled",
        "false",
        "--cache-invalidation-mode",
        "detached",
    ]);

    match args.command.expect("serve command") {
        Command::Serve(serve) => {
            assert_eq!(serve.overrides.server_host.as_deref(), Some("0.0.0.0"));
            assert_eq!(serve.overrides.cache.cache_enabled, Some(false));
            assert_eq!(
                serve.overrides.cache.cache_invalidation_mode.as_deref(),
                Some("detached")
            );
        }
    }
}
