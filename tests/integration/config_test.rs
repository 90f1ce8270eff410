//! Config partitions merged from package and plugin files.

use framekit_core::types::Value;

use crate::helpers::TestApp;

#[test]
fn test_packages_and_plugin_merge_in_order() {
    let mut app = TestApp::new();
    app.package_file("common", "db.toml", "host = \"common\"\nport = 1\n\n[pool]\nmin = 1\nmax = 5\n")
        .package_file("extra", "db.json", r#"{ "port": 2, "pool": { "max": 10 } }"#);
    app.plugin_file("db.toml", "host = \"plugin\"\n");

    let (context, _, _) = app.boot();
    let store = context.config();

    assert_eq!(store.get("db", "host", Value::Null), Value::from("plugin"));
    assert_eq!(store.get("db", "port", Value::Null), Value::from(2));
    assert_eq!(store.get("db", "pool.min", Value::Null), Value::from(1));
    assert_eq!(store.get("db", "pool.max", Value::Null), Value::from(10));
    assert_eq!(store.get("db", "missing", "fallback"), Value::from("fallback"));
    assert_eq!(store.get("absent", "anything", Value::Null), Value::Null);
}

#[test]
fn test_root_partition_carries_highest_floors() {
    let mut app = TestApp::new();
    app.package_file(
        "common",
        "config.toml",
        "required_runtime_version = \"7.4\"\nrequired_platform_version = \"5.2\"\n",
    );
    app.plugin_file("config.toml", "required_runtime_version = \"7.0\"\n");

    let (context, _, _) = app.boot();
    let system = context.system();

    assert_eq!(system.required_runtime_version(), "7.4");
    assert_eq!(system.required_platform_version(), "5.2");
    assert!(system.is_enough_version());
    assert_eq!(
        context.config().get("config", "required_runtime_version", Value::Null),
        Value::from("7.4")
    );
}

#[test]
fn test_set_overrides_without_touching_files() {
    let app = TestApp::new();
    app.plugin_file("cache.toml", "ttl = 60\n");

    let (context, _, _) = app.boot();
    context.config().set("cache", "ttl", 120);

    assert_eq!(context.config().get("cache", "ttl", Value::Null), Value::from(120));
    let on_disk = std::fs::read_to_string(std::path::Path::new(&app.config.plugin.configs_dir).join("cache.toml"))
        .expect("read");
    assert_eq!(on_disk, "ttl = 60\n");
}
