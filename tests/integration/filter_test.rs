//! Filters declared in the `filter` partition.

use std::sync::Arc;

use framekit_hooks::prelude::*;

use crate::helpers::TestApp;

const SYSTEM_FILTERS: &str = r#"
[system."${prefix}required_runtime_version"]
0 = "required_runtime_version"

[system."${framework}is_enough_version"]
is_enough_version = [10, 1]

[system."${prefix}unknown"]
not_a_method = 5
"#;

struct Shout;

impl FilterTarget for Shout {
    fn is_filter_callable(&self, method: &str) -> bool {
        method == "shout"
    }

    fn filter_callback(&self, _method: &str, args: Vec<Value>) -> Value {
        Value::from(args.first().map(Value::to_string).unwrap_or_default().to_uppercase())
    }
}

#[test]
fn test_declared_filters_reach_system() {
    let app = TestApp::new();
    app.plugin_file("config.toml", "required_runtime_version = \"7.4\"\n")
        .plugin_file("filter.toml", SYSTEM_FILTERS);

    let (_, bus, registry) = app.boot();

    assert_eq!(registry.subscriptions().len(), 3);
    assert_eq!(
        bus.apply_filters("shop/required_runtime_version", vec![Value::Null]),
        Value::from("7.4")
    );
    assert_eq!(
        bus.apply_filters("framekit/is_enough_version", vec![Value::from(false)]),
        Value::from(true)
    );
    assert_eq!(bus.apply_filters("shop/unknown", vec![Value::from(1)]), Value::from(1));

    assert_eq!(registry.elapsed_records().len(), 3);
    assert_eq!(registry.elapsed_details().len(), 3);
}

#[test]
fn test_version_gate_passes_values_through() {
    let app = TestApp::new();
    app.plugin_file("config.toml", "required_runtime_version = \"99.0\"\n")
        .plugin_file("filter.toml", SYSTEM_FILTERS);

    let (context, bus, _registry) = app.boot();
    assert!(!context.system().is_enough_version());
    assert_eq!(
        bus.apply_filters("shop/required_runtime_version", vec![Value::from("keep")]),
        Value::from("keep")
    );

    context.set_uninstalling(true);
    assert_eq!(
        bus.apply_filters("shop/required_runtime_version", vec![Value::from("keep")]),
        Value::from("99.0")
    );
}

#[test]
fn test_transform_hook_adds_declarations() {
    let app = TestApp::new();
    let context = Arc::new(AppContext::from_config(&app.config));
    context.register_target("shout", Arc::new(Shout));

    let bus = Arc::new(FilterBus::new());
    bus.add_filter(
        "shop/filter",
        Arc::new(|args: &[Value]| {
            let mut declarations = args[0].as_map().cloned().unwrap_or_default();
            declarations.insert(
                "shout".into(),
                Value::Map(canonical! { "${prefix}title" => canonical! { 0 => "shout" } }),
            );
            Value::Map(declarations)
        }),
        10,
        1,
    );

    let registry = FilterRegistry::new(context, bus.clone());
    registry.initialize();

    assert_eq!(bus.apply_filters("shop/title", vec![Value::from("hi")]), Value::from("HI"));
}
