//! Options combined with declared filters.

use std::sync::{Arc, Mutex};

use framekit_core::traits::{FilterTarget, HookBus};
use framekit_core::types::Value;
use framekit_option::{MemoryOptionBackend, OptionStore};

use crate::helpers::TestApp;

struct Upper;

impl FilterTarget for Upper {
    fn is_filter_callable(&self, method: &str) -> bool {
        method == "upper"
    }

    fn filter_callback(&self, _method: &str, args: Vec<Value>) -> Value {
        match args.into_iter().next() {
            Some(Value::String(s)) => Value::from(s.to_uppercase()),
            other => other.unwrap_or_default(),
        }
    }
}

#[tokio::test]
async fn test_option_reads_pass_through_declared_filters() {
    let app = TestApp::new();
    app.plugin_file("filter.toml", "[upper.\"${prefix}get_option\"]\n0 = \"upper\"\n");

    let (context, bus, _registry) = app.boot();
    context.register_target("upper", Arc::new(Upper));

    let store = OptionStore::new(
        Arc::new(MemoryOptionBackend::new()),
        bus,
        context.slug().clone(),
        &app.config.options,
    );

    assert!(store.set("greeting", "hello", false).await);
    assert_eq!(store.get("greeting", "", false).await, Value::from("HELLO"));
    assert_eq!(store.get("count", 3, false).await, Value::from(3));
}

#[tokio::test]
async fn test_activation_lifecycle_fires_actions() {
    let app = TestApp::new();
    let (context, bus, _registry) = app.boot();

    let changed = Arc::new(Mutex::new(Vec::new()));
    let seen = changed.clone();
    bus.add_filter(
        "shop/changed_option",
        Arc::new(move |args: &[Value]| {
            seen.lock().expect("lock").push(args[0].to_string());
            Value::Null
        }),
        10,
        1,
    );

    let store = OptionStore::new(
        Arc::new(MemoryOptionBackend::new()),
        bus,
        context.slug().clone(),
        &app.config.options,
    );

    store.app_activated("1.0.0").await;
    assert!(store.is_app_activated().await);
    assert_eq!(
        *changed.lock().expect("lock"),
        vec!["__app_activated".to_string(), "last_upgrade_version".to_string()]
    );

    store.uninstall().await;
    assert!(!store.is_app_activated().await);
}
