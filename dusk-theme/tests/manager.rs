use dusk_core::document::{Document, VirtualDocument};
use dusk_core::platform::{ColorScheme, ManualSensor};
use dusk_core::tasks::TaskQueue;
use dusk_services::memory::{MemoryOrigin, MemoryStore};
use dusk_services::{PreferenceStore, StoreError};
use dusk_theme::config::{AttributeTarget, ThemeConfig, SYSTEM_THEME};
use dusk_theme::manager::{Lifecycle, ThemeHost, ThemeManager, ThemeUpdate};
use dusk_theme::projector::TRANSITION_SUPPRESSION_CSS;
use dusk_theme::ThemeError;
use std::cell::RefCell;
use std::rc::Rc;
use tempfile::TempDir;

struct Tab {
    manager: ThemeManager,
    document: VirtualDocument,
    queue: TaskQueue,
}

fn open_tab(origin: &MemoryOrigin, sensor: &ManualSensor, config: ThemeConfig) -> Tab {
    let document = VirtualDocument::new();
    let queue = TaskQueue::new();
    let host = ThemeHost::new(origin.open(), sensor.clone(), document.clone(), queue.clone());
    let manager = ThemeManager::new(config, host).unwrap();
    Tab {
        manager,
        document,
        queue,
    }
}

fn mounted(config: ThemeConfig) -> (Tab, MemoryOrigin, ManualSensor) {
    let origin = MemoryOrigin::new();
    let sensor = ManualSensor::new(ColorScheme::Light);
    let tab = open_tab(&origin, &sensor, config);
    tab.manager.mount();
    (tab, origin, sensor)
}

#[test]
fn test_construction_does_not_project() {
    let origin = MemoryOrigin::new();
    let sensor = ManualSensor::new(ColorScheme::Dark);
    let tab = open_tab(&origin, &sensor, ThemeConfig::new());

    assert_eq!(tab.manager.lifecycle(), Lifecycle::Created);
    assert_eq!(tab.document.mutations(), 0);
    assert_eq!(tab.manager.state().theme, SYSTEM_THEME);
    assert_eq!(tab.manager.state().resolved_theme, "dark");
}

#[test]
fn test_set_theme_converges() {
    let (tab, origin, _sensor) = mounted(ThemeConfig::new());

    tab.manager.set_theme("dark");

    let state = tab.manager.state();
    assert_eq!(state.theme, "dark");
    assert_eq!(state.resolved_theme, "dark");
    assert_eq!(origin.peek("theme").as_deref(), Some("dark"));
    assert_eq!(tab.document.attribute("data-theme").as_deref(), Some("dark"));
    assert_eq!(tab.document.style_property("color-scheme").as_deref(), Some("dark"));
    assert_eq!(tab.document.attribute("aria-live").as_deref(), Some("polite"));
}

#[test]
fn test_functional_update_sees_current_theme() {
    let (tab, _origin, _sensor) = mounted(ThemeConfig::new());
    let seen = Rc::new(RefCell::new(String::new()));

    let sink = seen.clone();
    tab.manager.set_theme(ThemeUpdate::apply(move |current| {
        *sink.borrow_mut() = current.to_string();
        "dark".to_string()
    }));

    assert_eq!(*seen.borrow(), SYSTEM_THEME);
    assert_eq!(tab.manager.theme(), "dark");
}

#[test]
fn test_system_preference_changes_follow_system_theme() {
    let (tab, _origin, sensor) = mounted(ThemeConfig::new());
    sensor.set(ColorScheme::Dark);
    assert_eq!(tab.manager.state().resolved_theme, "dark");
    assert_eq!(tab.document.attribute("data-theme").as_deref(), Some("dark"));

    sensor.set(ColorScheme::Light);
    assert_eq!(tab.manager.state().resolved_theme, "light");
    assert_eq!(tab.document.attribute("data-theme").as_deref(), Some("light"));
}

#[test]
fn test_system_preference_ignored_for_explicit_theme() {
    let (tab, _origin, sensor) = mounted(ThemeConfig::new());
    tab.manager.set_theme("light");
    let mutations = tab.document.mutations();

    sensor.set(ColorScheme::Dark);

    let state = tab.manager.state();
    assert_eq!(state.resolved_theme, "light");
    assert_eq!(state.system_theme, Some(ColorScheme::Dark));
    assert_eq!(tab.document.mutations(), mutations);
}

#[test]
fn test_forced_theme_wins_everywhere() {
    let (tab, origin, sensor) = mounted(ThemeConfig::new().with_forced_theme("dark"));
    assert_eq!(tab.document.attribute("data-theme").as_deref(), Some("dark"));

    tab.manager.set_theme("light");
    sensor.set(ColorScheme::Light);

    let state = tab.manager.state();
    assert_eq!(state.theme, "light");
    assert_eq!(state.resolved_theme, "dark");
    assert_eq!(state.forced_theme.as_deref(), Some("dark"));
    assert_eq!(origin.peek("theme").as_deref(), Some("light"));
    assert_eq!(tab.document.attribute("data-theme").as_deref(), Some("dark"));
}

#[test]
fn test_cross_tab_adoption_without_feedback() {
    let origin = MemoryOrigin::new();
    let sensor = ManualSensor::new(ColorScheme::Light);
    let first = open_tab(&origin, &sensor, ThemeConfig::new());
    let second = open_tab(&origin, &sensor, ThemeConfig::new());
    first.manager.mount();
    second.manager.mount();

    first.manager.set_theme("dark");

    assert_eq!(second.manager.state().resolved_theme, "dark");
    assert_eq!(second.document.attribute("data-theme").as_deref(), Some("dark"));
    // Only the first tab wrote.
    assert_eq!(origin.write_count(), 1);
}

#[test]
fn test_external_change_from_plain_store() {
    let (tab, origin, _sensor) = mounted(ThemeConfig::new());
    let other_tab = origin.open();

    other_tab.write("theme", "dark").unwrap();
    assert_eq!(tab.manager.theme(), "dark");
    assert_eq!(origin.write_count(), 1);

    other_tab.write("unrelated", "x").unwrap();
    assert_eq!(tab.manager.theme(), "dark");
}

#[test]
fn test_unusable_external_value_falls_back_to_default() {
    let config = ThemeConfig::new().with_default_theme("light");
    let (tab, origin, _sensor) = mounted(config);
    let other_tab = origin.open();

    other_tab.write("theme", "dark").unwrap();
    other_tab.write("theme", "   ").unwrap();
    assert_eq!(tab.manager.theme(), "light");

    other_tab.write("theme", "dark").unwrap();
    other_tab.remove("theme").unwrap();
    assert_eq!(tab.manager.theme(), "light");
    assert_eq!(tab.document.attribute("data-theme").as_deref(), Some("light"));
}

#[test]
fn test_class_mode_with_mapping() {
    let config = ThemeConfig::new()
        .with_attribute(AttributeTarget::Class)
        .with_themes(["light", "dark"])
        .with_value("dark", "theme-dark");
    let (tab, _origin, _sensor) = mounted(config);
    tab.document.add_class("light");

    tab.manager.set_theme("dark");

    assert!(tab.document.has_class("theme-dark"));
    assert!(!tab.document.has_class("light"));
    assert!(!tab.document.has_class("dark"));
}

#[test]
fn test_data_attribute_cleared_for_unmapped_theme() {
    let config = ThemeConfig::new().with_value("dark", "theme-dark");
    let (tab, _origin, _sensor) = mounted(config);

    tab.manager.set_theme("dark");
    assert_eq!(tab.document.attribute("data-theme").as_deref(), Some("theme-dark"));

    tab.manager.set_theme("light");
    assert_eq!(tab.document.attribute("data-theme"), None);
}

#[test]
fn test_multiple_targets() {
    let config = ThemeConfig::new().with_attributes([
        AttributeTarget::Class,
        AttributeTarget::Data("data-theme".into()),
        AttributeTarget::Data("data-mode".into()),
    ]);
    let (tab, _origin, _sensor) = mounted(config);

    tab.manager.set_theme("dark");
    assert!(tab.document.has_class("dark"));
    assert_eq!(tab.document.attribute("data-theme").as_deref(), Some("dark"));
    assert_eq!(tab.document.attribute("data-mode").as_deref(), Some("dark"));
}

#[test]
fn test_transition_suppression_removed_after_one_tick() {
    let (tab, _origin, _sensor) = mounted(ThemeConfig::new().with_transition_suppression(true));
    tab.queue.run_until_idle(4);

    tab.manager.set_theme("dark");
    assert_eq!(tab.document.stylesheets(), vec![TRANSITION_SUPPRESSION_CSS]);

    assert_eq!(tab.queue.run_tick(), 1);
    assert!(tab.document.stylesheets().is_empty());
}

#[test]
fn test_unmount_stops_projection() {
    let (tab, origin, sensor) = mounted(ThemeConfig::new());
    let other_tab = origin.open();
    tab.manager.unmount();
    let snapshot = tab.document.snapshot();
    let mutations = tab.document.mutations();

    sensor.set(ColorScheme::Dark);
    other_tab.write("theme", "dark").unwrap();
    tab.manager.set_theme("light");

    assert_eq!(tab.document.snapshot(), snapshot);
    assert_eq!(tab.document.mutations(), mutations);
    assert_eq!(tab.manager.theme(), "light");
    assert_eq!(origin.peek("theme").as_deref(), Some("light"));
    assert_eq!(tab.manager.lifecycle(), Lifecycle::Unmounted);

    // Re-mounting is refused.
    tab.manager.mount();
    assert_eq!(tab.manager.lifecycle(), Lifecycle::Unmounted);
    assert_eq!(tab.document.mutations(), mutations);
}

#[test]
fn test_store_failure_still_converges() {
    let origin = MemoryOrigin::new();
    let sensor = ManualSensor::new(ColorScheme::Light);
    origin.set_available(false);
    let tab = open_tab(&origin, &sensor, ThemeConfig::new());
    tab.manager.mount();

    tab.manager.set_theme("dark");

    assert_eq!(tab.manager.state().resolved_theme, "dark");
    assert_eq!(tab.document.attribute("data-theme").as_deref(), Some("dark"));
    assert_eq!(origin.peek("theme"), None);
}

#[test]
fn test_stored_theme_is_restored() {
    let origin = MemoryOrigin::new();
    origin.open().write("theme", "sepia").unwrap();
    let sensor = ManualSensor::default();

    let tab = open_tab(&origin, &sensor, ThemeConfig::new());
    tab.manager.mount();

    assert_eq!(tab.manager.state().resolved_theme, "sepia");
    assert_eq!(tab.document.attribute("data-theme").as_deref(), Some("sepia"));
    // Not canonical, and the default ("system") is not either.
    assert_eq!(tab.document.style_property("color-scheme"), None);
}

#[test]
fn test_mount_sees_sensor_change_after_construction() {
    let origin = MemoryOrigin::new();
    let sensor = ManualSensor::new(ColorScheme::Light);
    let tab = open_tab(&origin, &sensor, ThemeConfig::new());

    sensor.set(ColorScheme::Dark);
    tab.manager.mount();

    assert_eq!(tab.manager.state().resolved_theme, "dark");
    assert_eq!(tab.manager.state().system_theme, Some(ColorScheme::Dark));
    assert_eq!(tab.document.attribute("data-theme").as_deref(), Some("dark"));

    // Subscribed from here on.
    sensor.set(ColorScheme::Light);
    assert_eq!(tab.document.attribute("data-theme").as_deref(), Some("light"));
}

#[test]
fn test_mount_sees_store_write_after_construction() {
    let origin = MemoryOrigin::new();
    let sensor = ManualSensor::new(ColorScheme::Light);
    let tab = open_tab(&origin, &sensor, ThemeConfig::new());

    origin.open().write("theme", "dark").unwrap();
    tab.manager.mount();

    assert_eq!(tab.manager.theme(), "dark");
    assert_eq!(tab.document.attribute("data-theme").as_deref(), Some("dark"));

    // Subscribed from here on.
    origin.open().write("theme", "light").unwrap();
    assert_eq!(tab.document.attribute("data-theme").as_deref(), Some("light"));
}

#[test]
fn test_set_theme_before_mount_survives_unavailable_store() {
    let origin = MemoryOrigin::new();
    origin.set_available(false);
    let sensor = ManualSensor::new(ColorScheme::Light);
    let tab = open_tab(&origin, &sensor, ThemeConfig::new());

    tab.manager.set_theme("dark");
    tab.manager.mount();

    assert_eq!(tab.manager.theme(), "dark");
    assert_eq!(tab.document.attribute("data-theme").as_deref(), Some("dark"));
}

#[test]
fn test_set_theme_ignores_unusable_values() {
    let (tab, origin, _sensor) = mounted(ThemeConfig::new());
    tab.manager.set_theme("dark");
    let writes = origin.write_count();

    tab.manager.set_theme("");
    tab.manager.set_theme("   ");
    tab.manager.set_theme(ThemeUpdate::apply(|_| String::new()));

    assert_eq!(tab.manager.theme(), "dark");
    assert_eq!(origin.write_count(), writes);
    assert_eq!(origin.peek("theme").as_deref(), Some("dark"));
    assert_eq!(tab.document.attribute("data-theme").as_deref(), Some("dark"));
}

#[test]
fn test_file_store_host() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("preferences.toml");
    let document = VirtualDocument::new();
    let (host, store) = ThemeHost::with_file_store(
        Some(path.as_path()),
        ManualSensor::new(ColorScheme::Light),
        document.clone(),
        TaskQueue::new(),
    )
    .unwrap();
    let manager = ThemeManager::new(ThemeConfig::new(), host).unwrap();
    manager.mount();

    manager.set_theme("dark");
    assert_eq!(store.read("theme").as_deref(), Some("dark"));
    assert!(std::fs::read_to_string(&path).unwrap().contains("dark"));
    assert_eq!(document.attribute("data-theme").as_deref(), Some("dark"));
}

#[test]
fn test_file_store_host_reports_open_failure() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("preferences.toml");
    std::fs::write(&path, "theme = [").unwrap();

    let result = ThemeHost::with_file_store(
        Some(path.as_path()),
        ManualSensor::default(),
        VirtualDocument::new(),
        TaskQueue::new(),
    );
    assert!(matches!(
        result,
        Err(ThemeError::Store(StoreError::Parse { .. }))
    ));
}

#[test]
fn test_read_model_listeners() {
    let (tab, _origin, sensor) = mounted(ThemeConfig::new());
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let _subscription = tab
        .manager
        .listen(Box::new(move |state| sink.borrow_mut().push(state.resolved_theme.clone())));

    tab.manager.set_theme("dark");
    tab.manager.set_theme("dark");
    tab.manager.set_theme(SYSTEM_THEME);
    sensor.set(ColorScheme::Dark);

    assert_eq!(*seen.borrow(), vec!["dark", "light", "dark"]);
}

#[test]
fn test_listener_may_set_theme() {
    let (tab, _origin, _sensor) = mounted(ThemeConfig::new());
    let manager = tab.manager.clone();
    let _subscription = tab.manager.listen(Box::new(move |state| {
        if state.theme == "sepia" {
            manager.set_theme("dark");
        }
    }));

    tab.manager.set_theme("sepia");
    assert_eq!(tab.manager.theme(), "dark");
    assert_eq!(tab.document.attribute("data-theme").as_deref(), Some("dark"));
}

#[test]
fn test_read_model_serializes_camel_case() {
    let config = ThemeConfig::new().with_themes(["light", "dark"]);
    let (tab, _origin, _sensor) = mounted(config);
    let json = serde_json::to_value(tab.manager.state()).unwrap();

    assert_eq!(
        json,
        serde_json::json!({
            "theme": "system",
            "resolvedTheme": "light",
            "systemTheme": "light",
            "forcedTheme": null,
            "themes": ["light", "dark", "system"],
        })
    );
}

#[test]
fn test_system_theme_hidden_when_disabled() {
    let (tab, _origin, _sensor) = mounted(ThemeConfig::new().with_system(false));
    let state = tab.manager.state();
    assert_eq!(state.system_theme, None);
    assert_eq!(state.theme, "light");
    assert_eq!(state.themes, vec!["light", "dark"]);
}

#[test]
fn test_independent_instances() {
    let first = mounted(ThemeConfig::new());
    let second = mounted(ThemeConfig::new());

    first.0.manager.set_theme("dark");
    assert_eq!(second.0.manager.theme(), SYSTEM_THEME);
}

#[test]
fn test_dropping_manager_releases_subscriptions() {
    let origin = MemoryOrigin::new();
    let sensor = ManualSensor::new(ColorScheme::Light);
    let tab = open_tab(&origin, &sensor, ThemeConfig::new());
    tab.manager.mount();
    let document = tab.document.clone();
    drop(tab);

    let mutations = document.mutations();
    sensor.set(ColorScheme::Dark);
    assert_eq!(document.mutations(), mutations);
}

#[test]
fn test_plain_store_handle_is_usable_directly() {
    let store = MemoryStore::new();
    let document = VirtualDocument::new();
    let host = ThemeHost::new(store, ManualSensor::default(), document.clone(), TaskQueue::new());
    let manager = ThemeManager::new(ThemeConfig::new().with_storage_key("site"), host).unwrap();
    manager.mount();
    manager.set_theme("dark");
    assert_eq!(manager.state().theme, "dark");
}

#[test]
fn test_invalid_config_is_rejected() {
    let host = ThemeHost::new(
        MemoryStore::new(),
        ManualSensor::default(),
        VirtualDocument::new(),
        TaskQueue::new(),
    );
    assert!(ThemeManager::new(ThemeConfig::new().with_forced_theme(SYSTEM_THEME), host).is_err());
}
