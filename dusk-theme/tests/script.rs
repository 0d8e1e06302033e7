use dusk_core::document::{Document, VirtualDocument};
use dusk_core::platform::{ColorScheme, ManualSensor};
use dusk_core::tasks::TaskQueue;
use dusk_services::memory::MemoryOrigin;
use dusk_services::PreferenceStore;
use dusk_theme::config::{AttributeTarget, ThemeConfig};
use dusk_theme::manager::{ThemeHost, ThemeManager};
use dusk_theme::script::{ScriptSnapshot, EARLY_SCRIPT_SOURCE};
use proptest::prelude::*;

fn configs() -> Vec<ThemeConfig> {
    vec![
        ThemeConfig::new(),
        ThemeConfig::new().with_system(false),
        ThemeConfig::new().with_forced_theme("dark"),
        ThemeConfig::new()
            .with_attribute(AttributeTarget::Class)
            .with_value("dark", "theme-dark"),
        ThemeConfig::new()
            .with_attributes([AttributeTarget::Class, AttributeTarget::Data("data-mode".into())])
            .with_themes(["light", "dark", "sepia"])
            .with_default_theme("sepia"),
    ]
}

#[test]
fn test_first_paint_matches_mount() {
    for config in configs() {
        for stored in [None, Some("dark"), Some("light"), Some("system"), Some("sepia")] {
            for system in [ColorScheme::Light, ColorScheme::Dark] {
                let origin = MemoryOrigin::new();
                if let Some(stored) = stored {
                    origin.open().write(config.storage_key(), stored).unwrap();
                }
                let sensor = ManualSensor::new(system);
                let document = VirtualDocument::new();

                let early = ScriptSnapshot::from_config(&config).run(
                    &origin.open(),
                    &sensor,
                    &document,
                );
                let after_early = document.snapshot();

                let host =
                    ThemeHost::new(origin.open(), sensor.clone(), document.clone(), TaskQueue::new());
                let manager = ThemeManager::new(config.clone(), host).unwrap();
                manager.mount();

                assert_eq!(early, manager.state().resolved_theme, "{:?} {:?}", config, stored);

                // Mount only adds the live-region hint.
                let mut after_mount = document.snapshot();
                after_mount.attributes.shift_remove("aria-live");
                assert_eq!(after_mount, after_early, "{:?} {:?}", config, stored);
            }
        }
    }
}

#[test]
fn test_early_pass_is_quiet() {
    let origin = MemoryOrigin::new();
    let document = VirtualDocument::new();
    let config = ThemeConfig::new().with_transition_suppression(true);

    ScriptSnapshot::from_config(&config).run(
        &origin.open(),
        &ManualSensor::new(ColorScheme::Dark),
        &document,
    );

    assert_eq!(document.attribute("data-theme").as_deref(), Some("dark"));
    assert_eq!(document.attribute("aria-live"), None);
    assert!(document.stylesheets().is_empty());
    assert_eq!(document.recomputations(), 0);
}

#[test]
fn test_early_pass_with_unavailable_store_uses_default() {
    let origin = MemoryOrigin::new();
    origin.open().write("theme", "dark").unwrap();
    origin.set_available(false);
    let document = VirtualDocument::new();
    let config = ThemeConfig::new().with_system(false);

    let resolved = ScriptSnapshot::from_config(&config).run(
        &origin.open(),
        &ManualSensor::new(ColorScheme::Dark),
        &document,
    );
    assert_eq!(resolved, "light");
}

#[test]
fn test_inline_script_carries_nonce_and_payload() {
    let config = ThemeConfig::new()
        .with_value("dark", "theme-dark")
        .with_nonce("n\"once");
    let host = ThemeHost::new(
        MemoryOrigin::new().open(),
        ManualSensor::default(),
        VirtualDocument::new(),
        TaskQueue::new(),
    );
    let manager = ThemeManager::new(config.clone(), host).unwrap();

    let tag = manager.inline_script().unwrap();
    let prefix = format!("<script nonce=\"n&quot;once\">{}(", EARLY_SCRIPT_SOURCE);
    assert!(tag.starts_with(&prefix));

    let payload = tag
        .strip_prefix(&prefix)
        .and_then(|rest| rest.strip_suffix(")</script>"))
        .unwrap();
    let snapshot: ScriptSnapshot = serde_json::from_str(payload).unwrap();
    assert_eq!(snapshot, ScriptSnapshot::from_config(&config));
}

proptest! {
    #[test]
    fn applying_twice_equals_applying_once(
        theme in prop_oneof![Just("light"), Just("dark"), Just("system"), Just("sepia")],
        dark in any::<bool>(),
        class_mode in any::<bool>(),
    ) {
        let config = if class_mode {
            ThemeConfig::new().with_attribute(AttributeTarget::Class).with_value("dark", "theme-dark")
        } else {
            ThemeConfig::new()
        };
        let origin = MemoryOrigin::new();
        origin.open().write("theme", theme).unwrap();
        let sensor = ManualSensor::new(if dark { ColorScheme::Dark } else { ColorScheme::Light });
        let snapshot = ScriptSnapshot::from_config(&config);
        let document = VirtualDocument::new();

        snapshot.run(&origin.open(), &sensor, &document);
        let once = document.snapshot();
        let mutations = document.mutations();
        snapshot.run(&origin.open(), &sensor, &document);

        prop_assert_eq!(document.snapshot(), once);
        prop_assert_eq!(document.mutations(), mutations);
    }
}
