//! Two tabs of the same origin sharing one theme preference.
//!
//! Run with `RUST_LOG=debug` to follow the synchronization.

use dusk::prelude::*;

fn open_tab(
    name: &'static str,
    config: &ThemeConfig,
    origin: &MemoryOrigin,
    sensor: &ManualSensor,
    queue: &TaskQueue,
) -> anyhow::Result<(ThemeManager, VirtualDocument, Subscription)> {
    let document = VirtualDocument::new();

    // First paint.
    ScriptSnapshot::from_config(config).run(&origin.open(), sensor, &document);
    println!("[{}] early: {}", name, document.render_open_tag());

    let host = ThemeHost::new(origin.open(), sensor.clone(), document.clone(), queue.clone());
    let manager = ThemeManager::new(config.clone(), host)?;
    let subscription = manager.listen(Box::new(move |state: &ThemeState| {
        println!("[{}] theme={} resolved={}", name, state.theme, state.resolved_theme);
    }));
    manager.mount();

    Ok((manager, document, subscription))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = ThemeConfig::from_env_or_default()
        .with_transition_suppression(true)
        .with_nonce("demo");
    let origin = MemoryOrigin::new();
    let sensor = ManualSensor::new(ColorScheme::Light);
    let queue = TaskQueue::new();

    let first = open_tab("a", &config, &origin, &sensor, &queue)?;
    let second = open_tab("b", &config, &origin, &sensor, &queue)?;

    println!("{}", first.0.inline_script()?);

    log::info!("tab a selects dark");
    first.0.set_theme("dark");
    queue.run_until_idle(8);
    println!("[a] {}", first.1.render_open_tag());
    println!("[b] {}", second.1.render_open_tag());

    log::info!("tab b returns to the system preference");
    second.0.set_theme(SYSTEM_THEME);
    queue.run_until_idle(8);

    log::info!("the system switches to dark");
    sensor.set(ColorScheme::Dark);
    queue.run_until_idle(8);
    println!("[a] {}", first.1.render_open_tag());
    println!("[b] {}", second.1.render_open_tag());

    println!("{}", serde_json::to_string_pretty(&second.0.state())?);

    first.0.unmount();
    second.0.unmount();
    Ok(())
}
