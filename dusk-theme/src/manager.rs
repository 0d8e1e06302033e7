//! # Theme Manager
//!
//! [ThemeManager] owns the live theme state and keeps it converged with the
//! three sources of truth: explicit [ThemeManager::set_theme] calls, the
//! preference store (including changes made by other tabs or processes), and
//! the system color-scheme preference.
//!
//! ## Lifecycle
//!
//! - **Created**: [ThemeManager::new] reads the store and the sensor. Nothing
//!   is projected and nothing is subscribed yet.
//! - **Mounted**: [ThemeManager::mount] subscribes to the sensor and the store,
//!   reads both again to pick up changes made since construction, then
//!   projects the current theme.
//! - **Unmounted**: [ThemeManager::unmount] drops every subscription. The
//!   manager keeps accepting [ThemeManager::set_theme] (state and store are
//!   still updated) but never touches the document again.
//!
//! ## Example
//!
//! ```rust
//! use dusk_core::document::{Document, VirtualDocument};
//! use dusk_core::platform::{ColorScheme, ManualSensor};
//! use dusk_core::tasks::TaskQueue;
//! use dusk_services::memory::MemoryStore;
//! use dusk_theme::config::ThemeConfig;
//! use dusk_theme::manager::{ThemeHost, ThemeManager};
//!
//! let document = VirtualDocument::new();
//! let host = ThemeHost::new(
//!     MemoryStore::new(),
//!     ManualSensor::new(ColorScheme::Dark),
//!     document.clone(),
//!     TaskQueue::new(),
//! );
//!
//! let manager = ThemeManager::new(ThemeConfig::new(), host).unwrap();
//! manager.mount();
//! assert_eq!(manager.state().resolved_theme, "dark");
//! assert_eq!(document.attribute("data-theme").as_deref(), Some("dark"));
//!
//! manager.set_theme("light");
//! assert_eq!(document.attribute("data-theme").as_deref(), Some("light"));
//! ```

use dusk_core::document::Document;
use dusk_core::platform::{ColorScheme, SystemPreferenceSensor};
use dusk_core::signal::{Listener, Signal, StateSignal, Subscription};
use dusk_core::tasks::Scheduler;
#[cfg(not(target_arch = "wasm32"))]
use dusk_services::file::FileStore;
use dusk_services::{PreferenceStore, StorageEvent};
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::fmt;
#[cfg(not(target_arch = "wasm32"))]
use std::path::Path;
use std::rc::{Rc, Weak};

use crate::config::{ThemeConfig, SYSTEM_THEME};
use crate::error::ThemeResult;
use crate::projection::Projection;
use crate::projector::DomProjector;
use crate::script::ScriptSnapshot;
use crate::theme_resolver::{available_themes, initial_theme, resolve, usable_theme};

/// The host boundaries a [ThemeManager] runs against.
#[derive(Clone)]
pub struct ThemeHost {
    /// Durable preference storage.
    pub store: Rc<dyn PreferenceStore>,
    /// System color-scheme preference.
    pub sensor: Rc<dyn SystemPreferenceSensor>,
    /// The document the theme is projected onto.
    pub document: Rc<dyn Document>,
    /// Defers the removal of the transition-suppression stylesheet.
    pub scheduler: Rc<dyn Scheduler>,
}

impl ThemeHost {
    /// Bundle the host boundaries.
    pub fn new(
        store: impl PreferenceStore + 'static,
        sensor: impl SystemPreferenceSensor + 'static,
        document: impl Document + 'static,
        scheduler: impl Scheduler + 'static,
    ) -> Self {
        Self {
            store: Rc::new(store),
            sensor: Rc::new(sensor),
            document: Rc::new(document),
            scheduler: Rc::new(scheduler),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl ThemeHost {
    /// Bundle a host around a [FileStore] at `path`, or at the default
    /// location when `path` is `None`.
    ///
    /// The store is returned as well so the caller can drive
    /// [FileStore::poll_changes].
    pub fn with_file_store(
        path: Option<&Path>,
        sensor: impl SystemPreferenceSensor + 'static,
        document: impl Document + 'static,
        scheduler: impl Scheduler + 'static,
    ) -> ThemeResult<(Self, Rc<FileStore>)> {
        let store = Rc::new(match path {
            Some(path) => FileStore::open(path)?,
            None => FileStore::open_default()?,
        });
        let host = Self {
            store: store.clone(),
            sensor: Rc::new(sensor),
            document: Rc::new(document),
            scheduler: Rc::new(scheduler),
        };
        Ok((host, store))
    }
}

impl fmt::Debug for ThemeHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeHost").finish_non_exhaustive()
    }
}

/// A theme change: a literal name, or a function of the current theme.
pub enum ThemeUpdate {
    /// Switch to this theme.
    Value(String),
    /// Compute the new theme from the current one (`"system"` if none).
    Apply(Box<dyn FnOnce(&str) -> String>),
}

impl ThemeUpdate {
    /// A functional update.
    ///
    /// ```rust
    /// use dusk_theme::manager::ThemeUpdate;
    ///
    /// let toggle = ThemeUpdate::apply(|current| {
    ///     if current == "dark" { "light" } else { "dark" }.to_string()
    /// });
    /// # let _ = toggle;
    /// ```
    pub fn apply(op: impl FnOnce(&str) -> String + 'static) -> Self {
        Self::Apply(Box::new(op))
    }

    fn resolve(self, current: &str) -> String {
        match self {
            Self::Value(theme) => theme,
            Self::Apply(op) => op(current),
        }
    }
}

impl From<&str> for ThemeUpdate {
    fn from(theme: &str) -> Self {
        Self::Value(theme.to_string())
    }
}

impl From<String> for ThemeUpdate {
    fn from(theme: String) -> Self {
        Self::Value(theme)
    }
}

impl From<ColorScheme> for ThemeUpdate {
    fn from(scheme: ColorScheme) -> Self {
        Self::Value(scheme.as_str().to_string())
    }
}

impl fmt::Debug for ThemeUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(theme) => f.debug_tuple("Value").field(theme).finish(),
            Self::Apply(_) => f.write_str("Apply(..)"),
        }
    }
}

/// The public read model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeState {
    /// The requested theme. May be `"system"`.
    pub theme: String,
    /// The projected theme.
    pub resolved_theme: String,
    /// The system preference, if system handling is enabled.
    pub system_theme: Option<ColorScheme>,
    /// The forced theme, if any.
    pub forced_theme: Option<String>,
    /// The catalog, plus `"system"` when system handling is enabled.
    pub themes: Vec<String>,
}

/// Where a manager is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Constructed, not yet mounted.
    Created,
    /// Subscribed and projecting.
    Mounted,
    /// Terminal.
    Unmounted,
}

#[derive(Debug, Clone)]
struct LiveState {
    requested: String,
    system: ColorScheme,
}

struct Inner {
    config: ThemeConfig,
    host: ThemeHost,
    projector: DomProjector,
    live: RefCell<LiveState>,
    read_model: StateSignal<ThemeState>,
    lifecycle: Cell<Lifecycle>,
    subscriptions: RefCell<Vec<Subscription>>,
    last_projection: RefCell<Option<Projection>>,
}

/// The theme synchronization controller.
///
/// Clones share the same state. Not `Send`: all work happens on one thread.
#[derive(Clone)]
pub struct ThemeManager {
    inner: Rc<Inner>,
}

impl ThemeManager {
    /// Create a manager. Reads the store (falling back to the default theme)
    /// and the system preference; projects nothing until [ThemeManager::mount].
    pub fn new(config: ThemeConfig, host: ThemeHost) -> ThemeResult<Self> {
        config.validate()?;

        let stored = host.store.read(config.storage_key());
        let live = LiveState {
            requested: initial_theme(stored.as_deref(), &config),
            system: host.sensor.current(),
        };
        let read_model = StateSignal::new(read_model(&config, &live));
        let projector = DomProjector::new(host.document.clone(), host.scheduler.clone());

        log::debug!(
            "Theme manager created with theme '{}' (system {})",
            live.requested,
            live.system
        );
        Ok(Self {
            inner: Rc::new(Inner {
                config,
                host,
                projector,
                live: RefCell::new(live),
                read_model,
                lifecycle: Cell::new(Lifecycle::Created),
                subscriptions: RefCell::new(Vec::new()),
                last_projection: RefCell::new(None),
            }),
        })
    }

    /// Subscribe to the sensor and the store, re-read both, then project.
    pub fn mount(&self) {
        if self.inner.lifecycle.get() != Lifecycle::Created {
            log::warn!(
                "Ignoring mount of a theme manager in state {:?}",
                self.inner.lifecycle.get()
            );
            return;
        }

        let weak = Rc::downgrade(&self.inner);
        let on_system = self.inner.host.sensor.subscribe(Box::new(move |scheme| {
            if let Some(manager) = Self::upgrade(&weak) {
                manager.on_system_change(*scheme);
            }
        }));

        let weak = Rc::downgrade(&self.inner);
        let on_storage = self.inner.host.store.subscribe(Box::new(move |event| {
            if let Some(manager) = Self::upgrade(&weak) {
                manager.on_storage_event(event);
            }
        }));

        self.inner
            .subscriptions
            .borrow_mut()
            .extend([on_system, on_storage]);
        self.inner.lifecycle.set(Lifecycle::Mounted);
        self.refresh();
        log::debug!("Theme manager mounted");

        self.project();
        self.publish();
    }

    /// Drop every subscription. No projection happens afterwards.
    pub fn unmount(&self) {
        if self.inner.lifecycle.replace(Lifecycle::Unmounted) == Lifecycle::Unmounted {
            return;
        }
        let subscriptions = std::mem::take(&mut *self.inner.subscriptions.borrow_mut());
        for subscription in &subscriptions {
            subscription.unsubscribe();
        }
        log::debug!("Theme manager unmounted");
    }

    /// Change the requested theme.
    ///
    /// The new value is written to the store (failures are logged, the
    /// in-memory state stays authoritative) and projected if mounted.
    /// Empty and whitespace-only values are ignored.
    pub fn set_theme(&self, update: impl Into<ThemeUpdate>) {
        let current = self.inner.live.borrow().requested.clone();
        let current = if current.is_empty() {
            SYSTEM_THEME.to_string()
        } else {
            current
        };
        let theme = update.into().resolve(&current);
        if usable_theme(Some(theme.as_str())).is_none() {
            log::warn!("Ignoring unusable theme {:?}", theme);
            return;
        }

        if let Err(e) = self
            .inner
            .host
            .store
            .write(self.inner.config.storage_key(), &theme)
        {
            log::error!("Failed to persist theme '{}': {}", theme, e);
        }

        log::debug!("Theme set to '{}'", theme);
        self.inner.live.borrow_mut().requested = theme;
        self.project();
        self.publish();
    }

    /// The current read model.
    pub fn state(&self) -> ThemeState {
        self.inner.read_model.get_cloned()
    }

    /// The requested theme.
    pub fn theme(&self) -> String {
        self.inner.live.borrow().requested.clone()
    }

    /// The projected theme.
    pub fn resolved_theme(&self) -> String {
        self.inner.read_model.get().resolved_theme.clone()
    }

    /// Observe read model changes.
    pub fn listen(&self, listener: Listener<ThemeState>) -> Subscription {
        self.inner.read_model.listen(listener)
    }

    /// The last projection written to the document.
    pub fn projection(&self) -> Option<Projection> {
        self.inner.last_projection.borrow().clone()
    }

    /// The configuration.
    pub fn config(&self) -> &ThemeConfig {
        &self.inner.config
    }

    /// The lifecycle state.
    pub fn lifecycle(&self) -> Lifecycle {
        self.inner.lifecycle.get()
    }

    /// The early projection snapshot for this configuration.
    pub fn script_snapshot(&self) -> ScriptSnapshot {
        ScriptSnapshot::from_config(&self.inner.config)
    }

    /// The inline early script for server-side output, carrying the
    /// configured nonce.
    pub fn inline_script(&self) -> ThemeResult<String> {
        self.script_snapshot()
            .to_inline_script(self.inner.config.nonce())
    }

    fn upgrade(weak: &Weak<Inner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    /// Catch up with sensor and store changes made before the subscriptions
    /// existed. A usable stored value replaces the requested theme.
    fn refresh(&self) {
        let system = self.inner.host.sensor.current();
        let stored = self.inner.host.store.read(self.inner.config.storage_key());

        let mut live = self.inner.live.borrow_mut();
        live.system = system;
        if let Some(theme) = usable_theme(stored.as_deref()) {
            live.requested = theme.to_string();
        }
    }

    fn on_system_change(&self, scheme: ColorScheme) {
        let requested = {
            let mut live = self.inner.live.borrow_mut();
            live.system = scheme;
            live.requested.clone()
        };
        log::debug!("System color scheme is now {}", scheme);

        let config = &self.inner.config;
        if requested == SYSTEM_THEME && config.enable_system() && config.forced_theme().is_none() {
            self.project();
        }
        self.publish();
    }

    fn on_storage_event(&self, event: &StorageEvent) {
        let key = self.inner.config.storage_key();
        if !event.concerns(key) {
            return;
        }

        let theme = match usable_theme(event.new_value.as_deref()) {
            Some(theme) => theme.to_string(),
            None => {
                let default = self.inner.config.default_theme();
                log::warn!(
                    "Unusable external value for '{}' ({:?}), using '{}'",
                    key,
                    event.new_value,
                    default
                );
                default.to_string()
            },
        };

        // Adopt without writing back.
        log::debug!("Adopting external theme '{}'", theme);
        self.inner.live.borrow_mut().requested = theme;
        self.project();
        self.publish();
    }

    fn project(&self) {
        if self.inner.lifecycle.get() != Lifecycle::Mounted {
            return;
        }

        let live = self.inner.live.borrow().clone();
        let config = &self.inner.config;
        let state = resolve(&live.requested, config.forced_theme(), live.system, config);
        let projection = Projection::derive(&state, config);

        self.inner.projector.apply(
            &projection,
            config.attributes(),
            config.disable_transition_on_change(),
        );
        *self.inner.last_projection.borrow_mut() = Some(projection);
    }

    fn publish(&self) {
        let live = self.inner.live.borrow().clone();
        let state = read_model(&self.inner.config, &live);
        self.inner.read_model.replace_if_changed(state);
    }
}

fn read_model(config: &ThemeConfig, live: &LiveState) -> ThemeState {
    let resolved = resolve(&live.requested, config.forced_theme(), live.system, config);
    ThemeState {
        theme: live.requested.clone(),
        resolved_theme: resolved.resolved_theme,
        system_theme: config.enable_system().then_some(live.system),
        forced_theme: config.forced_theme().map(str::to_string),
        themes: available_themes(config).into_iter().collect(),
    }
}

impl fmt::Debug for ThemeManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeManager")
            .field("state", &*self.inner.read_model.get())
            .field("lifecycle", &self.inner.lifecycle.get())
            .finish()
    }
}
