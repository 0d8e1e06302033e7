#![warn(missing_docs)]

//! Flicker-free light/dark theme resolution and synchronization.
//!
//! The theme is resolved from the user's choice, a durable preference store
//! and the system color-scheme preference, projected onto the document before
//! the first paint, and kept converged across tabs afterwards.

pub use dusk_core as core;
pub use dusk_services as services;
pub use dusk_theme as theme;

/// A "prelude" for users of dusk.
///
/// Importing this module brings into scope the most common types
/// needed to run the theme engine.
///
/// ```rust
/// use dusk::prelude::*;
///
/// let manager = ThemeManager::new(
///     ThemeConfig::new(),
///     ThemeHost::new(
///         MemoryStore::new(),
///         ManualSensor::default(),
///         VirtualDocument::new(),
///         TaskQueue::new(),
///     ),
/// )
/// .unwrap();
/// manager.mount();
/// assert_eq!(manager.state().resolved_theme, "light");
/// ```
pub mod prelude {
    pub use crate::core::document::{Document, VirtualDocument};
    pub use crate::core::platform::{
        ColorScheme, DetectedSensor, ManualSensor, SystemPreferenceSensor,
    };
    pub use crate::core::signal::{Signal, StateSignal, Subscription};
    pub use crate::core::tasks::{Scheduler, TaskQueue};

    pub use crate::services::memory::{MemoryOrigin, MemoryStore};
    #[cfg(not(target_arch = "wasm32"))]
    pub use crate::services::file::FileStore;
    pub use crate::services::{PreferenceStore, StorageEvent, StoreError};

    pub use crate::theme::config::{AttributeTarget, ThemeConfig, SYSTEM_THEME};
    pub use crate::theme::manager::{ThemeHost, ThemeManager, ThemeState, ThemeUpdate};
    pub use crate::theme::script::ScriptSnapshot;
    pub use crate::theme::{ThemeError, ThemeResult};

    #[cfg(target_arch = "wasm32")]
    pub use crate::core::web::{MediaQuerySensor, TimeoutScheduler, WebDocument};
    #[cfg(target_arch = "wasm32")]
    pub use crate::services::web::LocalStore;
}
