#![warn(missing_docs)]

//! # Dusk Theme Engine
//!
//! Reconciles a user-selected display theme (`"light"`, `"dark"`, `"system"` or
//! any custom name) across three sources of truth and projects the result onto
//! a document:
//!
//! - the in-memory application state,
//! - a durable, origin-scoped preference store,
//! - the system color-scheme preference.
//!
//! ## Overview
//!
//! - **[ThemeConfig](config::ThemeConfig)**: Fixed configuration, built
//!   programmatically, from TOML, or from `DUSK_THEME_*` environment variables
//! - **[theme_resolver]**: Pure resolution of the requested theme
//! - **[Projection](projection::Projection)**: The attribute, class and
//!   `color-scheme` values for a resolved theme
//! - **[DomProjector](projector::DomProjector)**: Writes projections, with
//!   optional transition suppression
//! - **[ScriptSnapshot](script::ScriptSnapshot)**: The early, pre-attach pass
//!   that prevents a flash of the wrong theme
//! - **[ThemeManager](manager::ThemeManager)**: The synchronization controller
//!
//! ## Quick Start
//!
//! ```rust
//! use dusk_core::document::{Document, VirtualDocument};
//! use dusk_core::platform::{ColorScheme, ManualSensor};
//! use dusk_core::tasks::TaskQueue;
//! use dusk_services::memory::MemoryOrigin;
//! use dusk_theme::config::{AttributeTarget, ThemeConfig};
//! use dusk_theme::manager::{ThemeHost, ThemeManager};
//!
//! let origin = MemoryOrigin::new();
//! let sensor = ManualSensor::new(ColorScheme::Light);
//! let document = VirtualDocument::new();
//! let config = ThemeConfig::new()
//!     .with_attribute(AttributeTarget::Class)
//!     .with_value("dark", "theme-dark");
//!
//! // First paint: the early pass runs before the application attaches.
//! let snapshot = dusk_theme::script::ScriptSnapshot::from_config(&config);
//! snapshot.run(&origin.open(), &sensor, &document);
//!
//! // The application attaches.
//! let host = ThemeHost::new(origin.open(), sensor.clone(), document.clone(), TaskQueue::new());
//! let manager = ThemeManager::new(config, host).unwrap();
//! manager.mount();
//!
//! // The system switches to dark while the theme is "system".
//! sensor.set(ColorScheme::Dark);
//! assert!(document.has_class("theme-dark"));
//! ```
//!
//! ## Failure Policy
//!
//! Only configuration and opening a store can fail
//! ([ThemeError](error::ThemeError)). At run time
//! every failure degrades to a documented default and is logged through the
//! `log` facade:
//!
//! - unreachable store: reads fall back to the default theme, writes are
//!   dropped and the in-memory state stays authoritative;
//! - no system preference: `light`;
//! - unknown theme names: passed through verbatim;
//! - unusable external values: the default theme.

/// Contains the [config::ThemeConfig] struct for theme configuration.
pub mod config;
/// Contains the [error::ThemeError] type.
pub mod error;
/// Contains the [manager::ThemeManager] synchronization controller.
pub mod manager;
/// Contains the [projection::Projection] derived from a resolved theme.
pub mod projection;
/// Contains the [projector::DomProjector] and transition suppression.
pub mod projector;
/// Contains the early projection [script::ScriptSnapshot].
pub mod script;
/// Contains the pure theme resolution functions.
pub mod theme_resolver;

pub use config::{AttributeTarget, ThemeConfig, SYSTEM_THEME};
pub use error::{ThemeError, ThemeResult};
pub use manager::{ThemeHost, ThemeManager, ThemeState, ThemeUpdate};
