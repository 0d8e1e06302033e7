// SPDX-License-Identifier: LGPL-3.0-only

//! System color-scheme preference.
//!
//! The engine never asks the OS directly. It reads the preference through a
//! [SystemPreferenceSensor], which can report the current value synchronously
//! and notify subscribers when it changes.
//!
//! Sensors provided here:
//! - [ManualSensor]: the host pushes the value (tests, embedders that learn the
//!   preference from elsewhere).
//! - [DetectedSensor]: native detection through the `dark-light` crate.
//! - `web::MediaQuerySensor` (wasm32): `prefers-color-scheme` media query.

mod detected;
mod manual;

pub use detected::{detect_color_scheme, DetectedSensor, Detector};
pub use manual::ManualSensor;

use crate::signal::{Listener, Subscription};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two canonical color schemes.
///
/// `Light` is the documented fallback whenever the environment cannot report
/// a preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    /// Light background, dark text.
    #[default]
    Light,
    /// Dark background, light text.
    Dark,
}

impl ColorScheme {
    /// The canonical name (`"light"` or `"dark"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorScheme::Light => "light",
            ColorScheme::Dark => "dark",
        }
    }

    /// Parse a canonical scheme name. Anything else yields `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "light" => Some(ColorScheme::Light),
            "dark" => Some(ColorScheme::Dark),
            _ => None,
        }
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reports the system light/dark preference.
pub trait SystemPreferenceSensor {
    /// Read the current preference synchronously.
    fn current(&self) -> ColorScheme;

    /// Register for change notifications.
    ///
    /// The listener receives the new value. Any number of listeners may be
    /// registered; each stays registered while its [Subscription] is alive.
    fn subscribe(&self, listener: Listener<ColorScheme>) -> Subscription;
}
