// SPDX-License-Identifier: LGPL-3.0-only
use crate::platform::{ColorScheme, SystemPreferenceSensor};
use crate::signal::{Listener, Signal, StateSignal, Subscription};

/// A sensor whose value is pushed by the host.
///
/// Clones share the value and the subscribers.
#[derive(Debug, Clone)]
pub struct ManualSensor {
    scheme: StateSignal<ColorScheme>,
}

impl ManualSensor {
    /// Create a sensor reporting `initial`.
    pub fn new(initial: ColorScheme) -> Self {
        Self {
            scheme: StateSignal::new(initial),
        }
    }

    /// Report a new preference. Subscribers are notified only if it changed.
    pub fn set(&self, scheme: ColorScheme) {
        if self.scheme.replace_if_changed(scheme) {
            log::debug!("System color scheme changed to {}", scheme);
        }
    }
}

impl Default for ManualSensor {
    fn default() -> Self {
        Self::new(ColorScheme::default())
    }
}

impl SystemPreferenceSensor for ManualSensor {
    fn current(&self) -> ColorScheme {
        *self.scheme.get()
    }

    fn subscribe(&self, listener: Listener<ColorScheme>) -> Subscription {
        self.scheme.listen(listener)
    }
}
