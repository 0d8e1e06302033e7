// SPDX-License-Identifier: LGPL-3.0-only
use crate::platform::{ColorScheme, SystemPreferenceSensor};
use crate::signal::{Listener, Signal, StateSignal, Subscription};

/// A detection routine. `None` means the environment could not report a
/// preference.
pub type Detector = fn() -> Option<ColorScheme>;

/// Detect the OS color scheme with the `dark-light` crate.
///
/// Returns `None` when detection fails, the OS reports no preference, or the
/// crate was built without the `os-detect` feature.
#[cfg(all(feature = "os-detect", not(target_arch = "wasm32")))]
pub fn detect_color_scheme() -> Option<ColorScheme> {
    match dark_light::detect() {
        Ok(dark_light::Mode::Dark) => Some(ColorScheme::Dark),
        Ok(dark_light::Mode::Light) => Some(ColorScheme::Light),
        Ok(dark_light::Mode::Unspecified) => None,
        Err(e) => {
            log::debug!("OS color scheme detection failed: {}", e);
            None
        },
    }
}

/// Detect the OS color scheme with the `dark-light` crate.
///
/// Returns `None` when detection fails, the OS reports no preference, or the
/// crate was built without the `os-detect` feature.
#[cfg(not(all(feature = "os-detect", not(target_arch = "wasm32"))))]
pub fn detect_color_scheme() -> Option<ColorScheme> {
    None
}

/// A sensor backed by native OS detection.
///
/// Native platforms offer no portable change notification, so the host calls
/// [DetectedSensor::refresh] when it wants the value re-read (on focus, on a
/// timer, on a settings-changed signal). Subscribers are notified if the
/// refreshed value differs.
///
/// When the detector reports nothing, the sensor falls back to
/// [ColorScheme::Light] and logs a warning.
#[derive(Clone)]
pub struct DetectedSensor {
    detector: Detector,
    scheme: StateSignal<ColorScheme>,
}

impl DetectedSensor {
    /// Create a sensor using [detect_color_scheme].
    pub fn new() -> Self {
        Self::with_detector(detect_color_scheme)
    }

    /// Create a sensor using a custom detection routine.
    ///
    /// ```rust
    /// use dusk_core::platform::{ColorScheme, DetectedSensor, SystemPreferenceSensor};
    ///
    /// let sensor = DetectedSensor::with_detector(|| Some(ColorScheme::Dark));
    /// assert_eq!(sensor.current(), ColorScheme::Dark);
    /// ```
    pub fn with_detector(detector: Detector) -> Self {
        Self {
            detector,
            scheme: StateSignal::new(Self::run(detector)),
        }
    }

    /// Re-run detection. Returns the current value.
    pub fn refresh(&self) -> ColorScheme {
        let scheme = Self::run(self.detector);
        if self.scheme.replace_if_changed(scheme) {
            log::debug!("Detected system color scheme change to {}", scheme);
        }
        scheme
    }

    fn run(detector: Detector) -> ColorScheme {
        detector().unwrap_or_else(|| {
            log::warn!(
                "System color scheme unavailable, assuming {}",
                ColorScheme::Light
            );
            ColorScheme::Light
        })
    }
}

impl Default for DetectedSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemPreferenceSensor for DetectedSensor {
    fn current(&self) -> ColorScheme {
        *self.scheme.get()
    }

    fn subscribe(&self, listener: Listener<ColorScheme>) -> Subscription {
        self.scheme.listen(listener)
    }
}

impl std::fmt::Debug for DetectedSensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectedSensor")
            .field("scheme", &self.current())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_unavailable_detector_falls_back_to_light() {
        let sensor = DetectedSensor::with_detector(|| None);
        assert_eq!(sensor.current(), ColorScheme::Light);
    }

    #[test]
    fn test_refresh_notifies_on_change() {
        thread_local! {
            static DARK: Cell<bool> = const { Cell::new(false) };
        }
        fn detector() -> Option<ColorScheme> {
            Some(if DARK.with(Cell::get) {
                ColorScheme::Dark
            } else {
                ColorScheme::Light
            })
        }

        let sensor = DetectedSensor::with_detector(detector);
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let _subscription = sensor.subscribe(Box::new(move |_| counter.set(counter.get() + 1)));

        assert_eq!(sensor.refresh(), ColorScheme::Light);
        DARK.with(|dark| dark.set(true));
        assert_eq!(sensor.refresh(), ColorScheme::Dark);
        assert_eq!(sensor.refresh(), ColorScheme::Dark);

        assert_eq!(calls.get(), 1);
        assert_eq!(sensor.current(), ColorScheme::Dark);
    }
}
