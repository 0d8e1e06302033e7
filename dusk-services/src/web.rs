// SPDX-License-Identifier: LGPL-3.0-only

//! `window.localStorage` as a [PreferenceStore].

use crate::error::{StoreError, StoreResult};
use crate::store::{PreferenceStore, StorageEvent};
use dusk_core::signal::{Listener, Subscription};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

/// The browser's local storage for the current origin.
///
/// The browser delivers `storage` events only to other documents of the same
/// origin, which matches the [PreferenceStore::subscribe] contract directly.
#[derive(Debug, Default)]
pub struct LocalStore;

impl LocalStore {
    /// Create a handle. Storage access is checked on every call, since the
    /// user can disable it at any time.
    pub fn new() -> Self {
        Self
    }

    fn storage() -> StoreResult<web_sys::Storage> {
        let window = web_sys::window().ok_or_else(|| StoreError::unavailable("no window"))?;
        match window.local_storage() {
            Ok(Some(storage)) => Ok(storage),
            Ok(None) => Err(StoreError::unavailable("localStorage is not available")),
            Err(e) => Err(StoreError::unavailable(format!("{:?}", e))),
        }
    }
}

impl PreferenceStore for LocalStore {
    fn read(&self, key: &str) -> Option<String> {
        let storage = match Self::storage() {
            Ok(storage) => storage,
            Err(e) => {
                log::debug!("Read of '{}' skipped: {}", key, e);
                return None;
            },
        };
        match storage.get_item(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                log::debug!("localStorage.getItem('{}') failed: {:?}", key, e);
                None
            },
        }
    }

    fn write(&self, key: &str, value: &str) -> StoreResult<()> {
        Self::storage()?
            .set_item(key, value)
            .map_err(|e| StoreError::unavailable(format!("{:?}", e)))
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        Self::storage()?
            .remove_item(key)
            .map_err(|e| StoreError::unavailable(format!("{:?}", e)))
    }

    fn subscribe(&self, listener: Listener<StorageEvent>) -> Subscription {
        let Some(window) = web_sys::window() else {
            return Subscription::detached();
        };

        let closure = Closure::wrap(Box::new(move |event: web_sys::StorageEvent| {
            listener(&StorageEvent {
                key: event.key(),
                new_value: event.new_value(),
                old_value: event.old_value(),
            });
        }) as Box<dyn FnMut(_)>);

        if let Err(e) =
            window.add_event_listener_with_callback("storage", closure.as_ref().unchecked_ref())
        {
            log::warn!("Failed to listen for storage events: {:?}", e);
            return Subscription::detached();
        }

        Subscription::new(move || {
            let _ = window
                .remove_event_listener_with_callback("storage", closure.as_ref().unchecked_ref());
            drop(closure);
        })
    }
}
