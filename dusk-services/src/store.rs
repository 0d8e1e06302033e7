// SPDX-License-Identifier: LGPL-3.0-only

//! The preference store contract.

use crate::error::StoreResult;
use dusk_core::signal::{Listener, Subscription};

/// A storage-change notification from another context of the same origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    /// The key that changed. `None` when the whole store was cleared.
    pub key: Option<String>,
    /// The new value, `None` if the key was removed.
    pub new_value: Option<String>,
    /// The previous value, if known.
    pub old_value: Option<String>,
}

impl StorageEvent {
    /// A change of `key` from `old_value` to `new_value`.
    pub fn changed(
        key: impl Into<String>,
        old_value: Option<String>,
        new_value: Option<String>,
    ) -> Self {
        Self {
            key: Some(key.into()),
            new_value,
            old_value,
        }
    }

    /// Whether this event concerns `key`. A whole-store clear concerns every key.
    pub fn concerns(&self, key: &str) -> bool {
        self.key.as_deref().map_or(true, |changed| changed == key)
    }
}

/// A synchronous key-value store scoped to an origin.
///
/// Implementations fail soft on reads: an unreachable store reads as absent.
/// An empty stored string also reads as absent.
pub trait PreferenceStore {
    /// Read the value stored under `key`.
    fn read(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`.
    fn write(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Remove `key`.
    fn remove(&self, key: &str) -> StoreResult<()>;

    /// Register for changes made by *other* contexts of the same origin.
    ///
    /// A store never notifies its own listeners about its own writes.
    fn subscribe(&self, listener: Listener<StorageEvent>) -> Subscription;
}
