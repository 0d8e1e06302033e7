// SPDX-License-Identifier: LGPL-3.0-only

//! An in-process origin.
//!
//! A [MemoryOrigin] is one storage area shared by any number of
//! [MemoryStore] handles. Each handle plays the part of one tab or window:
//! a write through one handle is announced to the listeners of every other
//! handle on the same origin, never to its own.
//!
//! ```rust
//! use dusk_services::memory::MemoryOrigin;
//! use dusk_services::store::PreferenceStore;
//!
//! let origin = MemoryOrigin::new();
//! let first_tab = origin.open();
//! let second_tab = origin.open();
//!
//! first_tab.write("theme", "dark").unwrap();
//! assert_eq!(second_tab.read("theme").as_deref(), Some("dark"));
//! ```

use crate::error::{StoreError, StoreResult};
use crate::store::{PreferenceStore, StorageEvent};
use dusk_core::signal::{Listener, Listeners, Subscription};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

#[derive(Default)]
struct OriginState {
    values: IndexMap<String, String>,
    available: bool,
    quota: Option<usize>,
    writes: usize,
    next_context: usize,
    contexts: Vec<(usize, Weak<Listeners<StorageEvent>>)>,
}

impl OriginState {
    fn usage_with(&self, key: &str, value: &str) -> usize {
        let others: usize = self
            .values
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum();
        others + key.len() + value.len()
    }

    /// Listeners of every live context except `origin_context`.
    fn audience(&mut self, origin_context: usize) -> Vec<Rc<Listeners<StorageEvent>>> {
        self.contexts.retain(|(_, listeners)| listeners.strong_count() > 0);
        self.contexts
            .iter()
            .filter(|(id, _)| *id != origin_context)
            .filter_map(|(_, listeners)| listeners.upgrade())
            .collect()
    }
}

/// A shared in-memory storage area. Clones refer to the same origin.
#[derive(Clone)]
pub struct MemoryOrigin {
    state: Rc<RefCell<OriginState>>,
}

impl MemoryOrigin {
    /// Create an empty, available origin without a quota.
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(OriginState {
                available: true,
                ..OriginState::default()
            })),
        }
    }

    /// Set a byte quota. The size of an origin is the sum of the lengths of
    /// all keys and values.
    pub fn with_quota(self, bytes: usize) -> Self {
        self.state.borrow_mut().quota = Some(bytes);
        self
    }

    /// Open a new context (a tab) on this origin.
    pub fn open(&self) -> MemoryStore {
        let listeners = Listeners::new();
        let context = {
            let mut state = self.state.borrow_mut();
            let id = state.next_context;
            state.next_context += 1;
            state.contexts.push((id, Rc::downgrade(&listeners)));
            id
        };
        MemoryStore {
            origin: self.clone(),
            context,
            listeners,
        }
    }

    /// Make the origin reachable or unreachable.
    ///
    /// While unavailable, reads return absent and writes fail with
    /// [StoreError::Unavailable].
    pub fn set_available(&self, available: bool) {
        self.state.borrow_mut().available = available;
    }

    /// Whether the origin is reachable.
    pub fn is_available(&self) -> bool {
        self.state.borrow().available
    }

    /// Number of successful writes and removals through any context.
    pub fn write_count(&self) -> usize {
        self.state.borrow().writes
    }

    /// Peek at a stored value regardless of availability.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.state.borrow().values.get(key).cloned()
    }

    fn ensure_available(&self) -> StoreResult<()> {
        if self.is_available() {
            Ok(())
        } else {
            Err(StoreError::unavailable("origin storage is disabled"))
        }
    }

    fn dispatch(&self, from: usize, event: StorageEvent) {
        let audience = self.state.borrow_mut().audience(from);
        for listeners in audience {
            listeners.emit(&event);
        }
    }
}

impl Default for MemoryOrigin {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("MemoryOrigin")
            .field("values", &state.values)
            .field("available", &state.available)
            .field("quota", &state.quota)
            .finish()
    }
}

/// One context on a [MemoryOrigin].
pub struct MemoryStore {
    origin: MemoryOrigin,
    context: usize,
    listeners: Rc<Listeners<StorageEvent>>,
}

impl MemoryStore {
    /// A store on a fresh private origin.
    pub fn new() -> Self {
        MemoryOrigin::new().open()
    }

    /// The origin this context belongs to.
    pub fn origin(&self) -> &MemoryOrigin {
        &self.origin
    }

    /// Remove every key, announcing a whole-store clear to other contexts.
    pub fn clear(&self) -> StoreResult<()> {
        self.origin.ensure_available()?;
        {
            let mut state = self.origin.state.borrow_mut();
            if state.values.is_empty() {
                return Ok(());
            }
            state.values.clear();
            state.writes += 1;
        }
        self.origin.dispatch(
            self.context,
            StorageEvent {
                key: None,
                new_value: None,
                old_value: None,
            },
        );
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PreferenceStore for MemoryStore {
    fn read(&self, key: &str) -> Option<String> {
        let state = self.origin.state.borrow();
        if !state.available {
            log::debug!("Read of '{}' from unavailable origin", key);
            return None;
        }
        state.values.get(key).filter(|v| !v.is_empty()).cloned()
    }

    fn write(&self, key: &str, value: &str) -> StoreResult<()> {
        self.origin.ensure_available()?;
        let old_value = {
            let mut state = self.origin.state.borrow_mut();
            if let Some(limit) = state.quota {
                if state.usage_with(key, value) > limit {
                    return Err(StoreError::quota_exceeded(key, limit));
                }
            }
            state.writes += 1;
            state.values.insert(key.to_string(), value.to_string())
        };

        if old_value.as_deref() != Some(value) {
            self.origin.dispatch(
                self.context,
                StorageEvent::changed(key, old_value, Some(value.to_string())),
            );
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.origin.ensure_available()?;
        let old_value = {
            let mut state = self.origin.state.borrow_mut();
            let old = state.values.shift_remove(key);
            if old.is_some() {
                state.writes += 1;
            }
            old
        };

        if old_value.is_some() {
            self.origin
                .dispatch(self.context, StorageEvent::changed(key, old_value, None));
        }
        Ok(())
    }

    fn subscribe(&self, listener: Listener<StorageEvent>) -> Subscription {
        self.listeners.add(listener)
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("context", &self.context)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder(store: &MemoryStore) -> (Rc<RefCell<Vec<StorageEvent>>>, Subscription) {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        let subscription = store.subscribe(Box::new(move |e| sink.borrow_mut().push(e.clone())));
        (events, subscription)
    }

    #[test]
    fn test_writes_reach_other_contexts_only() {
        let origin = MemoryOrigin::new();
        let writer = origin.open();
        let reader = origin.open();
        let (own, _own_sub) = recorder(&writer);
        let (other, _other_sub) = recorder(&reader);

        writer.write("theme", "dark").unwrap();

        assert!(own.borrow().is_empty());
        assert_eq!(
            *other.borrow(),
            vec![StorageEvent::changed("theme", None, Some("dark".into()))]
        );
    }

    #[test]
    fn test_unchanged_write_is_not_announced() {
        let origin = MemoryOrigin::new();
        let writer = origin.open();
        let reader = origin.open();
        let (other, _sub) = recorder(&reader);

        writer.write("theme", "dark").unwrap();
        writer.write("theme", "dark").unwrap();

        assert_eq!(other.borrow().len(), 1);
        assert_eq!(origin.write_count(), 2);
    }

    #[test]
    fn test_empty_value_reads_as_absent() {
        let store = MemoryStore::new();
        store.write("theme", "").unwrap();
        assert_eq!(store.read("theme"), None);
    }

    #[test]
    fn test_unavailable_origin_fails_soft() {
        let origin = MemoryOrigin::new();
        let store = origin.open();
        store.write("theme", "dark").unwrap();

        origin.set_available(false);
        assert_eq!(store.read("theme"), None);
        assert!(matches!(
            store.write("theme", "light"),
            Err(StoreError::Unavailable { .. })
        ));
        assert_eq!(origin.peek("theme").as_deref(), Some("dark"));
    }

    #[test]
    fn test_quota_rejects_oversized_writes() {
        let store = MemoryOrigin::new().with_quota(10).open();
        store.write("theme", "dark").unwrap();
        assert!(matches!(
            store.write("theme", "midnight-blue"),
            Err(StoreError::QuotaExceeded { limit: 10, .. })
        ));
        assert_eq!(store.read("theme").as_deref(), Some("dark"));
    }

    #[test]
    fn test_remove_and_clear_are_announced() {
        let origin = MemoryOrigin::new();
        let writer = origin.open();
        let reader = origin.open();
        writer.write("theme", "dark").unwrap();
        let (other, _sub) = recorder(&reader);

        writer.remove("theme").unwrap();
        writer.write("theme", "light").unwrap();
        writer.clear().unwrap();

        let events = other.borrow();
        assert_eq!(events[0], StorageEvent::changed("theme", Some("dark".into()), None));
        assert_eq!(events[2].key, None);
        assert_eq!(reader.read("theme"), None);
    }

    #[test]
    fn test_dropped_context_is_forgotten() {
        let origin = MemoryOrigin::new();
        let writer = origin.open();
        drop(origin.open());
        writer.write("theme", "dark").unwrap();
        assert_eq!(origin.state.borrow().contexts.len(), 1);
    }
}
