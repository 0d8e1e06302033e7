// SPDX-License-Identifier: LGPL-3.0-only
use crate::signal::{Listener, Listeners, Signal, Subscription};
use std::cell::{Ref, RefCell};
use std::rc::Rc;

/// Simple signal implementation based on [Rc] and [RefCell] to get/set a value and notify listeners when it changes.
///
/// You can also mutate the inner value, but only in a set scope via [StateSignal::mutate].
/// Clones share the value and the listeners.
pub struct StateSignal<T: Clone + 'static> {
    value: Rc<RefCell<T>>,
    listeners: Rc<Listeners<T>>,
}

impl<T: Clone + 'static> StateSignal<T> {
    /// Creates a new signal with the given value.
    pub fn new(value: T) -> Self {
        Self {
            value: Rc::new(RefCell::new(value)),
            listeners: Listeners::new(),
        }
    }

    /// Mutate the inner value in a set scope. This scope is needed in order to notify listeners of changes.
    pub fn mutate(&self, op: impl FnOnce(&mut T)) {
        op(&mut self.value.borrow_mut());
        self.notify();
    }

    /// Get a copy of the current value.
    pub fn get_cloned(&self) -> T {
        self.value.borrow().clone()
    }
}

impl<T: Clone + PartialEq + 'static> StateSignal<T> {
    /// Replace the value only if it differs from the current one.
    ///
    /// Returns `true` if listeners were notified.
    pub fn replace_if_changed(&self, value: T) -> bool {
        if *self.value.borrow() == value {
            return false;
        }
        self.set_value(value);
        true
    }
}

impl<T: Clone + 'static> Signal<T> for StateSignal<T> {
    fn get(&self) -> Ref<'_, T> {
        self.value.borrow()
    }

    fn set_value(&self, value: T) {
        self.mutate(move |old| *old = value);
    }

    fn listen(&self, listener: Listener<T>) -> Subscription {
        self.listeners.add(listener)
    }

    fn notify(&self) {
        // Listeners get a copy so they may write back into the signal.
        let value = self.get_cloned();
        self.listeners.emit(&value);
    }
}

impl<T: Clone + 'static> Clone for StateSignal<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            listeners: self.listeners.clone(),
        }
    }
}

impl<T: Clone + std::fmt::Debug + 'static> std::fmt::Debug for StateSignal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateSignal")
            .field("value", &*self.value.borrow())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
