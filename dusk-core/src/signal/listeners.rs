// SPDX-License-Identifier: LGPL-3.0-only
use crate::signal::{Listener, Subscription};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// An ordered set of listeners for one change source.
///
/// Emission iterates over a snapshot of the registered listeners, so a
/// listener may register or detach listeners (including itself) while it runs.
pub struct Listeners<T: 'static> {
    entries: RefCell<Vec<(usize, Rc<dyn Fn(&T)>)>>,
    next_id: Cell<usize>,
}

impl<T: 'static> Listeners<T> {
    /// Create an empty listener set.
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            entries: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        })
    }

    /// Register a listener. It stays registered until the returned
    /// [Subscription] is released.
    pub fn add(self: &Rc<Self>, listener: Listener<T>) -> Subscription {
        let id = self.next_id.get();
        self.next_id.set(id.wrapping_add(1));
        self.entries.borrow_mut().push((id, Rc::from(listener)));

        let set = Rc::downgrade(self);
        Subscription::new(move || {
            if let Some(set) = set.upgrade() {
                set.entries.borrow_mut().retain(|(entry, _)| *entry != id);
            }
        })
    }

    /// Call every registered listener with `value`.
    pub fn emit(&self, value: &T) {
        let snapshot: Vec<Rc<dyn Fn(&T)>> = self
            .entries
            .borrow()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();

        for listener in snapshot {
            listener(value);
        }
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl<T: 'static> std::fmt::Debug for Listeners<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners").field("len", &self.len()).finish()
    }
}
