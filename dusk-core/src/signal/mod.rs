// SPDX-License-Identifier: LGPL-3.0-only

//! Reactive values and change notification.
//!
//! Every change source in dusk (the system sensor, preference stores, the
//! theme read model) hands out a [Subscription] when a listener registers.
//! Dropping the subscription or calling [Subscription::unsubscribe] detaches
//! the listener; both are idempotent.

use std::cell::Ref;

mod listeners;
mod state;
mod subscription;

pub use listeners::Listeners;
pub use state::StateSignal;
pub use subscription::Subscription;

/// A listener called with a reference to the new value.
pub type Listener<T> = Box<dyn Fn(&T)>;

/// A value that can be read, replaced and observed.
pub trait Signal<T: 'static> {
    /// Borrow the current value.
    ///
    /// The borrow must be released before calling [Signal::set_value].
    fn get(&self) -> Ref<'_, T>;

    /// Replace the value and notify listeners.
    fn set_value(&self, value: T);

    /// Register a listener that is called after every change.
    fn listen(&self, listener: Listener<T>) -> Subscription;

    /// Notify all listeners with the current value.
    fn notify(&self);
}
