// SPDX-License-Identifier: LGPL-3.0-only
use std::cell::RefCell;
use std::fmt;

/// A handle that detaches a listener from its source.
///
/// The listener stays registered as long as the handle is alive. Calling
/// [Subscription::unsubscribe] more than once, or dropping the handle after an
/// explicit unsubscribe, has no further effect.
#[must_use = "dropping a Subscription immediately detaches the listener"]
pub struct Subscription {
    cancel: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl Subscription {
    /// Create a subscription that runs `cancel` once when it is released.
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: RefCell::new(Some(Box::new(cancel))),
        }
    }

    /// A subscription that is not attached to anything.
    ///
    /// Returned by sources that never emit (e.g. an unavailable media query).
    pub fn detached() -> Self {
        Self {
            cancel: RefCell::new(None),
        }
    }

    /// Detach the listener. Idempotent.
    pub fn unsubscribe(&self) {
        let cancel = self.cancel.borrow_mut().take();
        if let Some(cancel) = cancel {
            cancel();
        }
    }

    /// Whether the listener is still attached.
    pub fn is_active(&self) -> bool {
        self.cancel.borrow().is_some()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
