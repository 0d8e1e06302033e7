//! # DOM Projection
//!
//! Writes a [Projection] onto the document root.
//!
//! For every target:
//! - `class`: remove every other value of the class universe, then add the
//!   computed value. Nothing is touched if the root already carries exactly
//!   the computed value.
//! - `data-*`: set the attribute to the computed value, or remove it when the
//!   value is cleared.
//!
//! Then the `color-scheme` style property is set or cleared (unless
//! unmanaged). With transition suppression on, a stylesheet disabling all
//! transitions is inserted before the writes, a style recomputation is forced
//! after them, and the stylesheet is removed one tick later.

use dusk_core::document::{Document, StyleHandle};
use dusk_core::tasks::Scheduler;
use std::cell::RefCell;
use std::rc::Rc;

use crate::config::AttributeTarget;
use crate::projection::{ColorSchemeHint, Projection};

/// Disables every CSS transition while the theme is swapped.
pub const TRANSITION_SUPPRESSION_CSS: &str = "*,*::before,*::after{-webkit-transition:none!important;-moz-transition:none!important;-o-transition:none!important;-ms-transition:none!important;transition:none!important}";

/// The style property carrying the color-scheme hint.
pub const COLOR_SCHEME_PROPERTY: &str = "color-scheme";

/// The live-region attribute set after every projection.
pub const LIVE_REGION_ATTRIBUTE: &str = "aria-live";

/// The live-region politeness.
pub const LIVE_REGION_VALUE: &str = "polite";

/// Write `projection` to `targets` on `document`.
///
/// `previous_class` is a class written earlier that may not be part of the
/// universe (a custom theme outside the catalog); it is removed as well.
/// Writes that would not change anything are skipped.
pub fn apply_projection(
    document: &dyn Document,
    projection: &Projection,
    targets: &[AttributeTarget],
    previous_class: Option<&str>,
) {
    let value = projection.attribute_value.as_deref();

    for target in targets {
        match target {
            AttributeTarget::Class => {
                let stale: Vec<&str> = projection
                    .class_universe
                    .iter()
                    .map(String::as_str)
                    .chain(previous_class)
                    .filter(|class| Some(*class) != value && document.has_class(class))
                    .collect();
                if !stale.is_empty() {
                    document.remove_classes(&stale);
                }
                if let Some(value) = value {
                    if !document.has_class(value) {
                        document.add_class(value);
                    }
                }
            },
            AttributeTarget::Data(name) => match value {
                Some(value) => {
                    if document.attribute(name).as_deref() != Some(value) {
                        document.set_attribute(name, value);
                    }
                },
                None => {
                    if document.attribute(name).is_some() {
                        document.remove_attribute(name);
                    }
                },
            },
        }
    }

    match projection.color_scheme {
        ColorSchemeHint::Unmanaged => {},
        ColorSchemeHint::Set(scheme) => {
            if document.style_property(COLOR_SCHEME_PROPERTY).as_deref() != Some(scheme.as_str()) {
                document.set_style_property(COLOR_SCHEME_PROPERTY, scheme.as_str());
            }
        },
        ColorSchemeHint::Clear => {
            if document.style_property(COLOR_SCHEME_PROPERTY).is_some() {
                document.remove_style_property(COLOR_SCHEME_PROPERTY);
            }
        },
    }
}

/// An inserted transition-suppression stylesheet.
#[must_use = "call TransitionGuard::release to remove the stylesheet"]
#[derive(Debug)]
pub struct TransitionGuard {
    handle: StyleHandle,
}

impl TransitionGuard {
    /// Insert the suppression stylesheet.
    pub fn begin(document: &dyn Document) -> Self {
        Self {
            handle: document.insert_style(TRANSITION_SUPPRESSION_CSS),
        }
    }

    /// Force a style recomputation, then remove the stylesheet on the next tick.
    pub fn release(self, document: Rc<dyn Document>, scheduler: &dyn Scheduler) {
        document.recompute_style();
        let handle = self.handle;
        scheduler.defer(Box::new(move || document.remove_style(handle)));
    }
}

/// Applies projections for a live manager.
pub struct DomProjector {
    document: Rc<dyn Document>,
    scheduler: Rc<dyn Scheduler>,
    last_class: RefCell<Option<String>>,
}

impl DomProjector {
    /// Create a projector writing to `document`.
    pub fn new(document: Rc<dyn Document>, scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            document,
            scheduler,
            last_class: RefCell::new(None),
        }
    }

    /// Apply a projection, then set the live-region hint.
    pub fn apply(
        &self,
        projection: &Projection,
        targets: &[AttributeTarget],
        suppress_transitions: bool,
    ) {
        let guard = suppress_transitions.then(|| TransitionGuard::begin(&*self.document));

        let previous = self.last_class.borrow().clone();
        apply_projection(&*self.document, projection, targets, previous.as_deref());
        if targets.contains(&AttributeTarget::Class) {
            *self.last_class.borrow_mut() = projection.attribute_value.clone();
        }

        if let Some(guard) = guard {
            guard.release(self.document.clone(), &*self.scheduler);
        }

        self.document
            .set_attribute(LIVE_REGION_ATTRIBUTE, LIVE_REGION_VALUE);
        log::trace!("Projected theme '{}'", projection.resolved_theme);
    }
}

impl std::fmt::Debug for DomProjector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomProjector")
            .field("last_class", &self.last_class.borrow())
            .finish()
    }
}
