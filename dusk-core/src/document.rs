// SPDX-License-Identifier: LGPL-3.0-only

//! # Document Boundary
//!
//! The theme projector writes to exactly one element, the document root, and
//! to the document's stylesheet list. [Document] is the narrow interface for
//! those writes:
//!
//! - attribute set/remove on the root element
//! - class add/remove (bulk) on the root element
//! - one inline style property on the root element
//! - stylesheet insert/remove
//! - a synchronous style recomputation trigger
//!
//! [VirtualDocument] is the in-memory implementation. It is used for
//! server-side rendering (see [VirtualDocument::render_open_tag]) and in tests,
//! where [RootSnapshot] and the mutation counter make idempotence observable.

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::cell::RefCell;
use std::fmt::Write as _;
use std::rc::Rc;

/// Identifies a stylesheet inserted through [Document::insert_style].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StyleHandle(pub u64);

/// The document the theme is projected onto.
///
/// All methods act on the root element (`<html>` in a browser). Writes are
/// infallible from the caller's point of view: a backend that cannot perform
/// one logs it and carries on.
pub trait Document {
    /// Read an attribute of the root element.
    fn attribute(&self, name: &str) -> Option<String>;
    /// Set an attribute on the root element.
    fn set_attribute(&self, name: &str, value: &str);
    /// Remove an attribute from the root element.
    fn remove_attribute(&self, name: &str);

    /// Whether the root element carries `class`.
    fn has_class(&self, class: &str) -> bool;
    /// Add a class to the root element.
    fn add_class(&self, class: &str);
    /// Remove several classes from the root element at once.
    fn remove_classes(&self, classes: &[&str]);

    /// Read an inline style property of the root element.
    fn style_property(&self, property: &str) -> Option<String>;
    /// Set an inline style property on the root element.
    fn set_style_property(&self, property: &str, value: &str);
    /// Clear an inline style property on the root element.
    fn remove_style_property(&self, property: &str);

    /// Insert a stylesheet with the given CSS text.
    fn insert_style(&self, css: &str) -> StyleHandle;
    /// Remove a stylesheet inserted with [Document::insert_style].
    fn remove_style(&self, handle: StyleHandle);
    /// Force a synchronous style recomputation.
    fn recompute_style(&self);
}

/// A point-in-time copy of a [VirtualDocument]'s root element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RootSnapshot {
    /// Root attributes in insertion order, excluding `class` and `style`.
    pub attributes: IndexMap<String, String>,
    /// Root classes in insertion order.
    pub classes: IndexSet<String>,
    /// Inline style properties in insertion order.
    pub style: IndexMap<String, String>,
    /// CSS text of every inserted stylesheet, oldest first.
    pub stylesheets: Vec<String>,
}

#[derive(Default)]
struct VirtualRoot {
    snapshot: RootSnapshot,
    sheets: IndexMap<u64, String>,
    next_sheet: u64,
    mutations: usize,
    recomputations: usize,
}

/// An in-memory document. Clones share the same root element.
///
/// Only writes that change something count as mutations, so applying the
/// same projection twice leaves [VirtualDocument::mutations] unchanged the
/// second time.
#[derive(Clone, Default)]
pub struct VirtualDocument {
    root: Rc<RefCell<VirtualRoot>>,
}

impl VirtualDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy the current state of the root element.
    pub fn snapshot(&self) -> RootSnapshot {
        let root = self.root.borrow();
        let mut snapshot = root.snapshot.clone();
        snapshot.stylesheets = root.sheets.values().cloned().collect();
        snapshot
    }

    /// Number of effective writes so far.
    pub fn mutations(&self) -> usize {
        self.root.borrow().mutations
    }

    /// Number of forced style recomputations so far.
    pub fn recomputations(&self) -> usize {
        self.root.borrow().recomputations
    }

    /// Root classes in order.
    pub fn classes(&self) -> Vec<String> {
        self.root.borrow().snapshot.classes.iter().cloned().collect()
    }

    /// CSS text of every live stylesheet.
    pub fn stylesheets(&self) -> Vec<String> {
        self.root.borrow().sheets.values().cloned().collect()
    }

    /// Render the opening `<html>` tag for server-side output.
    ///
    /// ```rust
    /// use dusk_core::document::{Document, VirtualDocument};
    ///
    /// let document = VirtualDocument::new();
    /// document.set_attribute("data-theme", "dark");
    /// document.set_style_property("color-scheme", "dark");
    /// assert_eq!(
    ///     document.render_open_tag(),
    ///     r#"<html data-theme="dark" style="color-scheme: dark">"#
    /// );
    /// ```
    pub fn render_open_tag(&self) -> String {
        let root = self.root.borrow();
        let snapshot = &root.snapshot;
        let mut tag = String::from("<html");

        if !snapshot.classes.is_empty() {
            let classes: Vec<&str> = snapshot.classes.iter().map(String::as_str).collect();
            let _ = write!(tag, r#" class="{}""#, escape_attribute(&classes.join(" ")));
        }
        for (name, value) in &snapshot.attributes {
            let _ = write!(tag, r#" {}="{}""#, name, escape_attribute(value));
        }
        if !snapshot.style.is_empty() {
            let declarations: Vec<String> = snapshot
                .style
                .iter()
                .map(|(property, value)| format!("{}: {}", property, value))
                .collect();
            let _ = write!(tag, r#" style="{}""#, escape_attribute(&declarations.join("; ")));
        }

        tag.push('>');
        tag
    }
}

impl Document for VirtualDocument {
    fn attribute(&self, name: &str) -> Option<String> {
        self.root.borrow().snapshot.attributes.get(name).cloned()
    }

    fn set_attribute(&self, name: &str, value: &str) {
        let mut root = self.root.borrow_mut();
        if root.snapshot.attributes.get(name).map(String::as_str) != Some(value) {
            root.snapshot.attributes.insert(name.to_string(), value.to_string());
            root.mutations += 1;
        }
    }

    fn remove_attribute(&self, name: &str) {
        let mut root = self.root.borrow_mut();
        if root.snapshot.attributes.shift_remove(name).is_some() {
            root.mutations += 1;
        }
    }

    fn has_class(&self, class: &str) -> bool {
        self.root.borrow().snapshot.classes.contains(class)
    }

    fn add_class(&self, class: &str) {
        let mut root = self.root.borrow_mut();
        if root.snapshot.classes.insert(class.to_string()) {
            root.mutations += 1;
        }
    }

    fn remove_classes(&self, classes: &[&str]) {
        let mut root = self.root.borrow_mut();
        let before = root.snapshot.classes.len();
        root.snapshot.classes.retain(|class| !classes.contains(&class.as_str()));
        if root.snapshot.classes.len() != before {
            root.mutations += 1;
        }
    }

    fn style_property(&self, property: &str) -> Option<String> {
        self.root.borrow().snapshot.style.get(property).cloned()
    }

    fn set_style_property(&self, property: &str, value: &str) {
        if value.is_empty() {
            self.remove_style_property(property);
            return;
        }
        let mut root = self.root.borrow_mut();
        if root.snapshot.style.get(property).map(String::as_str) != Some(value) {
            root.snapshot.style.insert(property.to_string(), value.to_string());
            root.mutations += 1;
        }
    }

    fn remove_style_property(&self, property: &str) {
        let mut root = self.root.borrow_mut();
        if root.snapshot.style.shift_remove(property).is_some() {
            root.mutations += 1;
        }
    }

    fn insert_style(&self, css: &str) -> StyleHandle {
        let mut root = self.root.borrow_mut();
        let id = root.next_sheet;
        root.next_sheet += 1;
        root.sheets.insert(id, css.to_string());
        root.mutations += 1;
        StyleHandle(id)
    }

    fn remove_style(&self, handle: StyleHandle) {
        let mut root = self.root.borrow_mut();
        if root.sheets.shift_remove(&handle.0).is_some() {
            root.mutations += 1;
        } else {
            log::debug!("Stylesheet {:?} was already removed", handle);
        }
    }

    fn recompute_style(&self) {
        self.root.borrow_mut().recomputations += 1;
    }
}

impl std::fmt::Debug for VirtualDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualDocument")
            .field("root", &self.snapshot())
            .finish()
    }
}

/// Escape text for use inside a double-quoted HTML attribute value.
pub fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
