// SPDX-License-Identifier: LGPL-3.0-only

//! Browser implementations of the host boundaries.
//!
//! - [WebDocument]: the live `<html>` element and `<head>` stylesheets.
//! - [MediaQuerySensor]: `(prefers-color-scheme: dark)` with a `change` listener.
//! - [TimeoutScheduler]: `setTimeout(task, 1)`.
//!
//! Browser calls that throw are logged and otherwise ignored.

use crate::document::{Document, StyleHandle};
use crate::platform::{ColorScheme, SystemPreferenceSensor};
use crate::signal::{Listener, Subscription};
use crate::tasks::{Scheduler, Task};
use indexmap::IndexMap;
use std::cell::{Cell, RefCell};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

const DARK_QUERY: &str = "(prefers-color-scheme: dark)";

/// The browser's current window, if any.
pub fn window() -> Option<web_sys::Window> {
    web_sys::window()
}

/// The live document root.
#[derive(Debug)]
pub struct WebDocument {
    document: web_sys::Document,
    root: web_sys::Element,
    sheets: RefCell<IndexMap<u64, web_sys::Element>>,
    next_sheet: Cell<u64>,
}

impl WebDocument {
    /// Attach to `window.document`. Returns `None` outside a browsing context.
    pub fn new() -> Option<Self> {
        let document = window()?.document()?;
        let root = document.document_element()?;
        Some(Self {
            document,
            root,
            sheets: RefCell::new(IndexMap::new()),
            next_sheet: Cell::new(0),
        })
    }

    fn style(&self) -> Option<web_sys::CssStyleDeclaration> {
        self.root
            .dyn_ref::<web_sys::HtmlElement>()
            .map(|element| element.style())
    }
}

impl Document for WebDocument {
    fn attribute(&self, name: &str) -> Option<String> {
        self.root.get_attribute(name)
    }

    fn set_attribute(&self, name: &str, value: &str) {
        if let Err(e) = self.root.set_attribute(name, value) {
            log::warn!("Failed to set root attribute {}: {:?}", name, e);
        }
    }

    fn remove_attribute(&self, name: &str) {
        if let Err(e) = self.root.remove_attribute(name) {
            log::warn!("Failed to remove root attribute {}: {:?}", name, e);
        }
    }

    fn has_class(&self, class: &str) -> bool {
        self.root.class_list().contains(class)
    }

    fn add_class(&self, class: &str) {
        if let Err(e) = self.root.class_list().add_1(class) {
            log::warn!("Failed to add root class {}: {:?}", class, e);
        }
    }

    fn remove_classes(&self, classes: &[&str]) {
        let tokens = js_sys::Array::new();
        for class in classes {
            tokens.push(&wasm_bindgen::JsValue::from_str(class));
        }
        if let Err(e) = self.root.class_list().remove(&tokens) {
            log::warn!("Failed to remove root classes: {:?}", e);
        }
    }

    fn style_property(&self, property: &str) -> Option<String> {
        self.style()
            .and_then(|style| style.get_property_value(property).ok())
            .filter(|value| !value.is_empty())
    }

    fn set_style_property(&self, property: &str, value: &str) {
        if let Some(style) = self.style() {
            if let Err(e) = style.set_property(property, value) {
                log::warn!("Failed to set root style {}: {:?}", property, e);
            }
        }
    }

    fn remove_style_property(&self, property: &str) {
        if let Some(style) = self.style() {
            if let Err(e) = style.remove_property(property) {
                log::warn!("Failed to clear root style {}: {:?}", property, e);
            }
        }
    }

    fn insert_style(&self, css: &str) -> StyleHandle {
        let id = self.next_sheet.get();
        self.next_sheet.set(id + 1);

        let inserted = self.document.create_element("style").and_then(|element| {
            element.append_child(&self.document.create_text_node(css))?;
            if let Some(head) = self.document.head() {
                head.append_child(&element)?;
            }
            Ok(element)
        });
        match inserted {
            Ok(element) => {
                self.sheets.borrow_mut().insert(id, element);
            },
            Err(e) => log::warn!("Failed to insert stylesheet: {:?}", e),
        }
        StyleHandle(id)
    }

    fn remove_style(&self, handle: StyleHandle) {
        let element = self.sheets.borrow_mut().shift_remove(&handle.0);
        if let Some(element) = element {
            element.remove();
        }
    }

    fn recompute_style(&self) {
        let (Some(window), Some(body)) = (window(), self.document.body()) else {
            return;
        };
        // Reading a computed value forces a synchronous style flush.
        if let Ok(Some(style)) = window.get_computed_style(&body) {
            let _ = style.get_property_value("opacity");
        }
    }
}

/// The `prefers-color-scheme` media query.
#[derive(Debug)]
pub struct MediaQuerySensor {
    query: Option<web_sys::MediaQueryList>,
}

impl MediaQuerySensor {
    /// Evaluate the query on the current window.
    ///
    /// If the query is unavailable the sensor reports [ColorScheme::Light]
    /// and never notifies.
    pub fn new() -> Self {
        let query = window().and_then(|window| window.match_media(DARK_QUERY).ok().flatten());
        if query.is_none() {
            log::warn!("matchMedia unavailable, assuming {}", ColorScheme::Light);
        }
        Self { query }
    }
}

impl Default for MediaQuerySensor {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemPreferenceSensor for MediaQuerySensor {
    fn current(&self) -> ColorScheme {
        match &self.query {
            Some(query) if query.matches() => ColorScheme::Dark,
            _ => ColorScheme::Light,
        }
    }

    fn subscribe(&self, listener: Listener<ColorScheme>) -> Subscription {
        let Some(query) = self.query.clone() else {
            return Subscription::detached();
        };

        let closure = Closure::wrap(Box::new(move |event: web_sys::MediaQueryListEvent| {
            listener(&if event.matches() {
                ColorScheme::Dark
            } else {
                ColorScheme::Light
            });
        }) as Box<dyn FnMut(_)>);

        if let Err(e) =
            query.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref())
        {
            log::warn!("Failed to listen for color scheme changes: {:?}", e);
            return Subscription::detached();
        }

        Subscription::new(move || {
            let _ = query
                .remove_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
            drop(closure);
        })
    }
}

/// Defers tasks with `setTimeout(task, 1)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TimeoutScheduler;

impl Scheduler for TimeoutScheduler {
    fn defer(&self, task: Task) {
        let Some(window) = window() else {
            log::warn!("No window to schedule a task on, dropping it");
            return;
        };
        let callback = Closure::once_into_js(move || task());
        if let Err(e) = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.unchecked_ref(),
            1,
        ) {
            log::error!("setTimeout failed: {:?}", e);
        }
    }
}
