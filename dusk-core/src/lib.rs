// SPDX-License-Identifier: LGPL-3.0-only
#![warn(missing_docs)]

//! Core library for dusk => See `dusk` crate.
//!
//! Contains the host boundaries the theme engine is written against: the
//! signal and subscription primitives, the deferred task queue, the document
//! the theme is projected onto, and the system color-scheme sensor.
//!
//! Everything in this crate is single-threaded (`Rc`/`RefCell`): the engine
//! runs on one event-processing thread, like a browser main thread.

/// Contains the signal system and the [signal::Subscription] cancellation handle.
pub mod signal;

/// Contains the [tasks::Scheduler] trait and the host-driven [tasks::TaskQueue].
pub mod tasks;

/// Contains the [document::Document] boundary and the in-memory [document::VirtualDocument].
pub mod document;

/// Contains the [platform::ColorScheme] type and system preference sensors.
pub mod platform;

/// Browser backends built on `web-sys`.
#[cfg(target_arch = "wasm32")]
pub mod web;
