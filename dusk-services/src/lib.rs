// SPDX-License-Identifier: LGPL-3.0-only
#![warn(missing_docs)]

//! Preference stores for dusk => See `dusk` crate.
//!
//! A preference store is a synchronous key-value store scoped to an origin.
//! The theme engine keeps exactly one value in it (the requested theme) and
//! listens for changes made by other contexts of the same origin.
//!
//! Backends:
//! - [memory::MemoryOrigin] / [memory::MemoryStore]: in-process, one handle per
//!   simulated tab.
//! - [file::FileStore]: a TOML file, shared between processes.
//! - `web::LocalStore` (wasm32): `window.localStorage`.

/// Contains the [error::StoreError] type.
pub mod error;

/// Contains the [store::PreferenceStore] trait.
pub mod store;

/// Contains the in-memory origin.
pub mod memory;

/// Contains the file-backed store.
#[cfg(not(target_arch = "wasm32"))]
pub mod file;

/// Contains the `localStorage` store.
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use error::{StoreError, StoreResult};
pub use store::{PreferenceStore, StorageEvent};
