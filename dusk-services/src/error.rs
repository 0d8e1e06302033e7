// SPDX-License-Identifier: LGPL-3.0-only

//! # Store Error Types
//!
//! Failures of a preference store. None of these are fatal to the engine: the
//! theme manager logs them and keeps its in-memory state authoritative.

use std::path::PathBuf;
use thiserror::Error;

/// Errors a [PreferenceStore](crate::store::PreferenceStore) can report.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store cannot be used at all (disabled by policy, sandboxed, no
    /// storage in this context).
    #[error("Preference store unavailable: {reason}")]
    Unavailable {
        /// Why the store is unavailable.
        reason: String,
    },

    /// The write would exceed the store's size limit.
    #[error("Writing '{key}' exceeds the store quota of {limit} bytes")]
    QuotaExceeded {
        /// The key being written.
        key: String,
        /// The quota in bytes.
        limit: usize,
    },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file exists but is not a valid preference file.
    #[error("Failed to parse preference file {path:?}: {details}")]
    Parse {
        /// The file that failed to parse.
        path: PathBuf,
        /// Details about the parse error.
        details: String,
    },

    /// The preferences could not be serialized.
    #[error("Failed to serialize preferences: {0}")]
    Serialize(String),

    /// Error setting up the file watcher.
    #[cfg(not(target_arch = "wasm32"))]
    #[error("Failed to watch preference file: {0}")]
    Watcher(#[from] notify::Error),
}

impl StoreError {
    /// Create an [StoreError::Unavailable] error.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Create a [StoreError::QuotaExceeded] error.
    pub fn quota_exceeded(key: impl Into<String>, limit: usize) -> Self {
        Self::QuotaExceeded {
            key: key.into(),
            limit,
        }
    }

    /// Create a [StoreError::Parse] error.
    pub fn parse(path: impl Into<PathBuf>, details: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            details: details.into(),
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            StoreError::unavailable("disabled").to_string(),
            "Preference store unavailable: disabled"
        );
        assert_eq!(
            StoreError::quota_exceeded("theme", 8).to_string(),
            "Writing 'theme' exceeds the store quota of 8 bytes"
        );
    }
}
