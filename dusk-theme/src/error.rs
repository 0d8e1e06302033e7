//! # Theme Error Types
//!
//! Errors surface only while building a configuration or opening a store. Once a
//! [ThemeManager](crate::manager::ThemeManager) runs, every run-time failure
//! (store unreachable, no system preference, malformed external value)
//! degrades to a defined default and is logged instead.

use std::path::PathBuf;
use thiserror::Error;

use dusk_services::StoreError;

/// Errors that can occur while configuring the theme engine.
#[derive(Error, Debug)]
pub enum ThemeError {
    /// An attribute target is neither `class` nor `data-<name>`.
    #[error("Invalid attribute target '{attribute}': expected \"class\" or \"data-<name>\"")]
    InvalidAttribute {
        /// The rejected attribute.
        attribute: String,
    },

    /// The configuration names no attribute target.
    #[error("At least one attribute target is required")]
    NoAttributeTargets,

    /// The storage key is empty.
    #[error("The storage key must not be empty")]
    EmptyStorageKey,

    /// `"system"` cannot be forced; a forced theme bypasses system resolution.
    #[error("The \"system\" theme cannot be forced")]
    ForcedSystemTheme,

    /// A configuration file could not be read.
    #[error("Failed to read theme configuration {path:?}: {source}")]
    ConfigRead {
        /// The file that could not be read.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A configuration file is not valid TOML or has the wrong shape.
    #[error("Failed to parse theme configuration: {details}")]
    ConfigParse {
        /// Details about the parse error.
        details: String,
    },

    /// The configuration could not be written as TOML.
    #[error("Failed to serialize theme configuration: {details}")]
    ConfigSerialize {
        /// Details about the serialization error.
        details: String,
    },

    /// A preference store could not be opened.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ThemeError {
    /// Create an [ThemeError::InvalidAttribute] error.
    pub fn invalid_attribute(attribute: impl Into<String>) -> Self {
        Self::InvalidAttribute {
            attribute: attribute.into(),
        }
    }

    /// Create a [ThemeError::ConfigRead] error.
    pub fn config_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ConfigRead {
            path: path.into(),
            source,
        }
    }

    /// Create a [ThemeError::ConfigParse] error.
    pub fn config_parse(details: impl Into<String>) -> Self {
        Self::ConfigParse {
            details: details.into(),
        }
    }
}

/// Result type for theme configuration operations.
pub type ThemeResult<T> = Result<T, ThemeError>;
