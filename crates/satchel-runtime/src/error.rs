// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Error types for the module runtime

use satchel_path::PathError;
use thiserror::Error;

/// Result type for module runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Errors that can occur while resolving, loading or executing modules
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Wrong argument type or shape
    #[error("TypeError: {0}")]
    TypeArgument(String),

    /// No resolution strategy produced a module
    #[error("Requested module not found: {id}")]
    NotFound {
        /// Identifier as originally requested
        id: String,
    },

    /// `load()` was invoked on a module that is already loaded or loading
    #[error("Module already loaded: {filename}")]
    AlreadyLoaded {
        /// Filename of the offending module
        filename: String,
    },

    /// The module threw while executing and is kept as a failed entry
    #[error("Module '{filename}' failed to load: {reason}")]
    LoadFailed {
        /// Filename of the failed module
        filename: String,
        /// Error raised by the original execution
        reason: String,
    },

    /// Path algebra error (argument types, no common root)
    #[error(transparent)]
    Path(#[from] PathError),

    /// The manifest lists a file the asset provider cannot read
    #[error("Asset not found: {path}")]
    AssetMissing {
        /// Asset name that was requested
        path: String,
    },

    /// JSON module or manifest could not be parsed
    #[error("JSON parse error in '{filename}': {source}")]
    InvalidJson {
        /// File that failed to parse
        filename: String,
        /// Parser error
        #[source]
        source: serde_json::Error,
    },

    /// Error raised by the executor while running a script
    #[error("Error in '{filename}': {message}")]
    Script {
        /// Script that raised the error
        filename: String,
        /// Error message
        message: String,
    },

    /// The registry advertised a binding it could not produce
    #[error("Unable to load native module: {id}")]
    NativeUnavailable {
        /// Root identifier of the native module
        id: String,
    },

    /// Invalid runtime configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system error
    #[error("File system error: {0}")]
    Io(#[from] std::io::Error),
}

impl RuntimeError {
    /// Create a new TypeError
    pub fn type_error(msg: impl Into<String>) -> Self {
        Self::TypeArgument(msg.into())
    }

    /// Create a module not found error
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Create a script error, as raised by an executor
    pub fn script(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Script {
            filename: filename.into(),
            message: message.into(),
        }
    }
}
