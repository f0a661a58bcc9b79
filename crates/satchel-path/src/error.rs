// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Error types for path operations

use thiserror::Error;

/// Result type for path operations
pub type Result<T> = std::result::Result<T, PathError>;

/// Errors raised by the path algebra and its script binding
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// An argument had the wrong dynamic type
    #[error("TypeError: {0}")]
    TypeArgument(String),

    /// `relative()` walked up to a root without finding a common prefix
    #[error("No common root between '{from}' and '{to}'")]
    AmbiguousRoot {
        /// Resolved source path
        from: String,
        /// Resolved target path
        to: String,
    },

    /// The binding was asked for a method it does not expose
    #[error("TypeError: path.{0} is not a function")]
    UnknownMethod(String),
}

impl PathError {
    /// Create a TypeError for an argument of the wrong type
    pub fn invalid_arg_type(name: &str, expected: &str, received: &str) -> Self {
        Self::TypeArgument(format!(
            "The \"{name}\" argument must be of type {expected}. Received type {received}"
        ))
    }
}
