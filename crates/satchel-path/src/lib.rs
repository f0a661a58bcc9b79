// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # satchel-path
//!
//! Node.js-compatible `path` semantics implemented as pure string algebra,
//! for both separator conventions:
//!
//! - **POSIX**: a single `/` separator and a `/` root.
//! - **Win32**: `\` or `/` separators, drive roots (`C:`, `C:\`), rooted
//!   paths (`\dir`) and UNC prefixes (`\\host\share`).
//!
//! ```rust
//! use satchel_path::PathApi;
//!
//! let posix = PathApi::posix();
//! assert_eq!(posix.normalize("/a/b/../c"), "/a/c");
//! assert_eq!(posix.relative("/a/b", "/a/c/d").unwrap(), "../c/d");
//!
//! let win32 = PathApi::win32();
//! assert_eq!(win32.join(&["C:\\app", "lib/x.js"]), "C:\\app\\lib\\x.js");
//! ```
//!
//! The [`binding`] module exposes the same operations to dynamically typed
//! callers and performs the argument type checks scripts expect.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod api;
pub mod binding;
mod components;
mod error;
mod style;

pub use api::PathApi;
pub use binding::{PathModule, PathValue};
pub use components::PathComponents;
pub use error::{PathError, Result};
pub use style::Style;
