// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Parsed path object

use serde::{Deserialize, Serialize};

/// Parsed path object, as returned by `path.parse()` and consumed by `path.format()`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathComponents {
    /// Root (e.g., "/" or "C:\\")
    pub root: String,
    /// Directory (e.g., "/home/user")
    pub dir: String,
    /// Base name with extension (e.g., "file.txt")
    pub base: String,
    /// Name without extension (e.g., "file")
    pub name: String,
    /// Extension including dot (e.g., ".txt")
    pub ext: String,
}
