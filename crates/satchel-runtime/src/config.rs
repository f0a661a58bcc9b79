// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Runtime configuration

use crate::error::{Result, RuntimeError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Directory that packaged logical paths live under
pub const DEFAULT_RESOURCE_ROOT: &str = "Resources";

/// Asset holding the manifest of packaged files
pub const DEFAULT_MANIFEST: &str = "index.json";

/// Directory name probed for bare identifiers
pub const DEFAULT_SEARCH_DIR: &str = "node_modules";

/// Configuration for a [`Runtime`](crate::Runtime).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Prefix prepended to logical paths when talking to the asset provider
    pub resource_root: String,

    /// Asset name of the manifest
    pub manifest: String,

    /// Search directory name (`node_modules`)
    pub search_dir: String,

    /// Scheme used to build consumer source URLs for native wrappers
    pub source_url_scheme: String,

    /// Suffix of the synthesized key a native module's companion is loaded under
    pub companion_suffix: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            resource_root: DEFAULT_RESOURCE_ROOT.to_string(),
            manifest: DEFAULT_MANIFEST.to_string(),
            search_dir: DEFAULT_SEARCH_DIR.to_string(),
            source_url_scheme: "app://".to_string(),
            companion_suffix: ".companion".to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Defaults overridden by `SATCHEL_*` environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.load_from_env();
        config
    }

    /// Load a JSON configuration file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| RuntimeError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `SATCHEL_RESOURCE_ROOT`, `SATCHEL_MANIFEST` and `SATCHEL_SEARCH_DIR`
    pub fn load_from_env(&mut self) {
        if let Ok(value) = std::env::var("SATCHEL_RESOURCE_ROOT") {
            self.resource_root = value;
        }
        if let Ok(value) = std::env::var("SATCHEL_MANIFEST") {
            self.manifest = value;
        }
        if let Ok(value) = std::env::var("SATCHEL_SEARCH_DIR") {
            self.search_dir = value;
        }
    }

    /// Reject values that would make resolution meaningless
    pub fn validate(&self) -> Result<()> {
        if self.manifest.is_empty() {
            return Err(RuntimeError::Config("manifest name must not be empty".into()));
        }
        if self.search_dir.is_empty() || self.search_dir.contains('/') {
            return Err(RuntimeError::Config(format!(
                "search_dir must be a single path segment, got '{}'",
                self.search_dir
            )));
        }
        Ok(())
    }

    /// Asset name backing a logical path (`/app.js` -> `Resources/app.js`)
    pub fn asset_name(&self, logical: &str) -> String {
        format!("{}{}", self.resource_root, logical)
    }

    /// Logical path for an asset name, if it lives under the resource root
    pub fn logical_path<'a>(&self, asset: &'a str) -> Option<&'a str> {
        asset
            .strip_prefix(self.resource_root.as_str())
            .filter(|rest| rest.starts_with('/'))
    }
}
