// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Packaged application assets
//!
//! The runtime never touches the host file system directly. Sources are read
//! through an [`AssetProvider`], and existence checks go through the
//! [`Manifest`], a flat JSON object whose keys are the packaged asset names.

use crate::config::{DEFAULT_MANIFEST, DEFAULT_RESOURCE_ROOT, RuntimeConfig};
use crate::error::{Result, RuntimeError};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;
use walkdir::WalkDir;

/// Source of packaged file contents
pub trait AssetProvider: Send + Sync {
    /// Read an asset by name (e.g. `Resources/app.js`)
    fn read_asset(&self, name: &str) -> Option<String>;
}

impl<T: AssetProvider + ?Sized> AssetProvider for Arc<T> {
    fn read_asset(&self, name: &str) -> Option<String> {
        (**self).read_asset(name)
    }
}

impl<T: AssetProvider + ?Sized> AssetProvider for Box<T> {
    fn read_asset(&self, name: &str) -> Option<String> {
        (**self).read_asset(name)
    }
}

/// Set of packaged asset names
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    entries: HashSet<String>,
}

impl Manifest {
    /// Empty manifest; every existence check fails
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a manifest. Values are metadata and only the keys matter.
    pub fn parse(name: &str, content: &str) -> Result<Self> {
        let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(content)
            .map_err(|source| RuntimeError::InvalidJson {
                filename: name.to_string(),
                source,
            })?;
        Ok(map.into_iter().map(|(k, _)| k).collect())
    }

    /// Check if an asset is packaged
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains(name)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the manifest lists nothing
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in sorted order
    pub fn entries(&self) -> Vec<&str> {
        let mut entries: Vec<&str> = self.entries.iter().map(String::as_str).collect();
        entries.sort_unstable();
        entries
    }
}

impl FromIterator<String> for Manifest {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

fn manifest_json<'a>(names: impl IntoIterator<Item = &'a String>) -> String {
    let map: BTreeMap<&str, bool> = names.into_iter().map(|n| (n.as_str(), true)).collect();
    serde_json::to_string(&map).unwrap_or_else(|_| "{}".to_string())
}

/// In-memory assets, for embedding and tests
///
/// Files added with [`with_file`](Self::with_file) are placed under the
/// resource root and listed in a manifest generated on demand, unless an
/// explicit manifest asset was supplied.
#[derive(Debug, Clone)]
pub struct MemoryAssets {
    resource_root: String,
    manifest: String,
    files: HashMap<String, String>,
    indexed: Vec<String>,
}

impl Default for MemoryAssets {
    fn default() -> Self {
        Self {
            resource_root: DEFAULT_RESOURCE_ROOT.to_string(),
            manifest: DEFAULT_MANIFEST.to_string(),
            files: HashMap::new(),
            indexed: Vec::new(),
        }
    }
}

impl MemoryAssets {
    /// Create an empty provider using the default layout
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty provider matching a configuration's layout
    pub fn for_config(config: &RuntimeConfig) -> Self {
        Self {
            resource_root: config.resource_root.clone(),
            manifest: config.manifest.clone(),
            ..Default::default()
        }
    }

    /// Add a packaged file at a logical path (`/app/x.js`)
    pub fn with_file(mut self, logical: &str, source: impl Into<String>) -> Self {
        self.insert_file(logical, source);
        self
    }

    /// Add a raw asset that is not listed in the manifest
    pub fn with_asset(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.insert(name.into(), content.into());
        self
    }

    /// Add a packaged file at a logical path
    pub fn insert_file(&mut self, logical: &str, source: impl Into<String>) {
        let name = format!("{}{}", self.resource_root, logical);
        self.files.insert(name.clone(), source.into());
        self.indexed.push(name);
    }
}

impl AssetProvider for MemoryAssets {
    fn read_asset(&self, name: &str) -> Option<String> {
        match self.files.get(name) {
            Some(content) => Some(content.clone()),
            None if name == self.manifest => Some(manifest_json(&self.indexed)),
            None => None,
        }
    }
}

/// Assets read from a directory on disk
///
/// When the directory has no manifest one is generated by walking the
/// resource root.
#[derive(Debug, Clone)]
pub struct DirectoryAssets {
    root: PathBuf,
    manifest: String,
    generated: Option<String>,
}

impl DirectoryAssets {
    /// Open an asset directory laid out per `config`
    pub fn open(root: impl Into<PathBuf>, config: &RuntimeConfig) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(RuntimeError::Config(format!(
                "asset directory not found: {}",
                root.display()
            )));
        }

        let generated = if root.join(&config.manifest).is_file() {
            None
        } else {
            Some(Self::generate_manifest(&root, &config.resource_root)?)
        };

        Ok(Self {
            root,
            manifest: config.manifest.clone(),
            generated,
        })
    }

    /// Directory the assets are read from
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether the manifest was generated rather than read from disk
    pub fn has_generated_manifest(&self) -> bool {
        self.generated.is_some()
    }

    fn generate_manifest(root: &Path, resource_root: &str) -> Result<String> {
        let base = root.join(resource_root);
        let mut names = Vec::new();

        if base.is_dir() {
            for entry in WalkDir::new(&base).follow_links(true) {
                let entry = entry.map_err(|e| RuntimeError::Io(e.into()))?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let Ok(relative) = entry.path().strip_prefix(&base) else {
                    continue;
                };
                let logical: Vec<String> = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect();
                names.push(format!("{}/{}", resource_root, logical.join("/")));
            }
        }

        debug!(
            "Generated manifest for {} ({} files)",
            root.display(),
            names.len()
        );
        Ok(manifest_json(&names))
    }
}

impl AssetProvider for DirectoryAssets {
    fn read_asset(&self, name: &str) -> Option<String> {
        if name == self.manifest {
            if let Some(generated) = &self.generated {
                return Some(generated.clone());
            }
        }
        std::fs::read_to_string(self.root.join(name)).ok()
    }
}
