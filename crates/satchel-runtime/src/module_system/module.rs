// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Script modules and their lifecycle

use crate::error::{Result, RuntimeError};
use crate::module_system::cache::CacheEntry;
use crate::native::CapabilityWrapper;
use crate::runtime::Runtime;
use crate::value::{Object, Value};
use parking_lot::{Mutex, RwLock};
use satchel_path::PathApi;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Identifier of the application entry module
pub const MAIN_ID: &str = ".";

/// Lifecycle state of a [`Module`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleState {
    /// Created, not yet loaded
    Unloaded,
    /// Cached and executing; exports may be partial
    Reserved,
    /// Executed successfully
    Loaded,
    /// Execution raised; the message is replayed to later requirers
    Failed(String),
}

/// A loaded (or loading) script module
pub struct Module {
    id: String,
    filename: String,
    dirname: String,
    parent: Option<String>,
    search_paths: Vec<String>,
    is_service: bool,
    exports: RwLock<Value>,
    state: Mutex<ModuleState>,
    wrapper_cache: Mutex<HashMap<String, Arc<CapabilityWrapper>>>,
}

impl Module {
    /// Create an unloaded module
    pub fn new(
        id: impl Into<String>,
        filename: impl Into<String>,
        parent: Option<&Module>,
        paths: &PathApi,
        search_dir: &str,
    ) -> Self {
        let filename = filename.into();
        let dirname = paths.resolve(&[paths.dirname(&filename)]);
        let search_paths = search_paths(paths, &dirname, search_dir);

        Self {
            id: id.into(),
            filename,
            dirname,
            parent: parent.map(|p| p.filename.clone()),
            search_paths,
            is_service: false,
            exports: RwLock::new(Value::Object(Object::new())),
            state: Mutex::new(ModuleState::Unloaded),
            wrapper_cache: Mutex::new(HashMap::new()),
        }
    }

    /// Mark the module as a background service entry point
    pub fn service(mut self, is_service: bool) -> Self {
        self.is_service = is_service;
        self
    }

    /// Module identifier (`.` for the main module)
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Absolute logical filename; also the cache key
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Resolved directory of the filename
    pub fn dirname(&self) -> &str {
        &self.dirname
    }

    /// Filename of the module that first required this one
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Search directories for bare identifiers, nearest first
    pub fn search_paths(&self) -> &[String] {
        &self.search_paths
    }

    /// Whether this is a background service entry point
    pub fn is_service(&self) -> bool {
        self.is_service
    }

    /// Whether this module runs unwrapped at top level
    pub fn is_entry(&self) -> bool {
        self.id == MAIN_ID && !self.is_service
    }

    /// Current exports
    pub fn exports(&self) -> Value {
        self.exports.read().clone()
    }

    /// Replace exports (`module.exports = ...`)
    pub fn set_exports(&self, exports: impl Into<Value>) {
        *self.exports.write() = exports.into();
    }

    /// Current lifecycle state
    pub fn state(&self) -> ModuleState {
        self.state.lock().clone()
    }

    /// Whether execution completed successfully
    pub fn loaded(&self) -> bool {
        *self.state.lock() == ModuleState::Loaded
    }

    pub(crate) fn mark_loaded(&self) {
        *self.state.lock() = ModuleState::Loaded;
    }

    pub(crate) fn cached_wrapper(&self, id: &str) -> Option<Arc<CapabilityWrapper>> {
        self.wrapper_cache.lock().get(id).cloned()
    }

    pub(crate) fn cache_wrapper(&self, id: &str, wrapper: Arc<CapabilityWrapper>) {
        self.wrapper_cache.lock().insert(id.to_string(), wrapper);
    }

    /// Load the module: read its source (unless given), register it in the
    /// cache and execute it.
    ///
    /// The cache entry exists before execution starts, so a cycle back into
    /// this module observes its partial exports. A module loads at most once.
    pub fn load(self: &Arc<Self>, runtime: &Runtime, source: Option<String>) -> Result<()> {
        {
            let mut state = self.state.lock();
            match &*state {
                ModuleState::Unloaded => *state = ModuleState::Reserved,
                ModuleState::Reserved | ModuleState::Loaded => {
                    return Err(RuntimeError::AlreadyLoaded {
                        filename: self.filename.clone(),
                    });
                }
                ModuleState::Failed(reason) => {
                    return Err(RuntimeError::LoadFailed {
                        filename: self.filename.clone(),
                        reason: reason.clone(),
                    });
                }
            }
        }

        let source = match source {
            Some(source) => source,
            None => match runtime.read_source(&self.filename) {
                Ok(source) => source,
                Err(err) => {
                    *self.state.lock() = ModuleState::Unloaded;
                    return Err(err);
                }
            },
        };

        runtime
            .cache()
            .insert(self.filename.clone(), CacheEntry::Module(Arc::clone(self)));
        debug!("Loading module '{}' ({})", self.id, self.filename);

        match runtime.execute(self, &source) {
            Ok(()) => {
                self.mark_loaded();
                Ok(())
            }
            Err(err) => {
                warn!("Module '{}' failed to execute: {}", self.filename, err);
                *self.state.lock() = ModuleState::Failed(err.to_string());
                Err(err)
            }
        }
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("id", &self.id)
            .field("filename", &self.filename)
            .field("state", &self.state())
            .finish()
    }
}

/// Search directories for a module living in `start_dir`.
///
/// Walks from the directory up to the root, skipping segments that are
/// themselves search directories, and always ends with `/<search_dir>`.
pub fn search_paths(paths: &PathApi, start_dir: &str, search_dir: &str) -> Vec<String> {
    let start = paths.resolve(&[start_dir]);
    let root_dir = format!("/{search_dir}");
    if start == "/" {
        return vec![root_dir];
    }

    let parts: Vec<&str> = start.split('/').collect();
    let mut dirs = Vec::with_capacity(parts.len());
    for i in (0..parts.len()).rev() {
        let part = parts[i];
        if part.is_empty() || part == search_dir {
            continue;
        }
        let dir = parts[..=i].join("/");
        dirs.push(paths.join(&[dir.as_str(), search_dir]));
    }
    dirs.push(root_dir);
    dirs
}
