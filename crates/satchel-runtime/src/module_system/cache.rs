// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module cache for require()

use crate::module_system::module::Module;
use crate::native::NativeModule;
use dashmap::DashMap;
use std::sync::Arc;

/// Cached module entry
#[derive(Debug, Clone)]
pub enum CacheEntry {
    /// Script, JSON or companion module keyed by filename
    Module(Arc<Module>),
    /// Native module keyed by root identifier
    Native(Arc<NativeModule>),
}

impl CacheEntry {
    /// The script module, if this entry is one
    pub fn as_module(&self) -> Option<&Arc<Module>> {
        match self {
            CacheEntry::Module(module) => Some(module),
            CacheEntry::Native(_) => None,
        }
    }

    /// The native module, if this entry is one
    pub fn as_native(&self) -> Option<&Arc<NativeModule>> {
        match self {
            CacheEntry::Native(native) => Some(native),
            CacheEntry::Module(_) => None,
        }
    }
}

/// Thread-safe module cache
///
/// Entries are cloned out on lookup; no map guard outlives a call, so a
/// module may require other modules while its own entry is present.
#[derive(Debug, Default)]
pub struct ModuleCache {
    /// Cache mapping filenames and native root ids to modules
    cache: DashMap<String, CacheEntry>,
}

impl ModuleCache {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a cached entry by key
    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        self.cache.get(key).map(|entry| entry.clone())
    }

    /// Get a cached script module by filename
    pub fn module(&self, key: &str) -> Option<Arc<Module>> {
        self.get(key).and_then(|entry| entry.as_module().cloned())
    }

    /// Check if a key is cached
    pub fn contains(&self, key: &str) -> bool {
        self.cache.contains_key(key)
    }

    /// Add an entry, returning the one it replaced
    pub fn insert(&self, key: impl Into<String>, entry: CacheEntry) -> Option<CacheEntry> {
        self.cache.insert(key.into(), entry)
    }

    /// Remove an entry
    pub fn remove(&self, key: &str) -> Option<CacheEntry> {
        self.cache.remove(key).map(|(_, v)| v)
    }

    /// Clear the entire cache
    pub fn clear(&self) {
        self.cache.clear();
    }

    /// All cached keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.cache.iter().map(|entry| entry.key().clone()).collect();
        keys.sort();
        keys
    }

    /// Get the number of cached modules
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
