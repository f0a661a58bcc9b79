// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Native module bridging
//!
//! A native module is a capability object provided by the host, optionally
//! extended by script code shipped alongside it (its *companion*). Each
//! consuming module gets its own [`CapabilityWrapper`] that records where the
//! calls come from, while all wrappers share one [`NativeModule`].

use crate::builtins::PathCapability;
use crate::error::{Result, RuntimeError};
use crate::value::{Object, Value};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::{Arc, OnceLock};

/// A host capability exposed to scripts
pub trait Capability: Send + Sync {
    /// Root identifier the capability is registered under
    fn name(&self) -> &str;

    /// Read a property
    fn property(&self, key: &str) -> Option<Value>;

    /// Names of the readable properties
    fn property_names(&self) -> Vec<String> {
        Vec::new()
    }

    /// Invoke a method
    fn invoke(&self, method: &str, _args: &[Value]) -> Result<Value> {
        Err(RuntimeError::type_error(format!(
            "{}.{} is not a function",
            self.name(),
            method
        )))
    }
}

/// Host-side registry of native bindings and their companions
pub trait NativeRegistry: Send + Sync {
    /// Check if a binding exists for a root identifier
    fn has_binding(&self, root: &str) -> bool;

    /// Obtain the binding for a root identifier
    fn binding(&self, root: &str) -> Option<Arc<dyn Capability>>;

    /// Check if the module rooted at `root` ships companion code
    fn has_companion(&self, root: &str) -> bool;

    /// Companion source for `root` itself or for a sub-path id (`root/lib/x`)
    fn companion_source(&self, id: &str) -> Option<String>;
}

/// Registry backed by in-memory tables
#[derive(Default)]
pub struct StaticRegistry {
    bindings: HashMap<String, Arc<dyn Capability>>,
    companions: HashMap<String, String>,
}

impl StaticRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry exposing the built-in `path` module
    pub fn with_builtins() -> Self {
        Self::new().with_binding(PathCapability::default())
    }

    /// Register a binding under its own name
    pub fn with_binding(mut self, capability: impl Capability + 'static) -> Self {
        self.register(Arc::new(capability));
        self
    }

    /// Register companion code for a root or sub-path id
    pub fn with_companion(mut self, id: impl Into<String>, source: impl Into<String>) -> Self {
        self.companions.insert(id.into(), source.into());
        self
    }

    /// Register a shared binding
    pub fn register(&mut self, capability: Arc<dyn Capability>) {
        self.bindings.insert(capability.name().to_string(), capability);
    }

    /// Registered root identifiers, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.bindings.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl NativeRegistry for StaticRegistry {
    fn has_binding(&self, root: &str) -> bool {
        self.bindings.contains_key(root)
    }

    fn binding(&self, root: &str) -> Option<Arc<dyn Capability>> {
        self.bindings.get(root).cloned()
    }

    fn has_companion(&self, root: &str) -> bool {
        self.companions.keys().any(|id| {
            id == root
                || id
                    .strip_prefix(root)
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }

    fn companion_source(&self, id: &str) -> Option<String> {
        self.companions.get(id).cloned()
    }
}

impl fmt::Debug for StaticRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticRegistry")
            .field("bindings", &self.names())
            .field("companions", &self.companions.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// A native module shared by every consumer
pub struct NativeModule {
    id: String,
    capability: Arc<dyn Capability>,
    companion: OnceLock<Object>,
}

impl NativeModule {
    pub(crate) fn new(id: impl Into<String>, capability: Arc<dyn Capability>) -> Self {
        Self {
            id: id.into(),
            capability,
            companion: OnceLock::new(),
        }
    }

    /// Root identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The host capability
    pub fn capability(&self) -> &Arc<dyn Capability> {
        &self.capability
    }

    /// Companion exports, once merged
    pub fn companion(&self) -> Option<&Object> {
        self.companion.get()
    }

    /// Merge companion exports. Only the first merge takes effect.
    pub(crate) fn attach_companion(&self, exports: Object) -> bool {
        self.companion.set(exports).is_ok()
    }

    /// Companion properties shadow capability properties
    pub fn get(&self, key: &str) -> Option<Value> {
        self.companion
            .get()
            .and_then(|exports| exports.get(key))
            .or_else(|| self.capability.property(key))
    }

    /// Visible property names, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: BTreeSet<String> = self.capability.property_names().into_iter().collect();
        if let Some(exports) = self.companion.get() {
            keys.extend(exports.keys());
        }
        keys.into_iter().collect()
    }
}

impl fmt::Debug for NativeModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeModule")
            .field("id", &self.id)
            .field("companion", &self.companion.get().is_some())
            .finish()
    }
}

/// Per-consumer view of a native module
pub struct CapabilityWrapper {
    native: Arc<NativeModule>,
    source_url: String,
}

impl CapabilityWrapper {
    pub(crate) fn new(native: Arc<NativeModule>, source_url: impl Into<String>) -> Self {
        Self {
            native,
            source_url: source_url.into(),
        }
    }

    /// Root identifier of the wrapped module
    pub fn id(&self) -> &str {
        self.native.id()
    }

    /// URL of the consuming module (`app://app/x.js`)
    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    /// The shared native module
    pub fn native(&self) -> &Arc<NativeModule> {
        &self.native
    }

    /// Property lookup, companion first
    pub fn get(&self, key: &str) -> Option<Value> {
        self.native.get(key)
    }

    /// Visible property names
    pub fn keys(&self) -> Vec<String> {
        self.native.keys()
    }

    /// Invoke a capability method on behalf of the consumer
    pub fn invoke(&self, method: &str, args: &[Value]) -> Result<Value> {
        tracing::trace!("{} -> {}.{}", self.source_url, self.id(), method);
        self.native.capability().invoke(method, args)
    }

    /// Check if two wrappers share one native module
    pub fn same_native(&self, other: &CapabilityWrapper) -> bool {
        Arc::ptr_eq(&self.native, &other.native)
    }
}

impl fmt::Debug for CapabilityWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityWrapper")
            .field("id", &self.id())
            .field("source_url", &self.source_url)
            .finish()
    }
}
