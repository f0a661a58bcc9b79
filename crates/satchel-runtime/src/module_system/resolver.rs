// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module resolver
//!
//! Maps a requested identifier to the module that should satisfy it. File
//! existence is answered by the packaged manifest; the only asset read during
//! resolution is `package.json`, which is loaded (and cached) as a JSON module.

use crate::error::{Result, RuntimeError};
use crate::module_system::Module;
use crate::runtime::Runtime;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, trace};

/// Result of module resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Native module, by root identifier
    Native(String),
    /// Companion sub-path of a native module (`root/lib/x`)
    Companion(String),
    /// Script file
    Script(String),
    /// JSON file
    Json(String),
}

impl Resolution {
    /// Key the resolved module is cached under
    pub fn key(&self) -> &str {
        match self {
            Resolution::Native(id)
            | Resolution::Companion(id)
            | Resolution::Script(id)
            | Resolution::Json(id) => id,
        }
    }

    /// Short label for display
    pub fn kind(&self) -> &'static str {
        match self {
            Resolution::Native(_) => "native",
            Resolution::Companion(_) => "companion",
            Resolution::Script(_) => "script",
            Resolution::Json(_) => "json",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.key(), self.kind())
    }
}

/// Whether an identifier is resolved against the requiring module's directory
pub fn is_relative(id: &str) -> bool {
    id == "." || id == ".." || id.starts_with("./") || id.starts_with("../")
}

/// Module resolver bound to one runtime
///
/// Records every candidate it probes, in order.
pub struct Resolver<'a> {
    runtime: &'a Runtime,
    probed: Vec<String>,
    /// Package directories whose `main` is being followed
    packages: HashSet<String>,
}

impl<'a> Resolver<'a> {
    /// Create a resolver
    pub fn new(runtime: &'a Runtime) -> Self {
        Self {
            runtime,
            probed: Vec::new(),
            packages: HashSet::new(),
        }
    }

    /// Candidates probed so far
    pub fn probed(&self) -> &[String] {
        &self.probed
    }

    /// Resolve `id` as required from `from`
    pub fn resolve(&mut self, from: &Module, id: &str) -> Result<Resolution> {
        if id.is_empty() {
            return Err(RuntimeError::type_error(
                "The \"id\" argument must be a non-empty string",
            ));
        }
        let runtime = self.runtime;
        let paths = runtime.paths();

        if is_relative(id) || id.starts_with('/') {
            let candidate = if id.starts_with('/') {
                paths.normalize(id)
            } else {
                paths.normalize(&format!("{}/{}", from.dirname(), id))
            };
            // No fallback for explicit paths
            return self
                .load_as_file_or_directory(from, &candidate)?
                .ok_or_else(|| RuntimeError::not_found(id));
        }

        if let Some(resolution) = self.load_native(id) {
            return Ok(resolution);
        }

        if !id.contains('/') {
            let filename = format!("/{id}/{id}.js");
            if self.exists(&filename) {
                return Ok(Resolution::Script(filename));
            }
            if let Some(resolution) = self.load_as_directory(from, &format!("/{id}"))? {
                return Ok(resolution);
            }
        }

        for dir in from.search_paths() {
            let candidate = paths.join(&[dir.as_str(), id]);
            if let Some(resolution) = self.load_as_file_or_directory(from, &candidate)? {
                return Ok(resolution);
            }
        }

        // Legacy: bare ids used to mean paths under the resource root
        let legacy = paths.normalize(&format!("/{id}"));
        if let Some(resolution) = self.load_as_file_or_directory(from, &legacy)? {
            debug!("Resolved '{}' through the legacy root fallback", id);
            return Ok(resolution);
        }

        Err(RuntimeError::not_found(id))
    }

    fn exists(&mut self, candidate: &str) -> bool {
        trace!("Probing {}", candidate);
        self.probed.push(candidate.to_string());
        self.runtime.file_exists(candidate)
    }

    fn load_native(&mut self, id: &str) -> Option<Resolution> {
        let registry = self.runtime.registry();
        let (root, rest) = match id.split_once('/') {
            Some((root, rest)) => (root, Some(rest)),
            None => (id, None),
        };
        if !registry.has_binding(root) {
            return None;
        }
        match rest {
            None => Some(Resolution::Native(root.to_string())),
            Some(_) if registry.has_companion(root) && registry.companion_source(id).is_some() => {
                Some(Resolution::Companion(id.to_string()))
            }
            Some(_) => None,
        }
    }

    fn load_as_file_or_directory(&mut self, from: &Module, path: &str) -> Result<Option<Resolution>> {
        if let Some(resolution) = self.load_as_file(path) {
            return Ok(Some(resolution));
        }
        self.load_as_directory(from, path)
    }

    fn load_as_file(&mut self, path: &str) -> Option<Resolution> {
        if self.exists(path) {
            return Some(classify(path.to_string()));
        }
        let script = format!("{path}.js");
        if self.exists(&script) {
            return Some(Resolution::Script(script));
        }
        let json = format!("{path}.json");
        if self.exists(&json) {
            return Some(Resolution::Json(json));
        }
        None
    }

    fn load_as_directory(&mut self, from: &Module, path: &str) -> Result<Option<Resolution>> {
        let runtime = self.runtime;
        let paths = runtime.paths();

        let dir = paths.resolve(&[path]);
        let package = paths.resolve(&[path, "package.json"]);
        // A `main` chain leading back here falls through to the index files
        if self.exists(&package) && !self.packages.contains(&dir) {
            let manifest = runtime.load_json(from, &package)?;
            if let Some(main) = manifest.exports().get("main") {
                let Some(main) = main.as_str() else {
                    return Err(RuntimeError::type_error(format!(
                        "\"main\" in {} must be a string. Received type {}",
                        package,
                        main.type_of()
                    )));
                };
                let target = paths.resolve(&[path, main]);
                // `"main": "."` falls through to the index files
                if target != dir {
                    self.packages.insert(dir.clone());
                    let found = self.load_as_file_or_directory(from, &target);
                    self.packages.remove(&dir);
                    return found;
                }
            }
        }

        let index = paths.resolve(&[path, "index.js"]);
        if self.exists(&index) {
            return Ok(Some(Resolution::Script(index)));
        }
        let index = paths.resolve(&[path, "index.json"]);
        if self.exists(&index) {
            return Ok(Some(Resolution::Json(index)));
        }
        Ok(None)
    }
}

fn classify(filename: String) -> Resolution {
    if filename.ends_with(".json") {
        Resolution::Json(filename)
    } else {
        Resolution::Script(filename)
    }
}
