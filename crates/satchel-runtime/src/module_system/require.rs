// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The require() function handed to executing modules

use crate::error::Result;
use crate::module_system::Module;
use crate::runtime::Runtime;
use crate::value::Value;
use std::sync::Arc;

/// `require` bound to one requiring module
#[derive(Clone)]
pub struct Require<'a> {
    runtime: &'a Runtime,
    module: Arc<Module>,
}

impl<'a> Require<'a> {
    pub(crate) fn new(runtime: &'a Runtime, module: Arc<Module>) -> Self {
        Self { runtime, module }
    }

    /// require(id)
    pub fn call(&self, id: &str) -> Result<Value> {
        self.runtime.require(&self.module, id)
    }

    /// require.resolve(id) - the cache key `id` would load, without loading it
    pub fn resolve(&self, id: &str) -> Result<String> {
        Ok(self.runtime.resolve(&self.module, id)?.key().to_string())
    }

    /// require.main - the application entry module
    pub fn main(&self) -> Option<Arc<Module>> {
        self.runtime.main().cloned()
    }

    /// require.cache - keys of every cached module
    pub fn cache_keys(&self) -> Vec<String> {
        self.runtime.cache().keys()
    }

    /// The requiring module
    pub fn module(&self) -> &Arc<Module> {
        &self.module
    }
}

impl std::fmt::Debug for Require<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Require")
            .field("module", &self.module.filename())
            .finish()
    }
}
