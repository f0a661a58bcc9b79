// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! CommonJS-style module system
//!
//! - `require()` bound to each executing module
//! - `module.exports` shared by reference with every consumer
//! - Synchronous, load-once semantics with cycle tolerance

mod cache;
mod module;
mod require;
mod resolver;

pub use cache::{CacheEntry, ModuleCache};
pub use module::{MAIN_ID, Module, ModuleState, search_paths};
pub use require::Require;
pub use resolver::{Resolution, Resolver, is_relative};
