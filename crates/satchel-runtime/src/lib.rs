// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # satchel-runtime
//!
//! An embeddable module runtime for packaged script applications.
//!
//! The runtime provides:
//!
//! - CommonJS-style `require()` with load-once caching and cycle tolerance
//! - Resolution of relative, absolute and bare identifiers against a
//!   packaged manifest, including `node_modules` search paths and
//!   `package.json` `main` entries
//! - JSON modules
//! - Native modules supplied by the host, optionally extended by companion
//!   script code, with a per-consumer wrapper
//!
//! Script evaluation is delegated to an [`Executor`] supplied by the host.
//!
//! ## Quick Start
//!
//! ```rust
//! use satchel_runtime::{Invocation, MemoryAssets, Result, Runtime, Value};
//!
//! fn run(invocation: Invocation<'_>) -> Result<()> {
//!     if invocation.filename == "/lib/greeting.js" {
//!         if let Value::Object(exports) = invocation.exports() {
//!             exports.set("text", "hello");
//!         }
//!     }
//!     Ok(())
//! }
//!
//! let runtime = Runtime::builder()
//!     .assets(
//!         MemoryAssets::new()
//!             .with_file("/app.js", "require('./lib/greeting')")
//!             .with_file("/lib/greeting.js", "exports.text = 'hello'"),
//!     )
//!     .executor(run)
//!     .build();
//!
//! let main = runtime.run_main("/app.js").unwrap();
//! let greeting = runtime.require(&main, "./lib/greeting").unwrap();
//! assert_eq!(greeting.get("text"), Some(Value::from("hello")));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod assets;
pub mod builtins;
pub mod config;
pub mod error;
pub mod executor;
pub mod module_system;
pub mod native;
pub mod runtime;
pub mod value;

// Re-exports
pub use assets::{AssetProvider, DirectoryAssets, Manifest, MemoryAssets};
pub use config::RuntimeConfig;
pub use error::{Result, RuntimeError};
pub use executor::{ExecutionMode, Executor, Invocation, NoExecutor, WRAPPER};
pub use module_system::{Module, ModuleCache, ModuleState, Require, Resolution, Resolver};
pub use native::{Capability, CapabilityWrapper, NativeModule, NativeRegistry, StaticRegistry};
pub use runtime::{EntryKind, Runtime, RuntimeBuilder};
pub use value::{Array, Object, Value};
