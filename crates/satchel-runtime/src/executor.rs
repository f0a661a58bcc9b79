// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Script execution seam
//!
//! The runtime does not interpret scripts itself. An [`Executor`] receives
//! each module's source together with the module context and a
//! [`Require`] handle, and is expected to evaluate the source in that
//! context. Module sources arrive wrapped in the function header below;
//! only the application entry module arrives unwrapped.

use crate::error::{Result, RuntimeError};
use crate::module_system::{Module, Require};
use crate::value::Value;
use std::sync::Arc;

/// Function wrapper placed around module sources
pub const WRAPPER: [&str; 2] = [
    "(function (exports, require, module, __filename, __dirname, global, host) {",
    "\n});",
];

/// Wrap a module source in the function header
pub fn wrap(source: &str) -> String {
    let mut wrapped = String::with_capacity(WRAPPER[0].len() + source.len() + WRAPPER[1].len());
    wrapped.push_str(WRAPPER[0]);
    wrapped.push_str(source);
    wrapped.push_str(WRAPPER[1]);
    wrapped
}

/// How a source is to be evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Evaluate directly in the global context (application entry)
    TopLevel,
    /// Evaluate the wrapped source and call the resulting function
    Wrapped,
}

/// One script execution request
pub struct Invocation<'a> {
    /// Source to evaluate; already wrapped in [`ExecutionMode::Wrapped`]
    pub source: &'a str,
    /// Logical filename (`__filename`)
    pub filename: &'a str,
    /// Logical directory (`__dirname`)
    pub dirname: &'a str,
    /// Evaluation mode
    pub mode: ExecutionMode,
    /// The module being executed (`module`)
    pub module: &'a Arc<Module>,
    /// The module's `require`
    pub require: Require<'a>,
}

impl Invocation<'_> {
    /// The module's current exports (`exports`)
    pub fn exports(&self) -> Value {
        self.module.exports()
    }

    /// `require(id)` on behalf of the module
    pub fn require(&self, id: &str) -> Result<Value> {
        self.require.call(id)
    }
}

/// Evaluates module sources
pub trait Executor: Send + Sync {
    /// Run one module. Errors are recorded against the module and propagated
    /// to whoever required it.
    fn execute(&self, invocation: Invocation<'_>) -> Result<()>;
}

impl<F> Executor for F
where
    F: Fn(Invocation<'_>) -> Result<()> + Send + Sync,
{
    fn execute(&self, invocation: Invocation<'_>) -> Result<()> {
        self(invocation)
    }
}

/// Executor for hosts that only resolve and never run scripts
#[derive(Debug, Default, Clone, Copy)]
pub struct NoExecutor;

impl Executor for NoExecutor {
    fn execute(&self, invocation: Invocation<'_>) -> Result<()> {
        Err(RuntimeError::script(
            invocation.filename,
            "no script executor is configured",
        ))
    }
}
