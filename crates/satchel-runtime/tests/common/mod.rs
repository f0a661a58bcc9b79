//! Shared fixtures for the runtime integration tests

#![allow(dead_code)]

use satchel_runtime::{
    AssetProvider, Capability, ExecutionMode, Executor, Invocation, MemoryAssets, Object, Result,
    Value,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

type Script = Arc<dyn Fn(&Invocation<'_>) -> Result<()> + Send + Sync>;

/// One recorded execution
#[derive(Debug, Clone)]
pub struct Executed {
    pub filename: String,
    pub mode: ExecutionMode,
    pub source: String,
}

/// Executor that runs Rust closures keyed by filename and records every call
#[derive(Clone, Default)]
pub struct Scripts {
    scripts: Arc<Mutex<HashMap<String, Script>>>,
    log: Arc<Mutex<Vec<Executed>>>,
}

impl Scripts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(
        self,
        filename: &str,
        script: impl Fn(&Invocation<'_>) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(filename.to_string(), Arc::new(script));
        self
    }

    pub fn executed(&self) -> Vec<Executed> {
        self.log.lock().unwrap().clone()
    }

    pub fn count(&self, filename: &str) -> usize {
        self.executed()
            .iter()
            .filter(|e| e.filename == filename)
            .count()
    }
}

impl Executor for Scripts {
    fn execute(&self, invocation: Invocation<'_>) -> Result<()> {
        self.log.lock().unwrap().push(Executed {
            filename: invocation.filename.to_string(),
            mode: invocation.mode,
            source: invocation.source.to_string(),
        });
        // Released before running so scripts can require each other
        let script = self.scripts.lock().unwrap().get(invocation.filename).cloned();
        match script {
            Some(script) => script(&invocation),
            None => Ok(()),
        }
    }
}

/// Asset provider that counts reads per asset name
#[derive(Default)]
pub struct CountingAssets {
    inner: MemoryAssets,
    reads: Mutex<HashMap<String, usize>>,
}

impl CountingAssets {
    pub fn new(inner: MemoryAssets) -> Arc<Self> {
        Arc::new(Self {
            inner,
            reads: Mutex::new(HashMap::new()),
        })
    }

    pub fn reads(&self, name: &str) -> usize {
        self.reads.lock().unwrap().get(name).copied().unwrap_or(0)
    }
}

impl AssetProvider for CountingAssets {
    fn read_asset(&self, name: &str) -> Option<String> {
        *self
            .reads
            .lock()
            .unwrap()
            .entry(name.to_string())
            .or_insert(0) += 1;
        self.inner.read_asset(name)
    }
}

/// Native capability with two fixed properties
pub struct Platform;

impl Capability for Platform {
    fn name(&self) -> &str {
        "platform"
    }

    fn property(&self, key: &str) -> Option<Value> {
        match key {
            "os" => Some(Value::from("test-os")),
            "version" => Some(Value::from("1.0")),
            _ => None,
        }
    }

    fn property_names(&self) -> Vec<String> {
        vec!["os".into(), "version".into()]
    }

    fn invoke(&self, method: &str, args: &[Value]) -> Result<Value> {
        match method {
            "echo" => Ok(args.first().cloned().unwrap_or_default()),
            _ => Err(satchel_runtime::RuntimeError::type_error(format!(
                "platform.{method} is not a function"
            ))),
        }
    }
}

/// The exports object of the executing module
pub fn exports(invocation: &Invocation<'_>) -> Object {
    invocation
        .exports()
        .as_object()
        .cloned()
        .expect("exports should be an object")
}
