// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The module runtime
//!
//! [`Runtime`] owns the module cache and ties together the asset provider,
//! the native registry and the script executor.

use crate::assets::{AssetProvider, Manifest, MemoryAssets};
use crate::config::RuntimeConfig;
use crate::error::{Result, RuntimeError};
use crate::executor::{ExecutionMode, Executor, Invocation, NoExecutor, wrap};
use crate::module_system::{CacheEntry, MAIN_ID, Module, ModuleCache, ModuleState, Require};
use crate::module_system::{Resolution, Resolver};
use crate::native::{CapabilityWrapper, NativeModule, NativeRegistry, StaticRegistry};
use crate::value::Value;
use satchel_path::PathApi;
use std::borrow::Cow;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

/// How an entry module is started
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryKind {
    /// Foreground application
    #[default]
    Application,
    /// Background service; always runs wrapped
    Service,
}

/// Builder for [`Runtime`]
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    assets: Option<Box<dyn AssetProvider>>,
    registry: Option<Box<dyn NativeRegistry>>,
    executor: Option<Box<dyn Executor>>,
}

impl RuntimeBuilder {
    /// Use a configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Use an asset provider
    pub fn assets(mut self, assets: impl AssetProvider + 'static) -> Self {
        self.assets = Some(Box::new(assets));
        self
    }

    /// Use a native registry
    pub fn registry(mut self, registry: impl NativeRegistry + 'static) -> Self {
        self.registry = Some(Box::new(registry));
        self
    }

    /// Use a script executor
    pub fn executor(mut self, executor: impl Executor + 'static) -> Self {
        self.executor = Some(Box::new(executor));
        self
    }

    /// Build the runtime
    pub fn build(self) -> Runtime {
        let assets = self
            .assets
            .unwrap_or_else(|| Box::new(MemoryAssets::for_config(&self.config)));
        Runtime {
            paths: PathApi::posix(),
            assets,
            registry: self
                .registry
                .unwrap_or_else(|| Box::new(StaticRegistry::with_builtins())),
            executor: self.executor.unwrap_or_else(|| Box::new(NoExecutor)),
            cache: ModuleCache::new(),
            manifest: OnceLock::new(),
            main: OnceLock::new(),
            config: self.config,
        }
    }
}

/// Module runtime
pub struct Runtime {
    config: RuntimeConfig,
    paths: PathApi,
    assets: Box<dyn AssetProvider>,
    registry: Box<dyn NativeRegistry>,
    executor: Box<dyn Executor>,
    cache: ModuleCache,
    manifest: OnceLock<Manifest>,
    main: OnceLock<Arc<Module>>,
}

impl Runtime {
    /// Start building a runtime
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder {
            config: RuntimeConfig::default(),
            assets: None,
            registry: None,
            executor: None,
        }
    }

    /// Runtime configuration
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Path API used for logical paths
    pub fn paths(&self) -> &PathApi {
        &self.paths
    }

    /// Native registry
    pub fn registry(&self) -> &dyn NativeRegistry {
        &*self.registry
    }

    /// Module cache
    pub fn cache(&self) -> &ModuleCache {
        &self.cache
    }

    /// The application entry module, once started
    pub fn main(&self) -> Option<&Arc<Module>> {
        self.main.get()
    }

    /// The packaged manifest, read on first use
    pub fn manifest(&self) -> &Manifest {
        self.manifest.get_or_init(|| self.load_manifest())
    }

    fn load_manifest(&self) -> Manifest {
        let name = &self.config.manifest;
        let Some(content) = self.assets.read_asset(name) else {
            warn!("No manifest '{}' found; no files will resolve", name);
            return Manifest::empty();
        };
        match Manifest::parse(name, &content) {
            Ok(manifest) => {
                info!("Loaded manifest '{}' ({} entries)", name, manifest.len());
                manifest
            }
            Err(err) => {
                warn!("Ignoring unreadable manifest: {}", err);
                Manifest::empty()
            }
        }
    }

    /// Whether a logical path is packaged
    pub fn file_exists(&self, logical: &str) -> bool {
        self.manifest().contains(&self.config.asset_name(logical))
    }

    pub(crate) fn read_source(&self, logical: &str) -> Result<String> {
        let name = self.config.asset_name(logical);
        self.assets
            .read_asset(&name)
            .ok_or(RuntimeError::AssetMissing { path: name })
    }

    pub(crate) fn execute(&self, module: &Arc<Module>, source: &str) -> Result<()> {
        let (mode, source) = if module.is_entry() {
            (ExecutionMode::TopLevel, Cow::Borrowed(source))
        } else {
            (ExecutionMode::Wrapped, Cow::Owned(wrap(source)))
        };
        self.executor.execute(Invocation {
            source: &source,
            filename: module.filename(),
            dirname: module.dirname(),
            mode,
            module,
            require: Require::new(self, Arc::clone(module)),
        })
    }

    /// Create an unloaded, uncached module at `filename`, e.g. to resolve
    /// identifiers relative to it
    pub fn module_at(&self, filename: &str) -> Arc<Module> {
        let filename = self.paths.resolve(&[filename]);
        Arc::new(Module::new(
            filename.clone(),
            filename,
            None,
            &self.paths,
            &self.config.search_dir,
        ))
    }

    /// Run an entry script. The first module run becomes the main module.
    ///
    /// `filename` may be given as a logical path or as an asset name under
    /// the resource root. When `source` is `None` it is read from the assets.
    pub fn run_module(
        &self,
        filename: &str,
        source: Option<String>,
        kind: EntryKind,
    ) -> Result<Arc<Module>> {
        let filename = match self.config.logical_path(filename) {
            Some(logical) => logical.to_string(),
            None => self.paths.resolve(&[filename]),
        };

        let module = if self.main.get().is_none() {
            let module = Arc::new(
                Module::new(MAIN_ID, filename.clone(), None, &self.paths, &self.config.search_dir)
                    .service(kind == EntryKind::Service),
            );
            match self.main.set(Arc::clone(&module)) {
                Ok(()) => module,
                // Another thread started the main module first
                Err(_) => self.entry_module(&filename, kind),
            }
        } else {
            self.entry_module(&filename, kind)
        };

        module.load(self, source)?;
        Ok(module)
    }

    fn entry_module(&self, filename: &str, kind: EntryKind) -> Arc<Module> {
        Arc::new(
            Module::new(filename, filename, None, &self.paths, &self.config.search_dir)
                .service(kind == EntryKind::Service),
        )
    }

    /// Run the application entry script from the assets
    pub fn run_main(&self, filename: &str) -> Result<Arc<Module>> {
        self.run_module(filename, None, EntryKind::Application)
    }

    /// Resolve `id` as required from `from`, without loading it
    pub fn resolve(&self, from: &Module, id: &str) -> Result<Resolution> {
        Resolver::new(self).resolve(from, id)
    }

    /// require(id) from `from`
    pub fn require(&self, from: &Module, id: &str) -> Result<Value> {
        if let Some(wrapper) = from.cached_wrapper(id) {
            return Ok(Value::Capability(wrapper));
        }

        let resolution = self.resolve(from, id)?;
        debug!("require('{}') from {} -> {}", id, from.filename(), resolution);

        match resolution {
            Resolution::Native(root) => self.load_native(from, &root).map(Value::Capability),
            Resolution::Companion(id) => Ok(self.load_companion(from, &id)?.exports()),
            Resolution::Script(filename) => Ok(self.load_script(from, &filename)?.exports()),
            Resolution::Json(filename) => Ok(self.load_json(from, &filename)?.exports()),
        }
    }

    /// Drop a cached module so the next require loads it afresh
    pub fn invalidate(&self, key: &str) -> bool {
        let removed = self.cache.remove(key).is_some();
        if removed {
            debug!("Invalidated cached module '{}'", key);
        }
        removed
    }

    fn cached(&self, key: &str) -> Result<Option<Arc<Module>>> {
        let Some(entry) = self.cache.get(key) else {
            return Ok(None);
        };
        let Some(module) = entry.as_module() else {
            return Err(RuntimeError::not_found(key));
        };
        debug!("Cache hit for '{}'", key);
        if let ModuleState::Failed(reason) = module.state() {
            return Err(RuntimeError::LoadFailed {
                filename: key.to_string(),
                reason,
            });
        }
        Ok(Some(Arc::clone(module)))
    }

    fn load_script(&self, parent: &Module, filename: &str) -> Result<Arc<Module>> {
        if let Some(module) = self.cached(filename)? {
            return Ok(module);
        }
        let module = Arc::new(Module::new(
            filename,
            filename,
            Some(parent),
            &self.paths,
            &self.config.search_dir,
        ));
        module.load(self, None)?;
        Ok(module)
    }

    pub(crate) fn load_json(&self, parent: &Module, filename: &str) -> Result<Arc<Module>> {
        if let Some(module) = self.cached(filename)? {
            return Ok(module);
        }
        let source = self.read_source(filename)?;
        let json: serde_json::Value =
            serde_json::from_str(&source).map_err(|source| RuntimeError::InvalidJson {
                filename: filename.to_string(),
                source,
            })?;

        let module = Arc::new(Module::new(
            filename,
            filename,
            Some(parent),
            &self.paths,
            &self.config.search_dir,
        ));
        module.set_exports(Value::from(json));
        module.mark_loaded();
        self.cache
            .insert(filename, CacheEntry::Module(Arc::clone(&module)));
        Ok(module)
    }

    fn load_companion(&self, parent: &Module, id: &str) -> Result<Arc<Module>> {
        if let Some(module) = self.cached(id)? {
            return Ok(module);
        }
        let source = self
            .registry
            .companion_source(id)
            .ok_or_else(|| RuntimeError::not_found(id))?;
        let module = Arc::new(Module::new(
            id,
            id,
            Some(parent),
            &self.paths,
            &self.config.search_dir,
        ));
        module.load(self, Some(source))?;
        Ok(module)
    }

    fn load_native(&self, consumer: &Module, root: &str) -> Result<Arc<CapabilityWrapper>> {
        let native = match self.cache.get(root) {
            Some(CacheEntry::Native(native)) => native,
            Some(CacheEntry::Module(_)) => {
                return Err(RuntimeError::NativeUnavailable {
                    id: root.to_string(),
                });
            }
            None => {
                let capability =
                    self.registry
                        .binding(root)
                        .ok_or_else(|| RuntimeError::NativeUnavailable {
                            id: root.to_string(),
                        })?;
                let native = Arc::new(NativeModule::new(root, capability));
                // Cached before the companion runs so it can require its own root
                self.cache
                    .insert(root, CacheEntry::Native(Arc::clone(&native)));
                if let Err(err) = self.extend_with_companion(consumer, &native) {
                    self.cache.remove(root);
                    return Err(err);
                }
                native
            }
        };

        let source_url = format!(
            "{}{}",
            self.config.source_url_scheme,
            consumer.filename().trim_start_matches('/')
        );
        let wrapper = Arc::new(CapabilityWrapper::new(native, source_url));
        consumer.cache_wrapper(root, Arc::clone(&wrapper));
        Ok(wrapper)
    }

    fn extend_with_companion(&self, consumer: &Module, native: &NativeModule) -> Result<()> {
        let root = native.id();
        if !self.registry.has_companion(root) {
            return Ok(());
        }
        let Some(source) = self.registry.companion_source(root) else {
            return Ok(());
        };

        let key = format!("{}{}", root, self.config.companion_suffix);
        let module = match self.cached(&key)? {
            Some(module) => module,
            None => {
                let module = Arc::new(Module::new(
                    key.as_str(),
                    key.as_str(),
                    Some(consumer),
                    &self.paths,
                    &self.config.search_dir,
                ));
                module.load(self, Some(source))?;
                module
            }
        };

        if let Value::Object(exports) = module.exports() {
            debug!("Extending native module '{}' with its companion", root);
            native.attach_companion(exports);
        }
        Ok(())
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("config", &self.config)
            .field("cached", &self.cache.len())
            .finish()
    }
}
