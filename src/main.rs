// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Satchel - inspect module resolution for packaged script applications
//!
//! This is the main entry point for the satchel CLI/REPL.
//!
//! ## Features
//!
//! - Resolve identifiers against an asset directory and show every probe
//! - Print `node_modules` search paths and manifest entries
//! - Evaluate POSIX and Win32 path operations
//! - Interactive resolution REPL with history

mod repl;

use anyhow::Context;
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use satchel_path::{PathApi, PathModule, PathValue};
use satchel_runtime::module_system::search_paths;
use satchel_runtime::{DirectoryAssets, Resolver, Runtime, RuntimeConfig, StaticRegistry};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "satchel",
    about = "Module resolution for packaged script applications",
    version,
    author = "Pegasus Heavy Industries"
)]
struct Cli {
    /// Runtime configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve an identifier and print every candidate probed
    Resolve {
        /// Asset directory
        assets: PathBuf,
        /// Identifier passed to require()
        id: String,
        /// Logical filename of the requiring module
        #[arg(long, default_value = "/app.js")]
        from: String,
    },

    /// Print the search paths for bare identifiers
    Paths {
        /// Asset directory
        assets: PathBuf,
        /// Logical directory to start from
        #[arg(long, default_value = "/")]
        from: String,
    },

    /// List the packaged files
    Manifest {
        /// Asset directory
        assets: PathBuf,
    },

    /// Evaluate a path operation
    Path {
        /// Use Win32 semantics instead of POSIX
        #[arg(long)]
        win32: bool,
        /// Operation name (join, resolve, relative, parse, ...)
        op: String,
        /// String arguments
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Start the interactive resolution REPL
    Repl {
        /// Asset directory
        assets: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("satchel=debug,satchel_runtime=debug")
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("satchel=warn")
            .init();
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Resolve { assets, id, from } => {
            let runtime = open_runtime(&assets, config)?;
            resolve(&runtime, &from, &id)
        }
        Command::Paths { assets, from } => {
            let runtime = open_runtime(&assets, config)?;
            for dir in search_paths(runtime.paths(), &from, &runtime.config().search_dir) {
                println!("{}", dir);
            }
            Ok(())
        }
        Command::Manifest { assets } => {
            let runtime = open_runtime(&assets, config)?;
            let manifest = runtime.manifest();
            for entry in manifest.entries() {
                println!("{}", entry);
            }
            println!("{} {}", manifest.len().yellow(), "entries".dimmed());
            Ok(())
        }
        Command::Path { win32, op, args } => {
            let api = if win32 {
                PathApi::win32()
            } else {
                PathApi::posix()
            };
            let args: Vec<PathValue> = args.into_iter().map(PathValue::from).collect();
            let result = PathModule::new(api).call(&op, &args)?;
            match result {
                PathValue::Object(components) => {
                    println!("{}", serde_json::to_string_pretty(&components)?)
                }
                other => println!("{}", other),
            }
            Ok(())
        }
        Command::Repl { assets } => {
            let runtime = open_runtime(&assets, config)?;
            let mut repl = repl::Repl::new(runtime).context("failed to initialize REPL")?;
            repl.run().context("REPL error")?;
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<RuntimeConfig> {
    let mut config = match path {
        Some(path) => RuntimeConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => RuntimeConfig::default(),
    };
    config.load_from_env();
    config.validate()?;
    Ok(config)
}

fn open_runtime(assets: &Path, config: RuntimeConfig) -> anyhow::Result<Runtime> {
    let provider = DirectoryAssets::open(assets, &config)?;
    if provider.has_generated_manifest() {
        tracing::debug!("No manifest in {}, generated one", assets.display());
    }
    Ok(Runtime::builder()
        .config(config)
        .assets(provider)
        .registry(StaticRegistry::with_builtins())
        .build())
}

/// Resolve `id` from `from` and print the outcome with its probes
pub(crate) fn resolve(runtime: &Runtime, from: &str, id: &str) -> anyhow::Result<()> {
    let module = runtime.module_at(from);
    let mut resolver = Resolver::new(runtime);
    let result = resolver.resolve(&module, id);

    for candidate in resolver.probed() {
        println!("  {} {}", "probe".dimmed(), candidate);
    }

    let resolution = result?;
    println!(
        "{} {} {}",
        resolution.key().green().bold(),
        "->".dimmed(),
        resolution.kind().cyan()
    );
    Ok(())
}
