//! require() Integration Tests
//!
//! Load-once caching, cycles, failure handling and entry execution.

mod common;

use common::{CountingAssets, Scripts, exports};
use satchel_runtime::{
    EntryKind, ExecutionMode, MemoryAssets, ModuleState, Runtime, RuntimeError, Value, WRAPPER,
};

fn runtime(assets: MemoryAssets, scripts: &Scripts) -> Runtime {
    Runtime::builder()
        .assets(assets)
        .executor(scripts.clone())
        .build()
}

#[test]
fn test_same_module_through_different_ids() {
    let assets = CountingAssets::new(
        MemoryAssets::new()
            .with_file("/app/y.js", "")
            .with_file("/app/x.js", "exports.n = 1"),
    );
    let scripts = Scripts::new().on("/app/x.js", |inv| {
        exports(inv).set("n", 1.0);
        Ok(())
    });
    let runtime = Runtime::builder()
        .assets(assets.clone())
        .executor(scripts.clone())
        .build();

    let main = runtime.run_main("/app/y.js").unwrap();
    let first = runtime.require(&main, "./x").unwrap();
    let second = runtime.require(&main, "/app/x.js").unwrap();
    let third = runtime.require(&main, "../app/x").unwrap();

    assert!(first.strict_equals(&second));
    assert!(first.strict_equals(&third));
    assert_eq!(first.get("n"), Some(Value::Number(1.0)));
    assert_eq!(assets.reads("Resources/app/x.js"), 1);
    assert_eq!(assets.reads("index.json"), 1);
    assert_eq!(scripts.count("/app/x.js"), 1);
}

#[test]
fn test_load_twice_is_error() {
    let scripts = Scripts::new();
    let runtime = runtime(MemoryAssets::new().with_file("/app.js", ""), &scripts);

    let main = runtime.run_main("/app.js").unwrap();
    assert!(main.loaded());

    let err = main.load(&runtime, Some(String::new())).unwrap_err();
    assert!(matches!(err, RuntimeError::AlreadyLoaded { ref filename } if filename == "/app.js"));
    assert_eq!(scripts.count("/app.js"), 1);
}

#[test]
fn test_cycle_sees_partial_exports() {
    let assets = MemoryAssets::new()
        .with_file("/app.js", "")
        .with_file("/a.js", "")
        .with_file("/b.js", "");
    let scripts = Scripts::new()
        .on("/app.js", |inv| {
            inv.require("./a")?;
            Ok(())
        })
        .on("/a.js", |inv| {
            let exports = exports(inv);
            exports.set("started", true);
            exports.set("b", inv.require("./b")?);
            exports.set("done", true);
            Ok(())
        })
        .on("/b.js", |inv| {
            let a = inv.require("./a")?;
            let exports = exports(inv);
            exports.set("a_started", a.get("started").unwrap_or_default());
            exports.set("a_done", a.get("done").unwrap_or_default());
            exports.set("a", a);
            Ok(())
        });
    let runtime = runtime(assets, &scripts);

    let main = runtime.run_main("/app.js").unwrap();
    let a = runtime.require(&main, "./a").unwrap();
    let b = runtime.require(&main, "./b").unwrap();

    assert_eq!(b.get("a_started"), Some(Value::Boolean(true)));
    assert_eq!(b.get("a_done"), Some(Value::Undefined));
    // The object B captured mid-cycle is A's final exports
    assert!(b.get("a").unwrap().strict_equals(&a));
    assert_eq!(a.get("done"), Some(Value::Boolean(true)));
    assert_eq!(scripts.count("/a.js"), 1);
    assert_eq!(scripts.count("/b.js"), 1);
}

#[test]
fn test_replaced_exports_are_returned() {
    let assets = MemoryAssets::new()
        .with_file("/app.js", "")
        .with_file("/answer.js", "module.exports = 42");
    let scripts = Scripts::new().on("/answer.js", |inv| {
        inv.module.set_exports(42.0);
        Ok(())
    });
    let runtime = runtime(assets, &scripts);

    let main = runtime.run_main("/app.js").unwrap();
    assert_eq!(runtime.require(&main, "./answer").unwrap(), Value::Number(42.0));
}

#[test]
fn test_replaced_array_exports_are_shared() {
    let assets = MemoryAssets::new()
        .with_file("/app.js", "")
        .with_file("/list.js", "module.exports = ['a']");
    let scripts = Scripts::new().on("/list.js", |inv| {
        inv.module.set_exports(vec![Value::from("a")]);
        Ok(())
    });
    let runtime = runtime(assets, &scripts);

    let main = runtime.run_main("/app.js").unwrap();
    let first = runtime.require(&main, "./list").unwrap();
    let second = runtime.require(&main, "/list.js").unwrap();
    assert!(first.strict_equals(&second));
    assert_eq!(scripts.count("/list.js"), 1);
}

#[test]
fn test_failed_module_is_not_retried() {
    let assets = MemoryAssets::new()
        .with_file("/app.js", "")
        .with_file("/bad.js", "throw new Error('boom')");
    let scripts = Scripts::new().on("/bad.js", |inv| {
        Err(RuntimeError::script(inv.filename, "boom"))
    });
    let runtime = runtime(assets, &scripts);
    let main = runtime.run_main("/app.js").unwrap();

    let err = runtime.require(&main, "./bad").unwrap_err();
    assert!(matches!(err, RuntimeError::Script { .. }));
    assert_eq!(
        runtime.cache().module("/bad.js").unwrap().state(),
        ModuleState::Failed("Error in '/bad.js': boom".into())
    );

    let err = runtime.require(&main, "./bad").unwrap_err();
    match err {
        RuntimeError::LoadFailed { filename, reason } => {
            assert_eq!(filename, "/bad.js");
            assert!(reason.contains("boom"));
        }
        other => panic!("expected LoadFailed, got {other:?}"),
    }
    assert_eq!(scripts.count("/bad.js"), 1);

    assert!(runtime.invalidate("/bad.js"));
    assert!(runtime.require(&main, "./bad").is_err());
    assert_eq!(scripts.count("/bad.js"), 2);
}

#[test]
fn test_relative_miss_has_no_fallback() {
    let scripts = Scripts::new();
    let runtime = runtime(
        MemoryAssets::new()
            .with_file("/app/main.js", "")
            .with_file("/missing.js", ""),
        &scripts,
    );
    let main = runtime.run_main("/app/main.js").unwrap();

    let err = runtime.require(&main, "./missing").unwrap_err();
    assert!(matches!(err, RuntimeError::NotFound { ref id } if id == "./missing"));
    assert_eq!(err.to_string(), "Requested module not found: ./missing");
}

#[test]
fn test_entry_runs_top_level_and_modules_wrapped() {
    let assets = MemoryAssets::new()
        .with_file("/app.js", "require('./lib')")
        .with_file("/lib.js", "exports.x = 1");
    let scripts = Scripts::new().on("/app.js", |inv| {
        inv.require("./lib")?;
        Ok(())
    });
    let runtime = runtime(assets, &scripts);
    runtime.run_main("/app.js").unwrap();

    let executed = scripts.executed();
    assert_eq!(executed.len(), 2);

    assert_eq!(executed[0].filename, "/app.js");
    assert_eq!(executed[0].mode, ExecutionMode::TopLevel);
    assert_eq!(executed[0].source, "require('./lib')");

    assert_eq!(executed[1].filename, "/lib.js");
    assert_eq!(executed[1].mode, ExecutionMode::Wrapped);
    assert_eq!(
        executed[1].source,
        format!("{}exports.x = 1{}", WRAPPER[0], WRAPPER[1])
    );
}

#[test]
fn test_service_entry_runs_wrapped() {
    let scripts = Scripts::new();
    let runtime = runtime(MemoryAssets::new().with_file("/svc.js", ""), &scripts);

    let service = runtime
        .run_module("/svc.js", None, EntryKind::Service)
        .unwrap();
    assert!(service.is_service());
    assert_eq!(scripts.executed()[0].mode, ExecutionMode::Wrapped);
}

#[test]
fn test_first_module_is_main() {
    let scripts = Scripts::new().on("/lib.js", |inv| {
        let main = inv.require.main().expect("main module is set");
        exports(inv).set("main", main.filename());
        Ok(())
    });
    let runtime = runtime(
        MemoryAssets::new()
            .with_file("/app.js", "")
            .with_file("/other.js", "")
            .with_file("/lib.js", ""),
        &scripts,
    );

    let main = runtime.run_main("/app.js").unwrap();
    let other = runtime.run_main("/other.js").unwrap();
    assert_eq!(main.id(), ".");
    assert_eq!(other.id(), "/other.js");
    assert_eq!(
        scripts.executed()[1].mode,
        ExecutionMode::Wrapped,
        "only the first entry runs top level"
    );

    let lib = runtime.require(&other, "./lib").unwrap();
    assert_eq!(lib.get("main"), Some(Value::from("/app.js")));
}

#[test]
fn test_require_resolve_and_cache_keys() {
    let scripts = Scripts::new().on("/app.js", |inv| {
        assert_eq!(inv.require.resolve("./lib").unwrap(), "/lib.js");
        assert!(!inv.require.cache_keys().contains(&"/lib.js".to_string()));
        inv.require("./lib")?;
        assert!(inv.require.cache_keys().contains(&"/lib.js".to_string()));
        Ok(())
    });
    let runtime = runtime(
        MemoryAssets::new()
            .with_file("/app.js", "")
            .with_file("/lib.js", ""),
        &scripts,
    );
    runtime.run_main("/app.js").unwrap();
    assert_eq!(scripts.count("/lib.js"), 1);
}

#[test]
fn test_missing_asset_is_reported() {
    // Listed in the manifest but unreadable
    let assets = MemoryAssets::new()
        .with_file("/app.js", "")
        .with_asset("index.json", r#"{"Resources/app.js": 1, "Resources/ghost.js": 1}"#);
    let scripts = Scripts::new();
    let runtime = runtime(assets, &scripts);
    let main = runtime.run_main("/app.js").unwrap();

    let err = runtime.require(&main, "./ghost").unwrap_err();
    assert!(matches!(err, RuntimeError::AssetMissing { ref path } if path == "Resources/ghost.js"));
    assert!(!runtime.cache().contains("/ghost.js"));
}
