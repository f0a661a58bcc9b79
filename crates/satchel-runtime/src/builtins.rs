// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Built-in native modules

use crate::error::Result;
use crate::native::Capability;
use crate::value::{Object, Value};
use satchel_path::{PathApi, PathComponents, PathModule, PathValue};

/// The `path` module as a native capability
#[derive(Debug, Clone, Default)]
pub struct PathCapability {
    module: PathModule,
}

impl PathCapability {
    /// Expose a configured path API
    pub fn new(api: PathApi) -> Self {
        Self {
            module: PathModule::new(api),
        }
    }
}

impl Capability for PathCapability {
    fn name(&self) -> &str {
        "path"
    }

    fn property(&self, key: &str) -> Option<Value> {
        let api = self.module.api();
        match key {
            "sep" => Some(Value::String(api.sep().to_string())),
            "delimiter" => Some(Value::String(api.delimiter().to_string())),
            _ => None,
        }
    }

    fn property_names(&self) -> Vec<String> {
        let mut names = vec!["delimiter".to_string(), "sep".to_string()];
        names.extend(PathModule::METHODS.iter().map(|m| m.to_string()));
        names
    }

    fn invoke(&self, method: &str, args: &[Value]) -> Result<Value> {
        let args: Vec<PathValue> = args.iter().map(to_path_value).collect();
        Ok(from_path_value(self.module.call(method, &args)?))
    }
}

fn to_path_value(value: &Value) -> PathValue {
    match value {
        Value::Undefined => PathValue::Undefined,
        Value::Null => PathValue::Null,
        Value::Boolean(b) => PathValue::Boolean(*b),
        Value::Number(n) => PathValue::Number(*n),
        Value::String(s) => PathValue::String(s.clone()),
        Value::Object(obj) => {
            let field = |key: &str| {
                obj.get(key)
                    .and_then(|v| v.as_str().map(str::to_string))
                    .unwrap_or_default()
            };
            PathValue::Object(PathComponents {
                root: field("root"),
                dir: field("dir"),
                base: field("base"),
                name: field("name"),
                ext: field("ext"),
            })
        }
        // Arrays and wrappers are objects as far as type checks go
        Value::Array(_) | Value::Capability(_) => PathValue::Object(PathComponents::default()),
    }
}

fn from_path_value(value: PathValue) -> Value {
    match value {
        PathValue::Undefined => Value::Undefined,
        PathValue::Null => Value::Null,
        PathValue::Boolean(b) => Value::Boolean(b),
        PathValue::Number(n) => Value::Number(n),
        PathValue::String(s) => Value::String(s),
        PathValue::Object(components) => {
            let obj = Object::new();
            obj.set("root", components.root);
            obj.set("dir", components.dir);
            obj.set("base", components.base);
            obj.set("name", components.name);
            obj.set("ext", components.ext);
            Value::Object(obj)
        }
    }
}
