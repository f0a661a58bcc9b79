// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Script-facing `path` module
//!
//! Scripts call path functions with dynamically typed arguments. This layer
//! checks those arguments and is the only place a [`PathError::TypeArgument`]
//! can originate.

use crate::api::PathApi;
use crate::components::PathComponents;
use crate::error::{PathError, Result};
use std::fmt;

/// Loosely typed argument or return value of a script call
#[derive(Debug, Clone, PartialEq)]
pub enum PathValue {
    /// undefined (also used for missing arguments)
    Undefined,
    /// null
    Null,
    /// Boolean value
    Boolean(bool),
    /// Number
    Number(f64),
    /// String
    String(String),
    /// Path object
    Object(PathComponents),
}

impl PathValue {
    /// Name reported by `typeof`
    pub fn type_name(&self) -> &'static str {
        match self {
            PathValue::Undefined => "undefined",
            PathValue::Null | PathValue::Object(_) => "object",
            PathValue::Boolean(_) => "boolean",
            PathValue::Number(_) => "number",
            PathValue::String(_) => "string",
        }
    }

    /// The string payload, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PathValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for PathValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathValue::Undefined => write!(f, "undefined"),
            PathValue::Null => write!(f, "null"),
            PathValue::Boolean(b) => write!(f, "{}", b),
            PathValue::Number(n) => write!(f, "{}", n),
            PathValue::String(s) => write!(f, "{}", s),
            PathValue::Object(_) => write!(f, "[object Object]"),
        }
    }
}

impl From<String> for PathValue {
    fn from(value: String) -> Self {
        PathValue::String(value)
    }
}

impl From<&str> for PathValue {
    fn from(value: &str) -> Self {
        PathValue::String(value.to_string())
    }
}

impl From<bool> for PathValue {
    fn from(value: bool) -> Self {
        PathValue::Boolean(value)
    }
}

impl From<PathComponents> for PathValue {
    fn from(value: PathComponents) -> Self {
        PathValue::Object(value)
    }
}

/// The `path` module as seen from scripts
#[derive(Debug, Clone, Default)]
pub struct PathModule {
    api: PathApi,
}

impl PathModule {
    /// Methods accepted by [`call`](Self::call)
    pub const METHODS: &'static [&'static str] = &[
        "basename",
        "dirname",
        "extname",
        "format",
        "isAbsolute",
        "join",
        "normalize",
        "parse",
        "relative",
        "resolve",
        "toNamespacedPath",
    ];

    /// Wrap a configured API
    pub fn new(api: PathApi) -> Self {
        Self { api }
    }

    /// The underlying API
    pub fn api(&self) -> &PathApi {
        &self.api
    }

    /// Invoke `path.<method>(...args)`
    pub fn call(&self, method: &str, args: &[PathValue]) -> Result<PathValue> {
        let api = &self.api;
        match method {
            "basename" => {
                let path = string_arg(args, 0, "path")?;
                let ext = match args.get(1) {
                    None | Some(PathValue::Undefined) => None,
                    Some(_) => Some(string_arg(args, 1, "ext")?),
                };
                Ok(api.basename(path, ext).into())
            }
            "dirname" => Ok(api.dirname(string_arg(args, 0, "path")?).into()),
            "extname" => Ok(api.extname(string_arg(args, 0, "path")?).into()),
            "isAbsolute" => Ok(api.is_absolute(string_arg(args, 0, "path")?).into()),
            "normalize" => Ok(api.normalize(string_arg(args, 0, "path")?).into()),
            "join" => Ok(api.join(&segments(args)?).into()),
            "resolve" => Ok(api.resolve(&segments(args)?).into()),
            "relative" => {
                let from = string_arg(args, 0, "from")?;
                let to = string_arg(args, 1, "to")?;
                Ok(api.relative(from, to)?.into())
            }
            "parse" => Ok(api.parse(string_arg(args, 0, "path")?).into()),
            "format" => match args.first() {
                Some(PathValue::Object(components)) => Ok(api.format(components).into()),
                other => Err(PathError::invalid_arg_type(
                    "pathObject",
                    "object",
                    other.unwrap_or(&PathValue::Undefined).type_name(),
                )),
            },
            // Non-string input is handed back untouched
            "toNamespacedPath" => match args.first() {
                Some(PathValue::String(path)) => Ok(api.to_namespaced_path(path).into()),
                Some(other) => Ok(other.clone()),
                None => Ok(PathValue::Undefined),
            },
            other => Err(PathError::UnknownMethod(other.to_string())),
        }
    }
}

fn string_arg<'a>(args: &'a [PathValue], index: usize, name: &str) -> Result<&'a str> {
    let value = args.get(index).unwrap_or(&PathValue::Undefined);
    value
        .as_str()
        .ok_or_else(|| PathError::invalid_arg_type(name, "string", value.type_name()))
}

fn segments(args: &[PathValue]) -> Result<Vec<&str>> {
    args.iter()
        .map(|segment| {
            segment.as_str().ok_or_else(|| {
                PathError::TypeArgument(format!("Path must be a string. Received {segment}"))
            })
        })
        .collect()
}
