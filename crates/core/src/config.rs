// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed configuration tree.
//!
//! Loaded from TOML. String values may embed `${env.NAME}` references, which
//! are resolved against the process environment at load time, before any
//! subsystem sees the tree. Unknown keys never fail a load; callers collect
//! them with [`Config::unknown_keys`] and log them at Alert.

use std::path::Path;
use thiserror::Error;
use toml::Value;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config references undefined environment variable '{0}'")]
    MissingEnv(String),

    #[error("unterminated ${{env.…}} reference in '{0}'")]
    UnterminatedEnvRef(String),
}

/// An immutable tree of typed configuration values.
#[derive(Debug, Clone, Default)]
pub struct Config {
    root: Option<Value>,
}

impl Config {
    /// An empty tree; every lookup returns `None`.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_str(text: &str) -> Result<Self, ConfigError> {
        let mut root: Value = toml::from_str(text)?;
        resolve_env_refs(&mut root)?;
        Ok(Self { root: Some(root) })
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        Self::from_str(&std::fs::read_to_string(path)?)
    }

    /// Look up a value by dotted path, e.g. `"logging.file.path"`.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut node = self.root.as_ref()?;
        for segment in path.split('.') {
            node = node.as_table()?.get(segment)?;
        }
        Some(node)
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path)?.as_str()
    }

    pub fn get_i64(&self, path: &str) -> Option<i64> {
        self.get(path)?.as_integer()
    }

    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.get(path)?.as_bool()
    }

    pub fn str_or(&self, path: &str, default: &str) -> String {
        self.get_str(path).unwrap_or(default).to_string()
    }

    pub fn i64_or(&self, path: &str, default: i64) -> i64 {
        self.get_i64(path).unwrap_or(default)
    }

    pub fn bool_or(&self, path: &str, default: bool) -> bool {
        self.get_bool(path).unwrap_or(default)
    }

    /// Keys present under `path` that are not in `known`.
    ///
    /// Returns dotted paths relative to the tree root so they can be logged
    /// verbatim. A missing or non-table node yields nothing.
    pub fn unknown_keys(&self, path: &str, known: &[&str]) -> Vec<String> {
        let node = if path.is_empty() { self.root.as_ref() } else { self.get(path) };
        let Some(table) = node.and_then(Value::as_table) else {
            return Vec::new();
        };
        table
            .keys()
            .filter(|key| !known.contains(&key.as_str()))
            .map(|key| {
                if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                }
            })
            .collect()
    }
}

/// Replace `${env.NAME}` references in every string value of the tree.
fn resolve_env_refs(value: &mut Value) -> Result<(), ConfigError> {
    match value {
        Value::String(s) => {
            if s.contains("${env.") {
                *s = interpolate(s)?;
            }
            Ok(())
        }
        Value::Array(items) => items.iter_mut().try_for_each(resolve_env_refs),
        Value::Table(table) => table.iter_mut().map(|(_, v)| v).try_for_each(resolve_env_refs),
        _ => Ok(()),
    }
}

fn interpolate(input: &str) -> Result<String, ConfigError> {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find("${env.") {
        out.push_str(&rest[..start]);
        let after_marker = &rest[start + "${env.".len()..];
        let end = after_marker
            .find('}')
            .ok_or_else(|| ConfigError::UnterminatedEnvRef(input.to_string()))?;
        let name = &after_marker[..end];
        let resolved =
            std::env::var(name).map_err(|_| ConfigError::MissingEnv(name.to_string()))?;
        out.push_str(&resolved);
        rest = &after_marker[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
