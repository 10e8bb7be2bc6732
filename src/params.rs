//! # Parameter Store
//!
//! Named key/value lookup used once at startup to resolve node configuration.
//!
//! Missing keys silently fall back to the caller's default. A value of the
//! wrong type is logged and also falls back, except that an integer is
//! accepted where a float is expected.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::{Ps4ControllerError, Result};

/// A single parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl ParamValue {
    fn kind(&self) -> &'static str {
        match self {
            ParamValue::Bool(_) => "bool",
            ParamValue::Int(_) => "int",
            ParamValue::Float(_) => "float",
            ParamValue::Str(_) => "string",
        }
    }
}

impl From<&toml::Value> for ParamValue {
    fn from(value: &toml::Value) -> Self {
        match value {
            toml::Value::Boolean(b) => ParamValue::Bool(*b),
            toml::Value::Integer(i) => ParamValue::Int(*i),
            toml::Value::Float(f) => ParamValue::Float(*f),
            toml::Value::String(s) => ParamValue::Str(s.clone()),
            other => ParamValue::Str(other.to_string()),
        }
    }
}

/// Read-only parameter lookup.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use ps4_controller::params::{ParamStore, ParamValue};
///
/// let mut store = HashMap::new();
/// store.insert("scale_linear".to_string(), ParamValue::Float(0.5));
///
/// assert_eq!(store.float("scale_linear", 1.0), 0.5);
/// assert_eq!(store.float("scale_angular", 1.0), 1.0);
/// ```
pub trait ParamStore {
    /// Look up a raw value by name.
    fn get(&self, name: &str) -> Option<ParamValue>;

    /// Resolve a float parameter, falling back to `default`.
    fn float(&self, name: &str, default: f64) -> f64 {
        match self.get(name) {
            None => {
                debug!("Parameter {} not set, using default {}", name, default);
                default
            }
            Some(ParamValue::Float(value)) => value,
            Some(ParamValue::Int(value)) => value as f64,
            Some(other) => {
                warn!(
                    "Parameter {} has type {}, expected float; using default {}",
                    name,
                    other.kind(),
                    default
                );
                default
            }
        }
    }

    /// Resolve a non-negative index parameter, falling back to `default`.
    ///
    /// # Errors
    ///
    /// Returns `Param` if the stored integer is negative or does not fit in `usize`.
    fn index(&self, name: &str, default: usize) -> Result<usize> {
        match self.get(name) {
            None => {
                debug!("Parameter {} not set, using default {}", name, default);
                Ok(default)
            }
            Some(ParamValue::Int(value)) => {
                usize::try_from(value).map_err(|_| Ps4ControllerError::Param {
                    name: name.to_string(),
                    reason: format!("{} is not a valid index", value),
                })
            }
            Some(other) => {
                warn!(
                    "Parameter {} has type {}, expected int; using default {}",
                    name,
                    other.kind(),
                    default
                );
                Ok(default)
            }
        }
    }
}

impl ParamStore for toml::Table {
    fn get(&self, name: &str) -> Option<ParamValue> {
        toml::Table::get(self, name).map(ParamValue::from)
    }
}

impl ParamStore for HashMap<String, ParamValue> {
    fn get(&self, name: &str) -> Option<ParamValue> {
        HashMap::get(self, name).cloned()
    }
}
