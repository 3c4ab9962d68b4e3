//! Typed, process-wide configuration variables and their field bindings.
//!
//! A [`FieldBinding`] ties a key of a config resource to a typed variable
//! and an optional default. [`apply_fields`] walks the bindings against a
//! resource's data:
//!
//! - absent key: the default is written if one is declared, otherwise the
//!   variable keeps its value;
//! - string: copied verbatim, except that an empty string is ignored;
//! - integer: parsed as `i64`, unparsable text is ignored;
//! - boolean: `true`/`false` in any case, anything else is ignored.
//!
//! Variables are written by one handler at a time but may be read from any
//! thread, so integers and booleans are atomics and strings sit behind a
//! read/write lock.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use parking_lot::RwLock;

/// Shared string setting.
#[derive(Debug, Default)]
pub struct StringVar(RwLock<String>);

impl StringVar {
    /// Variable holding `value`.
    pub fn new(value: impl Into<String>) -> Self {
        Self(RwLock::new(value.into()))
    }

    /// Current value.
    pub fn get(&self) -> String {
        self.0.read().clone()
    }

    /// Whether the current value is empty.
    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    /// Replace the value.
    pub fn set(&self, value: impl Into<String>) {
        *self.0.write() = value.into();
    }
}

/// Shared integer setting.
#[derive(Debug, Default)]
pub struct IntVar(AtomicI64);

impl IntVar {
    /// Variable holding `value`.
    pub const fn new(value: i64) -> Self {
        Self(AtomicI64::new(value))
    }

    /// Current value.
    pub fn get(&self) -> i64 {
        self.0.load(Ordering::Acquire)
    }

    /// Replace the value.
    pub fn set(&self, value: i64) {
        self.0.store(value, Ordering::Release);
    }
}

/// Shared boolean setting.
#[derive(Debug, Default)]
pub struct BoolVar(AtomicBool);

impl BoolVar {
    /// Variable holding `value`.
    pub const fn new(value: bool) -> Self {
        Self(AtomicBool::new(value))
    }

    /// Current value.
    pub fn get(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Replace the value.
    pub fn set(&self, value: bool) {
        self.0.store(value, Ordering::Release);
    }
}

/// Typed target of a binding, with its optional default.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind<'a> {
    /// String field. An empty default counts as no default.
    Str(&'a StringVar, Option<&'static str>),
    /// Integer field.
    Int(&'a IntVar, Option<i64>),
    /// Boolean field.
    Bool(&'a BoolVar, Option<bool>),
}

/// Binding of a resource key to a variable.
#[derive(Debug, Clone, Copy)]
pub struct FieldBinding<'a> {
    /// Key in the resource data.
    pub key: &'static str,
    /// Variable and default.
    pub kind: FieldKind<'a>,
}

impl<'a> FieldBinding<'a> {
    /// String binding.
    pub const fn string(key: &'static str, var: &'a StringVar, default: Option<&'static str>) -> Self {
        Self {
            key,
            kind: FieldKind::Str(var, default),
        }
    }

    /// Integer binding.
    pub const fn int(key: &'static str, var: &'a IntVar, default: Option<i64>) -> Self {
        Self {
            key,
            kind: FieldKind::Int(var, default),
        }
    }

    /// Boolean binding.
    pub const fn boolean(key: &'static str, var: &'a BoolVar, default: Option<bool>) -> Self {
        Self {
            key,
            kind: FieldKind::Bool(var, default),
        }
    }

    fn apply_default(&self) {
        match self.kind {
            FieldKind::Str(var, Some(default)) if !default.is_empty() => var.set(default),
            FieldKind::Int(var, Some(default)) => var.set(default),
            FieldKind::Bool(var, Some(default)) => var.set(default),
            _ => {}
        }
    }

    fn apply_value(&self, value: &str) {
        match self.kind {
            FieldKind::Str(var, _) => {
                if !value.is_empty() {
                    var.set(value);
                }
            }
            FieldKind::Int(var, _) => match value.parse::<i64>() {
                Ok(parsed) => var.set(parsed),
                Err(e) => tracing::warn!(key = self.key, value, "ignoring non-integer value: {e}"),
            },
            FieldKind::Bool(var, _) => match value.to_ascii_lowercase().as_str() {
                "true" => var.set(true),
                "false" => var.set(false),
                _ => tracing::warn!(key = self.key, value, "ignoring non-boolean value"),
            },
        }
    }
}

/// Apply `data` to every binding.
pub fn apply_fields(data: &BTreeMap<String, String>, bindings: &[FieldBinding<'_>]) {
    for binding in bindings {
        match data.get(binding.key) {
            Some(value) => binding.apply_value(value),
            None => binding.apply_default(),
        }
    }
}
