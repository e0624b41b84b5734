//! Resolved callables and the resolver capabilities that produce them
//!
//! A [`Transform`] is the only executable thing stored in a compiled mapping.
//! Names are turned into transforms exactly once, at compile time, through a
//! [`Resolve`] implementation handed to the mapper: a closure, a
//! [`FunctionRegistry`] or a [`LookupTables`] set.
//!
//! # Module Organization
//!
//! - [`built_in`] - Registry of named functions, with a built-in set
//! - [`lookup`] - Key-validating lookup tables, inline and named
//!
//! Copyright (c) 2025 Shapemap Team
//! Licensed under the Apache-2.0 license

pub mod built_in;
pub mod lookup;

use crate::Result;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

pub use built_in::FunctionRegistry;
pub use lookup::{lookup_table, LookupTables};

/// Signature shared by every resolved callable
pub type TransformFn = dyn Fn(&Value) -> Result<Value> + Send + Sync;

/// A named, shareable `value -> value` callable
#[derive(Clone)]
pub struct Transform {
    name: String,
    func: Arc<TransformFn>,
}

impl Transform {
    /// Wrap a fallible callable
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// Wrap a callable that cannot fail
    pub fn infallible<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        Self::new(name, move |value| Ok(func(value)))
    }

    /// Name the transform was registered or resolved under
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke the callable
    pub fn call(&self, value: &Value) -> Result<Value> {
        (self.func)(value)
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transform").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Capability turning a name into a callable
///
/// Returning `None` means the name is unknown; the compiler turns that into a
/// compile error naming the resolver kind and the name.
pub trait Resolve: Send + Sync {
    fn resolve(&self, name: &str) -> Option<Transform>;
}

impl<F> Resolve for F
where
    F: Fn(&str) -> Option<Transform> + Send + Sync,
{
    fn resolve(&self, name: &str) -> Option<Transform> {
        self(name)
    }
}

/// Resolver used when none was configured; knows no names
#[derive(Debug, Clone, Copy, Default)]
pub struct Unconfigured;

impl Resolve for Unconfigured {
    fn resolve(&self, name: &str) -> Option<Transform> {
        tracing::debug!(name, "no resolver configured");
        None
    }
}
