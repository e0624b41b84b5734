//! Error types for the Shapemap core library
//!
//! Every failure is fatal to the call that raised it: `compile` either
//! produces a complete mapping or nothing, and `apply_to` either produces a
//! complete output value or nothing.
//!
//! Copyright (c) 2025 Shapemap Team
//! Licensed under the Apache-2.0 license

use std::fmt;
use thiserror::Error;
use serde::{Deserialize, Serialize};

/// Main error type for Shapemap operations
#[derive(Error, Debug)]
pub enum Error {
    /// A definition key has no matching property in the output schema
    #[error("unable to resolve target field `{field}`")]
    TargetUnresolved { field: String },

    /// A `source` name has no matching property in the input schema
    #[error("unable to resolve source field `{source_name}` for target `{field}`")]
    SourceUnresolved { field: String, source_name: String },

    /// Two strategies that cannot coexist were declared on one field
    #[error("incompatible strategies for `{field}`: {detail}")]
    IncompatibleStrategies { field: String, detail: String },

    /// `$nested` was declared on a target that is neither object nor array
    #[error("unexpected target type `{found}` for nested strategy on `{field}`")]
    NestedTargetType { field: String, found: String },

    /// A `$nested` sequence was declared on an object target
    #[error("array not allowed for object target `{field}`")]
    NestedArrayForObject { field: String },

    /// `lookup` was declared without a `source`
    #[error("lookup requires source for `{field}`")]
    LookupWithoutSource { field: String },

    /// None of `source`, `lookup`, `function` or `$nested` was declared
    #[error("no recognized strategy for field `{field}`")]
    NoStrategy { field: String },

    /// The same key was declared as a strategy and in `$constant`
    #[error("duplicate field `{field}` in strategy and constant")]
    DuplicateField { field: String },

    /// A field spec was present but malformed (wrong value types)
    #[error("invalid field spec for `{field}`: {message}")]
    InvalidFieldSpec { field: String, message: String },

    /// A top-level argument to `compile` had the wrong shape
    #[error("invalid {argument}: {message}")]
    InvalidArgument { argument: String, message: String },

    /// A resolver could not produce a callable for a name
    #[error("unable to resolve {kind} `{name}`")]
    Unresolved { kind: ResolverKind, name: String },

    /// An inline or named lookup table has no entry for the input value
    #[error("unknown lookup value `{value}` for target `{target}`")]
    UnknownLookupValue { value: String, target: String },

    /// A resolved transform callable failed
    #[error("transform `{name}` failed: {message}")]
    Transform {
        name: String,
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// `apply_to` was called before any successful `compile`
    #[error("compile required before apply")]
    CompileRequired,

    /// JSON parsing and serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Which resolver capability a name was handed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolverKind {
    /// Named transform functions
    Function,
    /// Named lookup tables
    Lookup,
}

/// The phase in which an error was raised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Contract violations found while compiling a definition
    Compile,
    /// Data-dependent failures while applying a compiled mapping
    Apply,
    /// Malformed serialized input handed to the library
    Input,
}

impl Error {
    /// Create a transform failure with a plain message
    pub fn transform(name: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Transform {
            name: name.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create an incompatible-strategies error
    pub fn incompatible(field: impl Into<String>, detail: impl Into<String>) -> Self {
        Error::IncompatibleStrategies {
            field: field.into(),
            detail: detail.into(),
        }
    }

    /// Create an invalid field spec error
    pub fn invalid_field_spec(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidFieldSpec {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(argument: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidArgument {
            argument: argument.into(),
            message: message.into(),
        }
    }

    /// The phase this error belongs to
    pub fn phase(&self) -> Phase {
        match self {
            Error::TargetUnresolved { .. }
            | Error::SourceUnresolved { .. }
            | Error::IncompatibleStrategies { .. }
            | Error::NestedTargetType { .. }
            | Error::NestedArrayForObject { .. }
            | Error::LookupWithoutSource { .. }
            | Error::NoStrategy { .. }
            | Error::DuplicateField { .. }
            | Error::InvalidFieldSpec { .. }
            | Error::InvalidArgument { .. }
            | Error::Unresolved { .. } => Phase::Compile,
            Error::UnknownLookupValue { .. }
            | Error::Transform { .. }
            | Error::CompileRequired => Phase::Apply,
            Error::Json { .. } => Phase::Input,
        }
    }
}

impl fmt::Display for ResolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolverKind::Function => write!(f, "function"),
            ResolverKind::Lookup => write!(f, "lookup"),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Compile => write!(f, "compile"),
            Phase::Apply => write!(f, "apply"),
            Phase::Input => write!(f, "input"),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Transform {
            name: "<anonymous>".to_string(),
            message: err.to_string(),
            source: Some(err),
        }
    }
}
