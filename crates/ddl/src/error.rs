// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types shared by the DD model, layout calculator, codec and mapping engine.

use crate::convert::ConversionError;
use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Layout computation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// Bit-field (width, or explicit position + width) does not fit its container.
    #[error("bit-field '{element}' needs {needed} bits but its container holds {available}")]
    BitFieldOverflow {
        element: String,
        needed: u32,
        available: u32,
    },

    /// Bit-field declared on something that cannot hold one.
    #[error("invalid bit-field '{element}': {reason}")]
    InvalidBitField {
        element: String,
        reason: &'static str,
    },

    /// Alignment value that is zero or not a power of two.
    #[error("alignment {alignment} of '{item}' is not a power of two")]
    InvalidAlignment { item: String, alignment: usize },

    /// Size computation overflowed `usize`.
    #[error("size of '{item}' overflows")]
    SizeOverflow { item: String },

    /// Struct contains itself, directly or transitively.
    #[error("struct '{name}' contains itself ({path})")]
    CyclicComposition { name: String, path: String },

    /// Flattening would produce more leaves than the configured limit.
    #[error("'{item}' flattens to more than {limit} leaves")]
    TooManyLeaves { item: String, limit: usize },

    /// Element type does not resolve to a scalar, struct or enum.
    #[error("element '{element}' references unknown type '{type_name}'")]
    UnresolvedType { element: String, type_name: String },
}

/// Crate-wide error.
#[derive(Debug, Error)]
pub enum Error {
    #[error("a type named '{0}' already exists")]
    DuplicateName(String),

    #[error("type '{name}' is still referenced by '{referenced_by}'")]
    DanglingReference { name: String, referenced_by: String },

    #[error("unknown type '{0}'")]
    UnknownType(String),

    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("element not found: {0}")]
    ElementNotFound(String),

    #[error("type mismatch on '{element}': expected {expected}, got {found}")]
    TypeMismatch {
        element: String,
        expected: String,
        found: String,
    },

    #[error("value {value} has no symbol in enum '{enum_name}'")]
    UnknownEnumValue { enum_name: String, value: String },

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error("buffer too small: need {need} bytes, have {have}")]
    BufferTooSmall { need: usize, have: usize },

    #[error("layout mismatch: '{source_name}' cannot be transcoded into '{target_name}'")]
    LayoutMismatch {
        source_name: String,
        target_name: String,
    },

    #[error("unknown target: {0}")]
    UnknownTarget(String),

    #[error("unknown trigger: {0}")]
    UnknownTrigger(String),

    #[error("invalid trigger: {0}")]
    InvalidTrigger(String),

    #[error("registration from inside a target callback is not allowed")]
    ReentrantDispatch,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("description error: {0}")]
    Description(String),
}

impl Error {
    pub(crate) fn type_mismatch(
        element: &str,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            element: element.to_string(),
            expected: expected.into(),
            found: found.into(),
        }
    }
}
