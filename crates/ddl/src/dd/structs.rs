// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Struct and enum type definitions.

use crate::dd::{Element, ScalarKind};
use crate::error::{Error, Result};

/// Ordered sequence of elements with a name, alignment and version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructType {
    pub name: String,
    pub elements: Vec<Element>,
    /// Minimum alignment of the struct in the deserialized representation.
    pub alignment: usize,
    pub version: u32,
    pub comment: Option<String>,
}

impl StructType {
    /// Create an empty struct (alignment 1, version 1).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            elements: Vec::new(),
            alignment: 1,
            version: 1,
            comment: None,
        }
    }

    /// Append an element.
    #[must_use]
    pub fn element(mut self, element: Element) -> Self {
        self.elements.push(element);
        self
    }

    #[must_use]
    pub fn with_alignment(mut self, alignment: usize) -> Self {
        self.alignment = alignment;
        self
    }

    #[must_use]
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Append an element in place.
    pub fn push(&mut self, element: Element) {
        self.elements.push(element);
    }

    /// Get element by name.
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.name == name)
    }

    /// Get element index by name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.elements.iter().position(|e| e.name == name)
    }

    /// True when any element depends on the type `name`.
    pub fn references(&self, name: &str) -> bool {
        self.elements
            .iter()
            .any(|e| e.referenced_types().any(|r| r == name))
    }
}

/// Enum symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    pub name: String,
    pub value: i64,
}

/// Named integer constants over an integer scalar kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    pub name: String,
    pub underlying: ScalarKind,
    pub values: Vec<EnumValue>,
}

impl EnumType {
    /// Create an enum backed by `tInt32`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            underlying: ScalarKind::I32,
            values: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_underlying(mut self, underlying: ScalarKind) -> Self {
        self.underlying = underlying;
        self
    }

    /// Append a symbol (builder style, duplicates are caught by validation).
    #[must_use]
    pub fn value(mut self, name: impl Into<String>, value: i64) -> Self {
        self.values.push(EnumValue {
            name: name.into(),
            value,
        });
        self
    }

    /// Insert a symbol, rejecting duplicate names.
    pub fn insert(&mut self, name: impl Into<String>, value: i64) -> Result<()> {
        let name = name.into();
        if self.values.iter().any(|v| v.name == name) {
            return Err(Error::DuplicateName(format!("{}.{}", self.name, name)));
        }
        self.values.push(EnumValue { name, value });
        Ok(())
    }

    /// Value of a symbol.
    pub fn value_of(&self, name: &str) -> Option<i64> {
        self.values.iter().find(|v| v.name == name).map(|v| v.value)
    }

    /// First symbol carrying `value`.
    pub fn name_of(&self, value: i64) -> Option<&str> {
        self.values
            .iter()
            .find(|v| v.value == value)
            .map(|v| v.name.as_str())
    }
}
