// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Struct elements (fields).

use crate::dd::{ByteOrder, TypeRef};

/// A named field within a struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Field name (unique within the struct).
    pub name: String,
    /// Field type.
    pub type_ref: TypeRef,
    /// Array length (1 = scalar, 0 = empty array).
    pub array_size: usize,
    /// Bit-field width.
    pub bit_width: Option<u32>,
    /// Bit offset inside the bit-field container.
    pub bit_pos: Option<u32>,
    /// Explicit byte position in the serialized representation.
    pub byte_pos: Option<usize>,
    /// Deserialized alignment override.
    pub alignment: Option<usize>,
    /// Serialized byte order override.
    pub byte_order: Option<ByteOrder>,
    /// Enum interpreting a scalar integer element.
    pub enum_ref: Option<String>,
    pub unit: Option<String>,
    pub description: Option<String>,
}

impl Element {
    /// Create a scalar element.
    pub fn new(name: impl Into<String>, type_ref: impl Into<TypeRef>) -> Self {
        Self {
            name: name.into(),
            type_ref: type_ref.into(),
            array_size: 1,
            bit_width: None,
            bit_pos: None,
            byte_pos: None,
            alignment: None,
            byte_order: None,
            enum_ref: None,
            unit: None,
            description: None,
        }
    }

    /// Set the array length.
    #[must_use]
    pub fn array(mut self, size: usize) -> Self {
        self.array_size = size;
        self
    }

    /// Declare a bit-field of `width` bits.
    #[must_use]
    pub fn bits(mut self, width: u32) -> Self {
        self.bit_width = Some(width);
        self
    }

    /// Explicit bit offset inside the container.
    #[must_use]
    pub fn at_bit(mut self, pos: u32) -> Self {
        self.bit_pos = Some(pos);
        self
    }

    /// Explicit serialized byte position.
    #[must_use]
    pub fn at_byte(mut self, pos: usize) -> Self {
        self.byte_pos = Some(pos);
        self
    }

    #[must_use]
    pub fn aligned(mut self, alignment: usize) -> Self {
        self.alignment = Some(alignment);
        self
    }

    #[must_use]
    pub fn byte_order(mut self, order: ByteOrder) -> Self {
        self.byte_order = Some(order);
        self
    }

    #[must_use]
    pub fn with_enum(mut self, enum_name: impl Into<String>) -> Self {
        self.enum_ref = Some(enum_name.into());
        self
    }

    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_bitfield(&self) -> bool {
        self.bit_width.is_some()
    }

    pub fn is_array(&self) -> bool {
        self.array_size != 1
    }

    /// Names of user-defined types this element depends on.
    pub fn referenced_types(&self) -> impl Iterator<Item = &str> {
        self.type_ref
            .named()
            .into_iter()
            .chain(self.enum_ref.as_deref())
    }
}
