// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Struct layouts: byte/bit offsets, padding and sizes per representation.
//!
//! A [`StructLayout`] is derived from a `StructType` and is immutable. It is
//! shared as `Arc<StructLayout>` and borrowed by decoders and codecs.
//!
//! ```text
//! struct { uint16 a; uint8 flag:1; uint32 b; }   default element alignment 4
//!
//! deserialized  | a a . . | f . . . | b b b b |   size 12
//! serialized    | a a f b b b b |                 size 7
//! ```

mod cache;
mod calculator;

pub use cache::{CacheStats, LayoutCache};
pub use calculator::compute_layout;

use crate::dd::{ByteOrder, EnumType, ScalarKind};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// The two byte representations of a struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Representation {
    /// Packed, explicit byte order, no padding (wire/disk).
    Serialized,
    /// Native alignment, padding and byte order (in-memory struct).
    Deserialized,
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Serialized => "serialized",
            Self::Deserialized => "deserialized",
        })
    }
}

/// Position of a bit-field inside its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitField {
    /// Offset of the least significant bit inside the container value.
    pub pos: u32,
    pub width: u32,
}

impl BitField {
    /// Mask of `width` low bits.
    pub fn mask(&self) -> u64 {
        if self.width >= 64 {
            u64::MAX
        } else {
            (1u64 << self.width) - 1
        }
    }
}

/// What an element slot holds.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    Scalar(ScalarKind),
    Enum {
        base: ScalarKind,
        definition: Arc<EnumType>,
    },
    Struct(Arc<StructLayout>),
}

impl ElementKind {
    /// Scalar storage kind (`None` for nested structs).
    pub fn scalar(&self) -> Option<ScalarKind> {
        match self {
            Self::Scalar(kind) | Self::Enum { base: kind, .. } => Some(*kind),
            Self::Struct(_) => None,
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            Self::Scalar(kind) => kind.ddl_name(),
            Self::Enum { definition, .. } => &definition.name,
            Self::Struct(layout) => layout.name(),
        }
    }
}

/// Placement of one element.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementLayout {
    pub name: String,
    pub kind: ElementKind,
    /// Byte offset of the first item (bit-field: of the container).
    pub offset: usize,
    /// Bytes per array item.
    pub stride: usize,
    pub array_size: usize,
    pub bits: Option<BitField>,
    pub byte_order: ByteOrder,
}

impl ElementLayout {
    /// Bytes covered by the element.
    pub fn size(&self) -> usize {
        self.stride * self.array_size
    }

    pub fn is_array(&self) -> bool {
        self.array_size != 1
    }
}

/// Unused byte range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Padding {
    pub offset: usize,
    pub len: usize,
}

/// A scalar slot after flattening nested structs and arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafLayout {
    /// Path such as `pose.position.x` or `samples[3]`.
    pub path: String,
    pub kind: ScalarKind,
    pub enum_type: Option<Arc<EnumType>>,
    /// Absolute byte offset (bit-field: of the container).
    pub offset: usize,
    pub bits: Option<BitField>,
    pub byte_order: ByteOrder,
}

/// Computed layout of one struct in one representation.
#[derive(Debug, Clone, PartialEq)]
pub struct StructLayout {
    name: String,
    version: u32,
    representation: Representation,
    size: usize,
    alignment: usize,
    elements: Vec<ElementLayout>,
    padding: Vec<Padding>,
    leaves: Vec<LeafLayout>,
    leaf_index: HashMap<String, usize>,
}

impl StructLayout {
    pub(crate) fn new(
        name: String,
        version: u32,
        representation: Representation,
        size: usize,
        alignment: usize,
        elements: Vec<ElementLayout>,
        padding: Vec<Padding>,
    ) -> Self {
        let leaves = flatten(&elements);
        let leaf_index = leaves
            .iter()
            .enumerate()
            .map(|(i, leaf)| (leaf.path.clone(), i))
            .collect();
        Self {
            name,
            version,
            representation,
            size,
            alignment,
            elements,
            padding,
            leaves,
            leaf_index,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Version of the struct the layout was computed from.
    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn representation(&self) -> Representation {
        self.representation
    }

    /// Total size in bytes (including tail padding).
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn alignment(&self) -> usize {
        self.alignment
    }

    /// Top-level elements in declaration order.
    pub fn elements(&self) -> &[ElementLayout] {
        &self.elements
    }

    pub fn element(&self, name: &str) -> Option<&ElementLayout> {
        self.elements.iter().find(|e| e.name == name)
    }

    pub fn element_index(&self, name: &str) -> Option<usize> {
        self.elements.iter().position(|e| e.name == name)
    }

    /// Padding ranges (alignment gaps, tail padding, explicit-position gaps).
    pub fn padding(&self) -> &[Padding] {
        &self.padding
    }

    /// Flattened scalar slots in declaration order.
    pub fn leaves(&self) -> &[LeafLayout] {
        &self.leaves
    }

    pub fn leaf(&self, path: &str) -> Option<&LeafLayout> {
        self.leaf_index.get(path).map(|&i| &self.leaves[i])
    }

    pub fn leaf_index(&self, path: &str) -> Option<usize> {
        self.leaf_index.get(path).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

fn flatten(elements: &[ElementLayout]) -> Vec<LeafLayout> {
    let mut leaves = Vec::new();
    for element in elements {
        if matches!(&element.kind, ElementKind::Struct(nested) if nested.leaves().is_empty()) {
            continue;
        }
        for index in 0..element.array_size {
            let path = if element.is_array() {
                format!("{}[{}]", element.name, index)
            } else {
                element.name.clone()
            };
            let offset = element.offset + index * element.stride;
            match &element.kind {
                ElementKind::Struct(nested) => {
                    leaves.extend(nested.leaves().iter().map(|leaf| LeafLayout {
                        path: format!("{}.{}", path, leaf.path),
                        offset: offset + leaf.offset,
                        ..leaf.clone()
                    }));
                }
                ElementKind::Scalar(kind) => leaves.push(LeafLayout {
                    path,
                    kind: *kind,
                    enum_type: None,
                    offset,
                    bits: element.bits,
                    byte_order: element.byte_order,
                }),
                ElementKind::Enum { base, definition } => leaves.push(LeafLayout {
                    path,
                    kind: *base,
                    enum_type: Some(Arc::clone(definition)),
                    offset,
                    bits: element.bits,
                    byte_order: element.byte_order,
                }),
            }
        }
    }
    leaves
}

#[cfg(test)]
mod tests;
