// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Layout calculator.
//!
//! Walks the elements in declaration order with a byte cursor and an open
//! bit-field container:
//!
//! - **Deserialized**: the cursor is aligned to
//!   `max(element alignment or default alignment, natural alignment)` before
//!   every element or new bit-field container; the size is rounded up to the
//!   struct alignment. Byte order is native.
//! - **Serialized**: no padding. Elements follow each other unless an
//!   explicit byte position places them; the cursor keeps the furthest end.
//! - **Bit-fields**: consecutive fields of the same container kind share the
//!   container while they fit; a field that does not fit its container is a
//!   `BitFieldOverflow`, never spilled into the next byte.

use crate::config::is_valid_alignment;
use crate::dd::{ByteOrder, DataDefinition, Element, ResolvedType, ScalarKind, StructType};
use crate::error::LayoutError;
use crate::layout::{
    BitField, ElementKind, ElementLayout, Padding, Representation, StructLayout,
};
use std::sync::Arc;

/// Compute the layout of `struct_type` without consulting the cache for the
/// struct itself (nested structs go through the definition's cache).
pub fn compute_layout(
    dd: &DataDefinition,
    struct_type: &StructType,
    representation: Representation,
) -> Result<StructLayout, LayoutError> {
    crate::trace_fn!("compute_layout");
    Calculator {
        dd,
        representation,
        stack: Vec::new(),
    }
    .compute(struct_type)
}

/// Open bit-field container.
struct BitRun {
    offset: usize,
    kind: ScalarKind,
    byte_order: ByteOrder,
    used: u32,
}

struct Calculator<'a> {
    dd: &'a DataDefinition,
    representation: Representation,
    /// Structs being computed (cycle detection).
    stack: Vec<String>,
}

impl Calculator<'_> {
    fn compute(&mut self, struct_type: &StructType) -> Result<StructLayout, LayoutError> {
        self.enter(&struct_type.name)?;
        let result = self.place(struct_type);
        self.stack.pop();
        result
    }

    fn enter(&mut self, name: &str) -> Result<(), LayoutError> {
        if self.stack.iter().any(|n| n == name) {
            let mut path = self.stack.join(" -> ");
            path.push_str(" -> ");
            path.push_str(name);
            return Err(LayoutError::CyclicComposition {
                name: name.to_string(),
                path,
            });
        }
        self.stack.push(name.to_string());
        Ok(())
    }

    fn nested(&mut self, name: &str) -> Result<Arc<StructLayout>, LayoutError> {
        if self.stack.iter().any(|n| n == name) {
            // Reported with the full path by `enter`.
            self.enter(name)?;
        }
        let cache = self.dd.layout_cache();
        if let Some(cached) = cache.get(name, self.representation) {
            return Ok(cached);
        }
        let struct_type = self
            .dd
            .get_struct(name)
            .ok_or_else(|| LayoutError::UnresolvedType {
                element: self.stack.last().cloned().unwrap_or_default(),
                type_name: name.to_string(),
            })?;
        let layout = Arc::new(self.compute(struct_type)?);
        cache.insert(name, self.representation, Arc::clone(&layout));
        Ok(layout)
    }

    /// Element kind, natural alignment and per-item size.
    fn resolve(
        &mut self,
        owner: &str,
        element: &Element,
    ) -> Result<(ElementKind, usize, usize), LayoutError> {
        let unresolved = |type_name: &str| LayoutError::UnresolvedType {
            element: format!("{}.{}", owner, element.name),
            type_name: type_name.to_string(),
        };

        let nested_name = match self.dd.resolve(&element.type_ref) {
            None => return Err(unresolved(element.type_ref.name())),
            Some(ResolvedType::Scalar(kind)) => {
                let resolved = match &element.enum_ref {
                    Some(enum_name) => {
                        let definition = self
                            .dd
                            .get_enum(enum_name)
                            .ok_or_else(|| unresolved(enum_name))?;
                        ElementKind::Enum {
                            base: kind,
                            definition: Arc::clone(definition),
                        }
                    }
                    None => ElementKind::Scalar(kind),
                };
                return Ok((resolved, kind.alignment(), kind.size()));
            }
            Some(ResolvedType::Enum(definition)) => {
                let base = definition.underlying;
                return Ok((
                    ElementKind::Enum {
                        base,
                        definition: Arc::clone(definition),
                    },
                    base.alignment(),
                    base.size(),
                ));
            }
            Some(ResolvedType::Struct(nested)) => nested.name.clone(),
        };

        let layout = self.nested(&nested_name)?;
        let (alignment, size) = (layout.alignment(), layout.size());
        Ok((ElementKind::Struct(layout), alignment, size))
    }

    fn place(&mut self, struct_type: &StructType) -> Result<StructLayout, LayoutError> {
        let name = struct_type.name.as_str();
        if !is_valid_alignment(struct_type.alignment) {
            return Err(LayoutError::InvalidAlignment {
                item: name.to_string(),
                alignment: struct_type.alignment,
            });
        }

        let deserialized = self.representation == Representation::Deserialized;
        let default_alignment = self.dd.config().default_alignment;
        let default_order = self.dd.byte_order();
        let max_leaves = self.dd.config().max_leaves;
        let mut leaf_count = 0usize;

        let mut cursor = 0usize;
        let mut max_alignment = 1usize;
        let mut run: Option<BitRun> = None;
        let mut elements = Vec::with_capacity(struct_type.elements.len());
        let mut padding = Vec::new();

        for element in &struct_type.elements {
            let item = || format!("{}.{}", name, element.name);
            let (kind, natural, stride) = self.resolve(name, element)?;

            let requested = match element.alignment {
                Some(a) if !is_valid_alignment(a) => {
                    return Err(LayoutError::InvalidAlignment {
                        item: item(),
                        alignment: a,
                    })
                }
                Some(a) => a,
                None => default_alignment,
            };
            let alignment = requested.max(natural);
            let byte_order = if deserialized {
                ByteOrder::native()
            } else {
                element.byte_order.unwrap_or(default_order)
            };
            let explicit_byte = if deserialized { None } else { element.byte_pos };

            if let Some(width) = element.bit_width {
                let container = match kind.scalar() {
                    Some(k) if k.is_integer() => k,
                    _ => {
                        return Err(LayoutError::InvalidBitField {
                            element: item(),
                            reason: "bit-fields need an integer type",
                        })
                    }
                };
                if element.array_size != 1 {
                    return Err(LayoutError::InvalidBitField {
                        element: item(),
                        reason: "bit-fields cannot be arrays",
                    });
                }
                if width == 0 {
                    return Err(LayoutError::InvalidBitField {
                        element: item(),
                        reason: "bit-field width is zero",
                    });
                }
                let available = container.bits();
                let needed = element.bit_pos.unwrap_or(0).saturating_add(width);
                if width > available || needed > available {
                    return Err(LayoutError::BitFieldOverflow {
                        element: item(),
                        needed: needed.max(width),
                        available,
                    });
                }

                let shared = run.as_ref().and_then(|open| {
                    let same_container = open.kind == container
                        && open.byte_order == byte_order
                        && explicit_byte.map_or(true, |b| b == open.offset);
                    let pos = element.bit_pos.unwrap_or(open.used);
                    (same_container && pos >= open.used && pos + width <= available)
                        .then_some((open.offset, pos))
                });

                let (offset, pos) = match shared {
                    Some(found) => found,
                    None => {
                        let offset = match explicit_byte {
                            Some(b) => b,
                            None if deserialized => {
                                align_cursor(&mut cursor, alignment, &mut padding, &item)?
                            }
                            None => cursor,
                        };
                        if !deserialized && offset > cursor {
                            padding.push(Padding {
                                offset: cursor,
                                len: offset - cursor,
                            });
                        }
                        let end = checked_end(offset, container.size(), &item)?;
                        cursor = cursor.max(end);
                        if deserialized {
                            max_alignment = max_alignment.max(alignment);
                        }
                        run = Some(BitRun {
                            offset,
                            kind: container,
                            byte_order,
                            used: 0,
                        });
                        (offset, element.bit_pos.unwrap_or(0))
                    }
                };
                if let Some(open) = run.as_mut() {
                    open.used = pos + width;
                }
                count_leaves(&mut leaf_count, 1, max_leaves, &item)?;

                elements.push(ElementLayout {
                    name: element.name.clone(),
                    kind,
                    offset,
                    stride: container.size(),
                    array_size: 1,
                    bits: Some(BitField { pos, width }),
                    byte_order,
                });
                continue;
            }

            run = None;
            if element.bit_pos.is_some() {
                return Err(LayoutError::InvalidBitField {
                    element: item(),
                    reason: "bit position without bit width",
                });
            }

            let total = stride
                .checked_mul(element.array_size)
                .ok_or_else(|| LayoutError::SizeOverflow { item: item() })?;
            let per_item = match &kind {
                ElementKind::Struct(nested) => nested.leaves().len(),
                _ => 1,
            };
            let element_leaves = per_item.checked_mul(element.array_size).unwrap_or(usize::MAX);
            count_leaves(&mut leaf_count, element_leaves, max_leaves, &item)?;
            let offset = if deserialized {
                max_alignment = max_alignment.max(alignment);
                align_cursor(&mut cursor, alignment, &mut padding, &item)?
            } else {
                let offset = explicit_byte.unwrap_or(cursor);
                if offset > cursor {
                    padding.push(Padding {
                        offset: cursor,
                        len: offset - cursor,
                    });
                }
                offset
            };
            let end = checked_end(offset, total, &item)?;
            cursor = cursor.max(end);

            elements.push(ElementLayout {
                name: element.name.clone(),
                kind,
                offset,
                stride,
                array_size: element.array_size,
                bits: None,
                byte_order,
            });
        }

        let (alignment, size) = if deserialized {
            let alignment = struct_type.alignment.max(max_alignment);
            let mut size = cursor;
            align_cursor(&mut size, alignment, &mut padding, &|| name.to_string())?;
            (alignment, size)
        } else {
            (1, cursor)
        };

        log::debug!(
            "[Calculator::place] {} ({}): size {}, {} element(s)",
            name,
            self.representation,
            size,
            elements.len()
        );

        Ok(StructLayout::new(
            name.to_string(),
            struct_type.version,
            self.representation,
            size,
            alignment,
            elements,
            padding,
        ))
    }
}

/// Align `cursor` up, recording the gap. Returns the aligned offset.
fn align_cursor(
    cursor: &mut usize,
    alignment: usize,
    padding: &mut Vec<Padding>,
    item: &dyn Fn() -> String,
) -> Result<usize, LayoutError> {
    let mask = alignment - 1;
    let aligned = cursor
        .checked_add(mask)
        .map(|v| v & !mask)
        .ok_or_else(|| LayoutError::SizeOverflow { item: item() })?;
    if aligned > *cursor {
        padding.push(Padding {
            offset: *cursor,
            len: aligned - *cursor,
        });
    }
    *cursor = aligned;
    Ok(aligned)
}

/// Add `count` to the running leaf total, failing past `limit`.
fn count_leaves(
    total: &mut usize,
    count: usize,
    limit: usize,
    item: &dyn Fn() -> String,
) -> Result<(), LayoutError> {
    match total.checked_add(count) {
        Some(sum) if sum <= limit => {
            *total = sum;
            Ok(())
        }
        _ => Err(LayoutError::TooManyLeaves {
            item: item(),
            limit,
        }),
    }
}

fn checked_end(
    offset: usize,
    len: usize,
    item: &dyn Fn() -> String,
) -> Result<usize, LayoutError> {
    offset
        .checked_add(len)
        .ok_or_else(|| LayoutError::SizeOverflow { item: item() })
}
