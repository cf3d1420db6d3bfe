// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `Decoder` (read-only) and `Codec` (read/write) views of a buffer.

use super::access::ScalarSlot;
use super::element_id::{ElementId, Selection};
use super::Variant;
use crate::dd::ScalarKind;
use crate::error::{Error, Result};
use crate::layout::{ElementKind, ElementLayout, StructLayout};

fn check_size(layout: &StructLayout, len: usize) -> Result<()> {
    if len < layout.size() {
        log::debug!(
            "[Decoder::new] buffer of {} bytes is too small for '{}' ({} bytes)",
            len,
            layout.name(),
            layout.size()
        );
        return Err(Error::BufferTooSmall {
            need: layout.size(),
            have: len,
        });
    }
    Ok(())
}

/// Read-only typed access to a buffer laid out as `layout`.
#[derive(Debug, Clone, Copy)]
pub struct Decoder<'a> {
    layout: &'a StructLayout,
    buffer: &'a [u8],
}

impl<'a> Decoder<'a> {
    /// Fails with `BufferTooSmall` when `buffer` is shorter than the layout.
    pub fn new(layout: &'a StructLayout, buffer: &'a [u8]) -> Result<Self> {
        check_size(layout, buffer.len())?;
        Ok(Self { layout, buffer })
    }

    pub fn layout(&self) -> &'a StructLayout {
        self.layout
    }

    pub fn buffer(&self) -> &'a [u8] {
        self.buffer
    }

    pub fn element_count(&self) -> usize {
        self.layout.elements().len()
    }

    pub fn leaf_count(&self) -> usize {
        self.layout.leaves().len()
    }

    /// Value of an element, array or nested struct.
    pub fn get_element_value<'p>(&self, id: impl Into<ElementId<'p>>) -> Result<Variant> {
        let id = id.into();
        let selection = Selection::resolve(self.layout, id)?;
        if selection.whole_array {
            read_array(self.buffer, selection.element, selection.offset)
        } else {
            read_item(self.buffer, selection.element, selection.offset)
        }
    }

    /// Value of a flattened scalar leaf.
    pub fn get_leaf_value(&self, index: usize) -> Result<Variant> {
        let leaf = self
            .layout
            .leaves()
            .get(index)
            .ok_or_else(|| Error::ElementNotFound(format!("leaf #{}", index)))?;
        ScalarSlot::from_leaf(leaf).read(self.buffer)
    }

    /// Every leaf as `(path, value)` in declaration order.
    pub fn leaf_values(&self) -> Result<Vec<(String, Variant)>> {
        self.layout
            .leaves()
            .iter()
            .map(|leaf| Ok((leaf.path.clone(), ScalarSlot::from_leaf(leaf).read(self.buffer)?)))
            .collect()
    }

    /// The whole buffer as a `Variant::Struct`.
    pub fn to_variant(&self) -> Result<Variant> {
        read_struct(self.buffer, self.layout, 0)
    }

    /// Symbol name of an enum-typed element.
    pub fn resolve_enum_name<'p>(&self, id: impl Into<ElementId<'p>>) -> Result<String> {
        let id = id.into();
        let selection = Selection::resolve(self.layout, id)?;
        let slot = (!selection.whole_array)
            .then(|| ScalarSlot::from_element(selection.element, selection.offset))
            .flatten()
            .filter(|slot| slot.enum_type.is_some())
            .ok_or_else(|| {
                Error::type_mismatch(&id.to_string(), "enum", selection.element.kind.type_name())
            })?;
        let value = slot.read_integer(self.buffer)?;
        let enum_type = slot.enum_type.ok_or_else(|| Error::ElementNotFound(id.to_string()))?;
        i64::try_from(value)
            .ok()
            .and_then(|v| enum_type.name_of(v))
            .map(str::to_string)
            .ok_or_else(|| Error::UnknownEnumValue {
                enum_name: enum_type.name.clone(),
                value: value.to_string(),
            })
    }
}

/// Read/write typed access to a buffer laid out as `layout`.
#[derive(Debug)]
pub struct Codec<'a> {
    layout: &'a StructLayout,
    buffer: &'a mut [u8],
}

impl<'a> Codec<'a> {
    /// Fails with `BufferTooSmall` when `buffer` is shorter than the layout.
    pub fn new(layout: &'a StructLayout, buffer: &'a mut [u8]) -> Result<Self> {
        check_size(layout, buffer.len())?;
        Ok(Self { layout, buffer })
    }

    pub fn layout(&self) -> &'a StructLayout {
        self.layout
    }

    pub fn buffer(&self) -> &[u8] {
        &*self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut [u8] {
        &mut *self.buffer
    }

    /// Read-only view of the same buffer.
    pub fn as_decoder(&self) -> Decoder<'_> {
        Decoder {
            layout: self.layout,
            buffer: &*self.buffer,
        }
    }

    pub fn get_element_value<'p>(&self, id: impl Into<ElementId<'p>>) -> Result<Variant> {
        self.as_decoder().get_element_value(id)
    }

    pub fn get_leaf_value(&self, index: usize) -> Result<Variant> {
        self.as_decoder().get_leaf_value(index)
    }

    pub fn leaf_values(&self) -> Result<Vec<(String, Variant)>> {
        self.as_decoder().leaf_values()
    }

    pub fn to_variant(&self) -> Result<Variant> {
        self.as_decoder().to_variant()
    }

    pub fn resolve_enum_name<'p>(&self, id: impl Into<ElementId<'p>>) -> Result<String> {
        self.as_decoder().resolve_enum_name(id)
    }

    /// Type-check and store a value.
    ///
    /// Integers widen to floats; integers outside the target range are a
    /// `TypeMismatch` except for bit-fields, which keep the low `width` bits.
    /// Enum elements also accept symbol names.
    pub fn set_element_value<'p>(
        &mut self,
        id: impl Into<ElementId<'p>>,
        value: impl Into<Variant>,
    ) -> Result<()> {
        let id = id.into();
        let value = value.into();
        let selection = Selection::resolve(self.layout, id)?;
        let name = id.to_string();
        if selection.whole_array {
            write_array(self.buffer, selection.element, selection.offset, &value, &name)
        } else {
            write_item(self.buffer, selection.element, selection.offset, &value, &name)
        }
    }

    pub fn set_leaf_value(&mut self, index: usize, value: impl Into<Variant>) -> Result<()> {
        let leaf = self
            .layout
            .leaves()
            .get(index)
            .ok_or_else(|| Error::ElementNotFound(format!("leaf #{}", index)))?;
        ScalarSlot::from_leaf(leaf).write(self.buffer, &value.into(), &leaf.path)
    }

    /// Zero the bytes covered by the layout.
    pub fn reset(&mut self) {
        let size = self.layout.size();
        self.buffer[..size].fill(0);
    }
}

impl StructLayout {
    /// Zero-filled buffer of the layout size.
    pub fn new_buffer(&self) -> Vec<u8> {
        vec![0; self.size()]
    }

    pub fn decoder<'a>(&'a self, buffer: &'a [u8]) -> Result<Decoder<'a>> {
        Decoder::new(self, buffer)
    }

    pub fn codec<'a>(&'a self, buffer: &'a mut [u8]) -> Result<Codec<'a>> {
        Codec::new(self, buffer)
    }
}

fn bytes(buffer: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    buffer
        .get(offset..offset + len)
        .ok_or(Error::BufferTooSmall {
            need: offset + len,
            have: buffer.len(),
        })
}

fn scalar_slot<'l>(element: &'l ElementLayout, offset: usize) -> Result<ScalarSlot<'l>> {
    ScalarSlot::from_element(element, offset).ok_or_else(|| {
        Error::type_mismatch(&element.name, "scalar", element.kind.type_name())
    })
}

fn read_struct(buffer: &[u8], layout: &StructLayout, base: usize) -> Result<Variant> {
    let fields = layout
        .elements()
        .iter()
        .map(|e| {
            let offset = base + e.offset;
            let value = if e.is_array() {
                read_array(buffer, e, offset)?
            } else {
                read_item(buffer, e, offset)?
            };
            Ok((e.name.clone(), value))
        })
        .collect::<Result<_>>()?;
    Ok(Variant::Struct(fields))
}

fn read_item(buffer: &[u8], element: &ElementLayout, offset: usize) -> Result<Variant> {
    match &element.kind {
        ElementKind::Struct(nested) => read_struct(buffer, nested, offset),
        _ => scalar_slot(element, offset)?.read(buffer),
    }
}

fn read_array(buffer: &[u8], element: &ElementLayout, offset: usize) -> Result<Variant> {
    match element.kind {
        ElementKind::Scalar(ScalarKind::U8) => Ok(Variant::Bytes(
            bytes(buffer, offset, element.array_size)?.to_vec(),
        )),
        ElementKind::Scalar(ScalarKind::Char) => {
            let raw = bytes(buffer, offset, element.array_size)?;
            let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
            Ok(Variant::String(String::from_utf8_lossy(&raw[..end]).into_owned()))
        }
        _ => (0..element.array_size)
            .map(|i| read_item(buffer, element, offset + i * element.stride))
            .collect::<Result<_>>()
            .map(Variant::Array),
    }
}

fn write_item(
    buffer: &mut [u8],
    element: &ElementLayout,
    offset: usize,
    value: &Variant,
    path: &str,
) -> Result<()> {
    let ElementKind::Struct(nested) = &element.kind else {
        return scalar_slot(element, offset)?.write(buffer, value, path);
    };
    let Variant::Struct(fields) = value else {
        return Err(Error::type_mismatch(path, nested.name(), value.type_name()));
    };
    for (name, field) in fields {
        let field_path = format!("{}.{}", path, name);
        let target = nested
            .element(name)
            .ok_or_else(|| Error::ElementNotFound(field_path.clone()))?;
        let field_offset = offset + target.offset;
        if target.is_array() {
            write_array(buffer, target, field_offset, field, &field_path)?;
        } else {
            write_item(buffer, target, field_offset, field, &field_path)?;
        }
    }
    Ok(())
}

fn write_array(
    buffer: &mut [u8],
    element: &ElementLayout,
    offset: usize,
    value: &Variant,
    path: &str,
) -> Result<()> {
    let count = element.array_size;
    let packed = match (&element.kind, value) {
        (ElementKind::Scalar(ScalarKind::U8), Variant::Bytes(data)) => Some(data.as_slice()),
        (ElementKind::Scalar(ScalarKind::Char), Variant::String(text)) => Some(text.as_bytes()),
        _ => None,
    };
    if let Some(data) = packed {
        if data.len() > count {
            return Err(Error::type_mismatch(
                path,
                format!("at most {} bytes", count),
                format!("{} bytes", data.len()),
            ));
        }
        let end = offset + count;
        let have = buffer.len();
        let target = buffer
            .get_mut(offset..end)
            .ok_or(Error::BufferTooSmall { need: end, have })?;
        target[..data.len()].copy_from_slice(data);
        target[data.len()..].fill(0);
        return Ok(());
    }

    match value {
        Variant::Array(items) if items.len() == count => {
            for (i, item) in items.iter().enumerate() {
                let item_path = format!("{}[{}]", path, i);
                write_item(buffer, element, offset + i * element.stride, item, &item_path)?;
            }
            Ok(())
        }
        other => Err(Error::type_mismatch(
            path,
            format!("array of {} {}", count, element.kind.type_name()),
            other.type_name(),
        )),
    }
}
