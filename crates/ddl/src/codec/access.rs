// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Raw scalar access: byte order, bit-field extraction/insertion and
//! `Variant` encoding rules.

use super::Variant;
use crate::dd::{ByteOrder, EnumType, ScalarKind};
use crate::error::{Error, Result};
use crate::layout::{BitField, ElementLayout, LeafLayout};

/// One scalar slot of a buffer.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ScalarSlot<'l> {
    pub kind: ScalarKind,
    pub enum_type: Option<&'l EnumType>,
    pub offset: usize,
    pub bits: Option<BitField>,
    pub byte_order: ByteOrder,
}

impl<'l> ScalarSlot<'l> {
    pub fn from_leaf(leaf: &'l LeafLayout) -> Self {
        Self {
            kind: leaf.kind,
            enum_type: leaf.enum_type.as_deref(),
            offset: leaf.offset,
            bits: leaf.bits,
            byte_order: leaf.byte_order,
        }
    }

    /// Slot of array item `offset` of a scalar or enum element.
    pub fn from_element(element: &'l ElementLayout, offset: usize) -> Option<Self> {
        let kind = element.kind.scalar()?;
        let enum_type = match &element.kind {
            crate::layout::ElementKind::Enum { definition, .. } => Some(definition.as_ref()),
            _ => None,
        };
        Some(Self {
            kind,
            enum_type,
            offset,
            bits: element.bits,
            byte_order: element.byte_order,
        })
    }

    /// Width of the stored value in bits.
    fn width(&self) -> u32 {
        self.bits.map_or(self.kind.bits(), |b| b.width)
    }

    /// Unsigned raw value (bit-field: shifted down and masked).
    pub fn read_raw(&self, buffer: &[u8]) -> Result<u64> {
        let container = read_uint(buffer, self.offset, self.kind.size(), self.byte_order)?;
        Ok(match self.bits {
            Some(bits) => (container >> bits.pos) & bits.mask(),
            None => container,
        })
    }

    /// Store a raw value; bit-fields keep the surrounding bits.
    pub fn write_raw(&self, buffer: &mut [u8], raw: u64) -> Result<()> {
        let size = self.kind.size();
        let value = match self.bits {
            Some(bits) => {
                let container = read_uint(buffer, self.offset, size, self.byte_order)?;
                let mask = bits.mask() << bits.pos;
                (container & !mask) | ((raw & bits.mask()) << bits.pos)
            }
            None => raw,
        };
        write_uint(buffer, self.offset, size, self.byte_order, value)
    }

    /// Signed integer value (sign-extended for signed kinds).
    pub fn read_integer(&self, buffer: &[u8]) -> Result<i128> {
        let raw = self.read_raw(buffer)?;
        Ok(if self.kind.is_signed() {
            i128::from(sign_extend(raw, self.width()))
        } else {
            i128::from(raw)
        })
    }

    pub fn read(&self, buffer: &[u8]) -> Result<Variant> {
        let raw = self.read_raw(buffer)?;
        let signed = sign_extend(raw, self.width());
        Ok(match self.kind {
            ScalarKind::Bool => Variant::Bool(raw != 0),
            ScalarKind::Char => Variant::Char(raw as u8),
            ScalarKind::I8 => Variant::I8(signed as i8),
            ScalarKind::U8 => Variant::U8(raw as u8),
            ScalarKind::I16 => Variant::I16(signed as i16),
            ScalarKind::U16 => Variant::U16(raw as u16),
            ScalarKind::I32 => Variant::I32(signed as i32),
            ScalarKind::U32 => Variant::U32(raw as u32),
            ScalarKind::I64 => Variant::I64(signed),
            ScalarKind::U64 => Variant::U64(raw),
            ScalarKind::F32 => Variant::F32(f32::from_bits(raw as u32)),
            ScalarKind::F64 => Variant::F64(f64::from_bits(raw)),
        })
    }

    pub fn write(&self, buffer: &mut [u8], value: &Variant, element: &str) -> Result<()> {
        let raw = self.encode(value, element)?;
        self.write_raw(buffer, raw)
    }

    /// Type-check `value` and turn it into the raw representation.
    fn encode(&self, value: &Variant, element: &str) -> Result<u64> {
        let mismatch = || Error::type_mismatch(element, self.kind.ddl_name(), value.type_name());

        if self.kind.is_float() {
            let number = match *value {
                Variant::F32(v) => f64::from(v),
                Variant::F64(v) => v,
                _ => value.integer().ok_or_else(mismatch)? as f64,
            };
            return Ok(match self.kind {
                ScalarKind::F32 => u64::from((number as f32).to_bits()),
                _ => number.to_bits(),
            });
        }

        let integer = match value {
            Variant::String(symbol) => {
                let enum_type = self.enum_type.ok_or_else(mismatch)?;
                let found = enum_type.value_of(symbol).ok_or_else(|| Error::UnknownEnumValue {
                    enum_name: enum_type.name.clone(),
                    value: symbol.clone(),
                })?;
                i128::from(found)
            }
            other => other.as_i128().ok_or_else(mismatch)?,
        };

        match self.bits {
            Some(bits) => Ok((integer as u64) & bits.mask()),
            None => {
                let (min, max) = self.kind.integer_range().ok_or_else(mismatch)?;
                if integer < min || integer > max {
                    return Err(Error::type_mismatch(
                        element,
                        format!("{} in [{}, {}]", self.kind.ddl_name(), min, max),
                        integer.to_string(),
                    ));
                }
                Ok(integer as u64)
            }
        }
    }
}

fn sign_extend(raw: u64, width: u32) -> i64 {
    if width == 0 || width >= 64 {
        return raw as i64;
    }
    let shift = 64 - width;
    ((raw << shift) as i64) >> shift
}

fn span(buffer: &[u8], offset: usize, size: usize) -> Result<std::ops::Range<usize>> {
    let end = offset.saturating_add(size);
    if end > buffer.len() {
        return Err(Error::BufferTooSmall {
            need: end,
            have: buffer.len(),
        });
    }
    Ok(offset..end)
}

/// Read an unsigned integer of `size` bytes (1..=8).
pub(crate) fn read_uint(buffer: &[u8], offset: usize, size: usize, order: ByteOrder) -> Result<u64> {
    let bytes = &buffer[span(buffer, offset, size)?];
    let fold = |acc: u64, b: &u8| (acc << 8) | u64::from(*b);
    Ok(match order {
        ByteOrder::LittleEndian => bytes.iter().rev().fold(0, fold),
        ByteOrder::BigEndian => bytes.iter().fold(0, fold),
    })
}

/// Write the low `size` bytes of `value`.
pub(crate) fn write_uint(
    buffer: &mut [u8],
    offset: usize,
    size: usize,
    order: ByteOrder,
    value: u64,
) -> Result<()> {
    let range = span(buffer, offset, size)?;
    let bytes = &mut buffer[range];
    for (i, byte) in bytes.iter_mut().enumerate() {
        let shift = match order {
            ByteOrder::LittleEndian => i * 8,
            ByteOrder::BigEndian => (size - 1 - i) * 8,
        };
        *byte = (value >> shift) as u8;
    }
    Ok(())
}
