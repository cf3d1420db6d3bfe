// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Typed element values.

use crate::dd::ScalarKind;
use std::fmt;

/// A value read from or written to a buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum Variant {
    // Scalars
    Bool(bool),
    Char(u8),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),

    // Composites
    /// `tUInt8` array.
    Bytes(Vec<u8>),
    /// `tChar` array, up to the first NUL.
    String(String),
    Array(Vec<Variant>),
    /// Nested struct, fields in declaration order.
    Struct(Vec<(String, Variant)>),
}

impl Variant {
    /// Short kind name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Char(_) => "char",
            Self::I8(_) => "int8",
            Self::U8(_) => "uint8",
            Self::I16(_) => "int16",
            Self::U16(_) => "uint16",
            Self::I32(_) => "int32",
            Self::U32(_) => "uint32",
            Self::I64(_) => "int64",
            Self::U64(_) => "uint64",
            Self::F32(_) => "float32",
            Self::F64(_) => "float64",
            Self::Bytes(_) => "bytes",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Struct(_) => "struct",
        }
    }

    pub fn is_scalar(&self) -> bool {
        !matches!(
            self,
            Self::Bytes(_) | Self::String(_) | Self::Array(_) | Self::Struct(_)
        )
    }

    /// Integer value of integer variants (not bool/char/float).
    pub fn integer(&self) -> Option<i128> {
        match *self {
            Self::I8(v) => Some(i128::from(v)),
            Self::U8(v) => Some(i128::from(v)),
            Self::I16(v) => Some(i128::from(v)),
            Self::U16(v) => Some(i128::from(v)),
            Self::I32(v) => Some(i128::from(v)),
            Self::U32(v) => Some(i128::from(v)),
            Self::I64(v) => Some(i128::from(v)),
            Self::U64(v) => Some(i128::from(v)),
            _ => None,
        }
    }

    /// Integer value of every integer-like scalar, bool and char included.
    pub fn as_i128(&self) -> Option<i128> {
        match *self {
            Self::Bool(v) => Some(i128::from(v)),
            Self::Char(v) => Some(i128::from(v)),
            _ => self.integer(),
        }
    }

    /// Numeric value of any scalar.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::F32(v) => Some(f64::from(v)),
            Self::F64(v) => Some(v),
            _ => self.as_i128().map(|v| v as f64),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Self::Bool(v) => Some(v),
            _ => self.as_i128().map(|v| v != 0),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Variant]> {
        match self {
            Self::Array(v) => Some(v),
            _ => None,
        }
    }

    /// Field of a struct value.
    pub fn field(&self, name: &str) -> Option<&Variant> {
        match self {
            Self::Struct(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Convert a scalar to the given kind, `None` when it does not fit.
    pub fn convert_to(&self, kind: ScalarKind) -> Option<Variant> {
        if kind.is_float() {
            let value = self.as_f64()?;
            return Some(match kind {
                ScalarKind::F32 => Self::F32(value as f32),
                _ => Self::F64(value),
            });
        }
        let value = match *self {
            Self::F32(v) if v.fract() == 0.0 => v as i128,
            Self::F64(v) if v.fract() == 0.0 => v as i128,
            _ => self.as_i128()?,
        };
        let (min, max) = kind.integer_range()?;
        if value < min || value > max {
            return None;
        }
        Some(match kind {
            ScalarKind::Bool => Self::Bool(value != 0),
            ScalarKind::Char => Self::Char(value as u8),
            ScalarKind::I8 => Self::I8(value as i8),
            ScalarKind::U8 => Self::U8(value as u8),
            ScalarKind::I16 => Self::I16(value as i16),
            ScalarKind::U16 => Self::U16(value as u16),
            ScalarKind::I32 => Self::I32(value as i32),
            ScalarKind::U32 => Self::U32(value as u32),
            ScalarKind::I64 => Self::I64(value as i64),
            ScalarKind::U64 => Self::U64(value as u64),
            ScalarKind::F32 | ScalarKind::F64 => return None,
        })
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{}", v),
            Self::Char(v) => write!(f, "{}", char::from(*v)),
            Self::I8(v) => write!(f, "{}", v),
            Self::U8(v) => write!(f, "{}", v),
            Self::I16(v) => write!(f, "{}", v),
            Self::U16(v) => write!(f, "{}", v),
            Self::I32(v) => write!(f, "{}", v),
            Self::U32(v) => write!(f, "{}", v),
            Self::I64(v) => write!(f, "{}", v),
            Self::U64(v) => write!(f, "{}", v),
            Self::F32(v) => write!(f, "{}", v),
            Self::F64(v) => write!(f, "{}", v),
            Self::Bytes(v) => {
                write!(f, "[")?;
                for (i, b) in v.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{:02x}", b)?;
                }
                write!(f, "]")
            }
            Self::String(v) => write!(f, "{:?}", v),
            Self::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Self::Struct(fields) => {
                write!(f, "{{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", name, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

macro_rules! impl_from_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Variant {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

impl_from_scalar!(
    bool => Bool,
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    String => String,
);

impl From<&str> for Variant {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl<T: Into<Variant>> From<Vec<T>> for Variant {
    fn from(v: Vec<T>) -> Self {
        Self::Array(v.into_iter().map(Into::into).collect())
    }
}
