// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Built-in scalar kinds, type references and byte order.

use std::fmt;

/// Built-in fixed-width scalar kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    Char,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
}

impl ScalarKind {
    /// All kinds, in declaration order.
    pub const ALL: [ScalarKind; 12] = [
        Self::Bool,
        Self::Char,
        Self::I8,
        Self::U8,
        Self::I16,
        Self::U16,
        Self::I32,
        Self::U32,
        Self::I64,
        Self::U64,
        Self::F32,
        Self::F64,
    ];

    /// Size in bytes.
    pub fn size(self) -> usize {
        match self {
            Self::Bool | Self::Char | Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::I32 | Self::U32 | Self::F32 => 4,
            Self::I64 | Self::U64 | Self::F64 => 8,
        }
    }

    /// Natural (native) alignment.
    pub fn alignment(self) -> usize {
        self.size()
    }

    /// Width in bits.
    pub fn bits(self) -> u32 {
        (self.size() * 8) as u32
    }

    /// Integer-like kinds (may back a bit-field or an enum).
    pub fn is_integer(self) -> bool {
        !matches!(self, Self::F32 | Self::F64)
    }

    pub fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            Self::I8 | Self::I16 | Self::I32 | Self::I64 | Self::F32 | Self::F64
        )
    }

    /// Inclusive value range of integer kinds.
    pub fn integer_range(self) -> Option<(i128, i128)> {
        let range = match self {
            Self::Bool => (0, 1),
            Self::Char | Self::U8 => (0, i128::from(u8::MAX)),
            Self::I8 => (i128::from(i8::MIN), i128::from(i8::MAX)),
            Self::I16 => (i128::from(i16::MIN), i128::from(i16::MAX)),
            Self::U16 => (0, i128::from(u16::MAX)),
            Self::I32 => (i128::from(i32::MIN), i128::from(i32::MAX)),
            Self::U32 => (0, i128::from(u32::MAX)),
            Self::I64 => (i128::from(i64::MIN), i128::from(i64::MAX)),
            Self::U64 => (0, i128::from(u64::MAX)),
            Self::F32 | Self::F64 => return None,
        };
        Some(range)
    }

    /// Canonical DDL name.
    pub fn ddl_name(self) -> &'static str {
        match self {
            Self::Bool => "tBool",
            Self::Char => "tChar",
            Self::I8 => "tInt8",
            Self::U8 => "tUInt8",
            Self::I16 => "tInt16",
            Self::U16 => "tUInt16",
            Self::I32 => "tInt32",
            Self::U32 => "tUInt32",
            Self::I64 => "tInt64",
            Self::U64 => "tUInt64",
            Self::F32 => "tFloat32",
            Self::F64 => "tFloat64",
        }
    }

    /// Look up a kind by DDL name or short alias.
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "tBool" | "bool" => Self::Bool,
            "tChar" | "char" => Self::Char,
            "tInt8" | "int8" => Self::I8,
            "tUInt8" | "uint8" => Self::U8,
            "tInt16" | "int16" => Self::I16,
            "tUInt16" | "uint16" => Self::U16,
            "tInt32" | "int32" => Self::I32,
            "tUInt32" | "uint32" => Self::U32,
            "tInt64" | "int64" => Self::I64,
            "tUInt64" | "uint64" => Self::U64,
            "tFloat32" | "float32" | "float" => Self::F32,
            "tFloat64" | "float64" | "double" => Self::F64,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ddl_name())
    }
}

/// Named reference to a built-in scalar or a user-defined struct/enum.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Scalar(ScalarKind),
    Named(String),
}

impl TypeRef {
    /// Scalar when `name` is a built-in name, otherwise a named reference.
    pub fn parse(name: &str) -> Self {
        match ScalarKind::from_name(name) {
            Some(kind) => Self::Scalar(kind),
            None => Self::Named(name.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Scalar(kind) => kind.ddl_name(),
            Self::Named(name) => name,
        }
    }

    /// Name of the user-defined type, `None` for scalars.
    pub fn named(&self) -> Option<&str> {
        match self {
            Self::Scalar(_) => None,
            Self::Named(name) => Some(name),
        }
    }
}

impl From<ScalarKind> for TypeRef {
    fn from(kind: ScalarKind) -> Self {
        Self::Scalar(kind)
    }
}

impl From<&str> for TypeRef {
    fn from(name: &str) -> Self {
        Self::parse(name)
    }
}

impl From<String> for TypeRef {
    fn from(name: String) -> Self {
        Self::parse(&name)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Byte order of multi-byte scalars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ByteOrder {
    LittleEndian,
    BigEndian,
}

impl ByteOrder {
    /// Byte order of the running platform.
    pub const fn native() -> Self {
        if cfg!(target_endian = "big") {
            Self::BigEndian
        } else {
            Self::LittleEndian
        }
    }

    /// Parse DDL spellings (`LE`, `BE`, `little`, `big`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "le" | "little" | "little_endian" | "intel" => Some(Self::LittleEndian),
            "be" | "big" | "big_endian" | "motorola" => Some(Self::BigEndian),
            _ => None,
        }
    }
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::LittleEndian => "LE",
            Self::BigEndian => "BE",
        })
    }
}
