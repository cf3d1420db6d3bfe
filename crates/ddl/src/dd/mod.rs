// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Data Definition (DD) model.
//!
//! In-memory schema of structs, enums and their elements.
//!
//! # Example
//!
//! ```rust
//! use ddl::dd::{DataDefinition, Element, EnumType, ScalarKind, StructType};
//!
//! let mut dd = DataDefinition::new();
//! dd.add_enum(EnumType::new("tGear").value("PARK", 0).value("DRIVE", 1))
//!     .unwrap();
//! dd.add_struct(
//!     StructType::new("tVehicle")
//!         .element(Element::new("speed", ScalarKind::F32))
//!         .element(Element::new("gear", "tGear")),
//! )
//! .unwrap();
//!
//! assert!(dd.validate().is_empty());
//! ```

mod definition;
mod element;
mod structs;
mod types;
mod validate;

pub use definition::{DataDefinition, RemoveMode, ResolvedType};
pub use element::Element;
pub use structs::{EnumType, EnumValue, StructType};
pub use types::{ByteOrder, ScalarKind, TypeRef};
pub use validate::{Problem, ProblemKind};

#[cfg(test)]
mod tests;
