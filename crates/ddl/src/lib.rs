// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # DDL - Data Definition Language toolkit
//!
//! Schema model, byte-exact struct layouts, a typed buffer codec and a
//! trigger-driven signal mapping engine.
//!
//! ## Quick Start
//!
//! ```rust
//! use ddl::dd::{Element, ScalarKind, StructType};
//! use ddl::{DataDefinition, Representation, Result, Variant};
//!
//! fn main() -> Result<()> {
//!     let mut dd = DataDefinition::new();
//!     dd.add_struct(
//!         StructType::new("tSample")
//!             .element(Element::new("a", ScalarKind::U16))
//!             .element(Element::new("flag", ScalarKind::U8).bits(1))
//!             .element(Element::new("b", ScalarKind::U32)),
//!     )?;
//!
//!     let layout = dd.layout("tSample", Representation::Serialized)?;
//!     assert_eq!(layout.size(), 7);
//!
//!     let mut buffer = layout.new_buffer();
//!     layout.codec(&mut buffer)?.set_element_value("b", 0xdead_beefu32)?;
//!     assert_eq!(
//!         layout.decoder(&buffer)?.get_element_value("b")?,
//!         Variant::U32(0xdead_beef)
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +--------------------------------------------------------------+
//! |  description (XML)  -->  DataDefinition (structs, enums)     |
//! +--------------------------------------------------------------+
//! |  layout: compute_layout + LRU LayoutCache per definition     |
//! |          Serialized (packed)  |  Deserialized (aligned)      |
//! +--------------------------------------------------------------+
//! |  codec: Decoder / Codec over &[u8] / &mut [u8], transcode    |
//! +--------------------------------------------------------------+
//! |  mapping: SignalSample -> triggers -> targets                |
//! +--------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`DataDefinition`] | Schema of structs and enums, owns the layout cache |
//! | [`StructLayout`] | Offsets, padding and leaves of one struct in one representation |
//! | [`Decoder`] / [`Codec`] | Typed read / read-write access to a buffer |
//! | [`Variant`] | Dynamically typed element value |
//! | [`MappingEngine`] | Routes signal samples to targets through triggers |
//!
//! ## Features
//!
//! - `description` (default): DDL XML loader (`roxmltree`)
//! - `serde`: `Serialize`/`Deserialize` for [`DefinitionConfig`]
//! - `trace`: function entry tracing through `log`

pub mod codec;
pub mod config;
pub mod convert;
pub mod dd;
#[cfg(feature = "description")]
pub mod description;
pub mod error;
pub mod id;
pub mod layout;
#[doc(hidden)]
pub mod logging;
pub mod mapping;

pub use codec::{Codec, Decoder, Variant};
pub use config::DefinitionConfig;
pub use convert::{is_numeric, string_to_number, ConversionError};
pub use dd::{ByteOrder, DataDefinition};
pub use error::{Error, LayoutError, Result};
pub use id::{generate_uuid_v4, IdGenerator, UuidGenerator};
pub use layout::{Representation, StructLayout};
pub use mapping::MappingEngine;
