// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Typed access to buffers under a struct layout.
//!
//! A [`Decoder`] borrows `&[u8]`, a [`Codec`] borrows `&mut [u8]`; neither
//! copies the buffer and both refuse buffers shorter than the layout.
//!
//! # Example
//!
//! ```rust
//! use ddl::codec::{transcode_to_vec, Codec, Decoder, Variant};
//! use ddl::dd::{DataDefinition, Element, ScalarKind, StructType};
//! use ddl::layout::Representation;
//!
//! let mut dd = DataDefinition::new();
//! dd.add_struct(
//!     StructType::new("tSample")
//!         .element(Element::new("id", ScalarKind::U16))
//!         .element(Element::new("value", ScalarKind::F64)),
//! )
//! .unwrap();
//!
//! let ser = dd.layout("tSample", Representation::Serialized).unwrap();
//! let mut bytes = ser.new_buffer();
//! let mut codec = Codec::new(&ser, &mut bytes).unwrap();
//! codec.set_element_value("id", 7u16).unwrap();
//! codec.set_element_value("value", 2.5f64).unwrap();
//!
//! let deser = dd.layout("tSample", Representation::Deserialized).unwrap();
//! let native = transcode_to_vec(&Decoder::new(&ser, &bytes).unwrap(), &deser).unwrap();
//! let decoder = Decoder::new(&deser, &native).unwrap();
//! assert_eq!(decoder.get_element_value("value").unwrap(), Variant::F64(2.5));
//! ```

mod access;
mod decoder;
mod element_id;
mod transcode;
mod variant;

pub use decoder::{Codec, Decoder};
pub use element_id::ElementId;
pub use transcode::{transcode, transcode_to_vec};
pub use variant::Variant;
