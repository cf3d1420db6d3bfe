// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! DDL XML description loader.
//!
//! Parses `<enums>` and `<structs>` sections into a [`DataDefinition`].
//! Element placement is read either from flat attributes (`bytepos`,
//! `bitpos`, `numbits`, `byteorder`, `alignment`) or from DDL-4
//! `<serialized>`/`<deserialized>` children; children win when both are
//! present. Other sections (header, units, streams) are ignored.
//!
//! # Example
//!
//! ```rust
//! let dd = ddl::description::parse_str(
//!     r#"<ddl>
//!          <structs>
//!            <struct name="tPoint" version="1">
//!              <element name="x" type="tFloat32" bytepos="0"/>
//!              <element name="y" type="tFloat32" bytepos="4"/>
//!            </struct>
//!          </structs>
//!        </ddl>"#,
//! )
//! .unwrap();
//! assert!(dd.get_struct("tPoint").is_some());
//! ```

use crate::config::DefinitionConfig;
use crate::convert::{string_to_number, Numeric};
use crate::dd::{ByteOrder, DataDefinition, Element, EnumType, ScalarKind, StructType, TypeRef};
use crate::error::{Error, Result};
use roxmltree::{Document, Node};
use std::fs;
use std::path::Path;

/// Load a description file with the default configuration.
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<DataDefinition> {
    crate::trace_fn!("description::load_file");
    let path = path.as_ref();
    let xml = fs::read_to_string(path).map_err(|e| {
        Error::Description(format!("failed to read '{}': {}", path.display(), e))
    })?;
    parse_str(&xml)
}

/// Parse a description with the default configuration.
pub fn parse_str(xml: &str) -> Result<DataDefinition> {
    parse_str_with_config(xml, DefinitionConfig::default())
}

/// Parse a description into a definition using `config`.
pub fn parse_str_with_config(xml: &str, config: DefinitionConfig) -> Result<DataDefinition> {
    crate::trace_fn!("description::parse_str_with_config");
    let doc = Document::parse(xml)
        .map_err(|e| Error::Description(format!("failed to parse XML: {}", e)))?;
    let mut dd = DataDefinition::with_config(config)?;

    let root = doc.root_element();
    for section in root.descendants().filter(|n| n.has_tag_name("enums")) {
        for node in children_named(section, "enum") {
            dd.add_enum(parse_enum(node)?)?;
        }
    }
    for section in root.descendants().filter(|n| n.has_tag_name("structs")) {
        for node in children_named(section, "struct") {
            dd.add_struct(parse_struct(node)?)?;
        }
    }

    log::debug!(
        "[description::parse_str] loaded {} structs, {} enums",
        dd.structs().count(),
        dd.enums().count()
    );
    Ok(dd)
}

fn children_named<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(move |n| n.is_element() && n.has_tag_name(tag))
}

fn required<'a>(node: Node<'a, '_>, attribute: &str) -> Result<&'a str> {
    node.attribute(attribute).ok_or_else(|| {
        Error::Description(format!(
            "<{}> at byte {} is missing attribute '{}'",
            node.tag_name().name(),
            node.range().start,
            attribute
        ))
    })
}

/// Parse an optional numeric attribute; empty strings count as absent.
fn number<T: Numeric>(node: Node<'_, '_>, attribute: &str) -> Result<Option<T>> {
    match node.attribute(attribute).map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => string_to_number(text).map(Some).map_err(|e| {
            Error::Description(format!(
                "<{} name=\"{}\"> attribute '{}': {}",
                node.tag_name().name(),
                node.attribute("name").unwrap_or_default(),
                attribute,
                e
            ))
        }),
    }
}

/// Positions below zero mean "not set".
fn position(node: Node<'_, '_>, attribute: &str) -> Result<Option<i64>> {
    Ok(number::<i64>(node, attribute)?.filter(|&v| v >= 0))
}

fn parse_enum(node: Node<'_, '_>) -> Result<EnumType> {
    let name = required(node, "name")?;
    let mut enum_type = EnumType::new(name);
    if let Some(type_name) = node.attribute("type") {
        let underlying = ScalarKind::from_name(type_name)
            .filter(|k| k.is_integer())
            .ok_or_else(|| {
                Error::Description(format!(
                    "enum '{}' has non-integer type '{}'",
                    name, type_name
                ))
            })?;
        enum_type = enum_type.with_underlying(underlying);
    }
    for value in children_named(node, "element") {
        let symbol = required(value, "name")?;
        let raw = number::<i64>(value, "value")?.ok_or_else(|| {
            Error::Description(format!("enum value '{}.{}' has no value", name, symbol))
        })?;
        enum_type.insert(symbol, raw)?;
    }
    Ok(enum_type)
}

fn parse_struct(node: Node<'_, '_>) -> Result<StructType> {
    let mut struct_type = StructType::new(required(node, "name")?);
    if let Some(version) = number::<u32>(node, "version")? {
        struct_type = struct_type.with_version(version);
    }
    if let Some(alignment) = number::<usize>(node, "alignment")? {
        struct_type = struct_type.with_alignment(alignment);
    }
    if let Some(comment) = node.attribute("comment") {
        struct_type = struct_type.with_comment(comment);
    }
    for child in children_named(node, "element") {
        struct_type.push(parse_element(child)?);
    }
    Ok(struct_type)
}

fn parse_element(node: Node<'_, '_>) -> Result<Element> {
    let name = required(node, "name")?;
    let type_ref = TypeRef::parse(required(node, "type")?);
    let scalar = match &type_ref {
        TypeRef::Scalar(kind) => Some(*kind),
        TypeRef::Named(_) => None,
    };
    let mut element = Element::new(name, type_ref);

    if let Some(size) = number::<usize>(node, "arraysize")? {
        element = element.array(size);
    }
    if let Some(unit) = node.attribute("unit").filter(|u| !u.is_empty()) {
        element = element.with_unit(unit);
    }
    if let Some(description) = node.attribute("description").filter(|d| !d.is_empty()) {
        element = element.with_description(description);
    }

    let serialized = children_named(node, "serialized").next().unwrap_or(node);
    let deserialized = children_named(node, "deserialized").next().unwrap_or(node);

    if let Some(pos) = position(serialized, "bytepos")? {
        element = element.at_byte(to_usize(name, "bytepos", pos)?);
    }
    if let Some(order) = serialized.attribute("byteorder").filter(|o| !o.is_empty()) {
        let order = ByteOrder::from_name(order).ok_or_else(|| {
            Error::Description(format!("element '{}' has unknown byte order '{}'", name, order))
        })?;
        element = element.byte_order(order);
    }

    // numbits spanning the whole scalar is a plain element
    let width = number::<u32>(serialized, "numbits")?
        .filter(|&w| scalar.map_or(true, |kind| w != kind.bits()));
    if let Some(width) = width {
        element = element.bits(width);
        if let Some(pos) = position(serialized, "bitpos")? {
            element = element.at_bit(to_u32(name, "bitpos", pos)?);
        }
    }

    if let Some(alignment) = number::<usize>(deserialized, "alignment")?.filter(|&a| a > 0) {
        element = element.aligned(alignment);
    }
    Ok(element)
}

fn to_usize(element: &str, attribute: &str, value: i64) -> Result<usize> {
    usize::try_from(value).map_err(|_| {
        Error::Description(format!("element '{}' {} {} out of range", element, attribute, value))
    })
}

fn to_u32(element: &str, attribute: &str, value: i64) -> Result<u32> {
    u32::try_from(value).map_err(|_| {
        Error::Description(format!("element '{}' {} {} out of range", element, attribute, value))
    })
}
