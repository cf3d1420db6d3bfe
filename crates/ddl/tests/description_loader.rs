// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Loading DDL XML descriptions from disk.

#![cfg(feature = "description")]

use ddl::dd::{ByteOrder, ProblemKind};
use ddl::description;
use ddl::layout::Representation;
use ddl::{DefinitionConfig, Error, Variant};
use std::io::Write;

const VEHICLE_DDL: &str = r#"<?xml version="1.0" encoding="utf-8" standalone="no"?>
<ddl:ddl xmlns:ddl="ddl">
  <header>
    <language_version>3.00</language_version>
    <author>vehicle team</author>
  </header>
  <units/>
  <datatypes/>
  <enums>
    <enum name="tGear" type="tUInt8">
      <element name="PARK" value="0"/>
      <element name="REVERSE" value="1"/>
      <element name="NEUTRAL" value="2"/>
      <element name="DRIVE" value="3"/>
    </enum>
  </enums>
  <structs>
    <struct name="tWheel" version="1" alignment="1">
      <element name="rpm" type="tUInt16" bytepos="0" byteorder="BE" arraysize="1"/>
      <element name="slip" type="tUInt8" bytepos="2" bitpos="0" numbits="1"/>
      <element name="locked" type="tUInt8" bytepos="2" bitpos="1" numbits="1"/>
    </struct>
    <struct name="tVehicle" version="3" alignment="4">
      <element name="timestamp" type="tUInt64" bytepos="0" byteorder="LE" unit="us"/>
      <element name="gear" type="tGear" bytepos="8"/>
      <element name="wheels" type="tWheel" bytepos="9" arraysize="4"/>
      <element name="speed" type="tFloat32" bytepos="21" byteorder="LE"/>
    </struct>
  </structs>
  <streams/>
</ddl:ddl>"#;

fn write_temp(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn load_and_decode_vehicle_sample() {
    let file = write_temp(VEHICLE_DDL);
    let dd = description::load_file(file.path()).unwrap();
    assert!(dd.validate().is_empty());
    assert_eq!(dd.get_struct("tVehicle").unwrap().version, 3);

    let layout = dd.layout("tVehicle", Representation::Serialized).unwrap();
    assert_eq!(layout.size(), 25);
    assert_eq!(layout.leaf("wheels[2].rpm").unwrap().offset, 15);
    assert_eq!(layout.leaf("wheels[2].rpm").unwrap().byte_order, ByteOrder::BigEndian);

    let mut sample = layout.new_buffer();
    sample[0..8].copy_from_slice(&1_000_000u64.to_le_bytes());
    sample[8] = 3;
    sample[15..17].copy_from_slice(&1200u16.to_be_bytes());
    sample[17] = 0b10;
    sample[21..25].copy_from_slice(&27.5f32.to_le_bytes());

    let decoder = layout.decoder(&sample).unwrap();
    assert_eq!(decoder.get_element_value("timestamp").unwrap(), Variant::U64(1_000_000));
    assert_eq!(decoder.resolve_enum_name("gear").unwrap(), "DRIVE");
    assert_eq!(decoder.get_element_value("wheels[2].rpm").unwrap(), Variant::U16(1200));
    assert_eq!(decoder.get_element_value("wheels[2].slip").unwrap(), Variant::U8(0));
    assert_eq!(decoder.get_element_value("wheels[2].locked").unwrap(), Variant::U8(1));
    assert_eq!(decoder.get_element_value("speed").unwrap(), Variant::F32(27.5));

    let native = dd.layout("tVehicle", Representation::Deserialized).unwrap();
    assert_eq!(native.alignment(), 8);
    assert_eq!(native.element("speed").unwrap().offset, 28);
}

#[test]
fn load_with_config() {
    let config = DefinitionConfig::default()
        .with_default_alignment(4)
        .with_byte_order(ByteOrder::BigEndian);
    let dd = description::parse_str_with_config(VEHICLE_DDL, config).unwrap();
    let wheel = dd.layout("tWheel", Representation::Deserialized).unwrap();
    assert_eq!(wheel.size(), 8);
    assert_eq!(dd.config().default_alignment, 4);
}

#[test]
fn dangling_reference_in_description() {
    let xml = r#"<ddl><structs>
        <struct name="tOuter" version="1">
          <element name="inner" type="tMissing" bytepos="0"/>
        </struct>
      </structs></ddl>"#;
    let dd = description::parse_str(xml).unwrap();
    let problems = dd.validate();
    assert_eq!(problems.len(), 1);
    assert_eq!(problems[0].kind, ProblemKind::DanglingReference);
    assert_eq!(problems[0].item_name, "tOuter");
}

#[test]
fn missing_file_is_a_description_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = description::load_file(dir.path().join("absent.description")).unwrap_err();
    assert!(matches!(err, Error::Description(_)));
    assert!(err.to_string().contains("absent.description"));
}
