// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! DataDefinition model and validation tests.

use super::*;
use crate::config::DefinitionConfig;
use crate::error::Error;
use crate::layout::Representation;

fn vehicle_dd() -> DataDefinition {
    let mut dd = DataDefinition::new();
    dd.add_enum(EnumType::new("tGear").value("PARK", 0).value("DRIVE", 1))
        .unwrap();
    dd.add_struct(
        StructType::new("tWheel")
            .element(Element::new("speed", ScalarKind::F32))
            .element(Element::new("pressure", ScalarKind::U16)),
    )
    .unwrap();
    dd.add_struct(
        StructType::new("tAxle")
            .element(Element::new("left", "tWheel"))
            .element(Element::new("right", "tWheel")),
    )
    .unwrap();
    dd.add_struct(
        StructType::new("tVehicle")
            .element(Element::new("gear", "tGear"))
            .element(Element::new("axles", "tAxle").array(2)),
    )
    .unwrap();
    dd
}

#[test]
fn test_duplicate_names_rejected() {
    let mut dd = vehicle_dd();
    assert!(matches!(
        dd.add_struct(StructType::new("tWheel")),
        Err(Error::DuplicateName(name)) if name == "tWheel"
    ));
    assert!(matches!(
        dd.add_enum(EnumType::new("tAxle")),
        Err(Error::DuplicateName(_))
    ));
    assert!(matches!(
        dd.add_struct(StructType::new("tUInt32")),
        Err(Error::DuplicateName(_))
    ));
}

#[test]
fn test_resolve_types() {
    let dd = vehicle_dd();
    assert!(matches!(
        dd.resolve(&TypeRef::parse("tFloat64")),
        Some(ResolvedType::Scalar(ScalarKind::F64))
    ));
    assert!(matches!(
        dd.resolve(&TypeRef::from("tWheel")),
        Some(ResolvedType::Struct(s)) if s.name == "tWheel"
    ));
    assert!(matches!(
        dd.resolve(&TypeRef::from("tGear")),
        Some(ResolvedType::Enum(_))
    ));
    assert!(dd.resolve(&TypeRef::from("tNope")).is_none());
}

#[test]
fn test_forward_reference_accepted_then_resolved() {
    let mut dd = DataDefinition::new();
    dd.add_struct(StructType::new("tOuter").element(Element::new("inner", "tInner")))
        .unwrap();
    assert_eq!(dd.validate().len(), 1);

    dd.add_struct(StructType::new("tInner").element(Element::new("v", ScalarKind::I8)))
        .unwrap();
    assert!(dd.validate().is_empty());
    assert_eq!(
        dd.layout("tOuter", Representation::Serialized)
            .unwrap()
            .size(),
        1
    );
}

#[test]
fn test_dependents_are_transitive() {
    let dd = vehicle_dd();
    let deps: Vec<_> = dd.dependents_of("tWheel").into_iter().collect();
    assert_eq!(deps, vec!["tAxle".to_string(), "tVehicle".to_string()]);
    let deps: Vec<_> = dd.dependents_of("tGear").into_iter().collect();
    assert_eq!(deps, vec!["tVehicle".to_string()]);
    assert!(dd.dependents_of("tVehicle").is_empty());
}

#[test]
fn test_remove_strict_refuses_referenced_type() {
    let mut dd = vehicle_dd();
    let err = dd.remove_type("tWheel", RemoveMode::Strict).unwrap_err();
    assert!(matches!(
        err,
        Error::DanglingReference { ref name, ref referenced_by }
            if name == "tWheel" && referenced_by == "tAxle"
    ));
    assert!(dd.get_struct("tWheel").is_some());

    let removed = dd.remove_type("tVehicle", RemoveMode::Strict).unwrap();
    assert_eq!(removed, vec!["tVehicle".to_string()]);
    assert!(matches!(
        dd.remove_type("tVehicle", RemoveMode::Strict),
        Err(Error::UnknownType(_))
    ));
}

#[test]
fn test_remove_cascade_removes_dependents() {
    let mut dd = vehicle_dd();
    dd.layout("tVehicle", Representation::Deserialized).unwrap();

    let mut removed = dd.remove_type("tWheel", RemoveMode::Cascade).unwrap();
    removed.sort();
    assert_eq!(removed, vec!["tAxle", "tVehicle", "tWheel"]);
    assert_eq!(dd.structs().count(), 0);
    assert!(dd.get_enum("tGear").is_some());
    assert_eq!(dd.layout_cache_stats().entries, 0);
    assert!(dd.validate().is_empty());
}

#[test]
fn test_modify_and_replace_struct() {
    let mut dd = vehicle_dd();
    dd.modify_struct("tWheel", |w| {
        w.version = 2;
        w.push(Element::new("temp", ScalarKind::I8));
    })
    .unwrap();
    let wheel = dd.get_struct("tWheel").unwrap();
    assert_eq!(wheel.version, 2);
    assert_eq!(wheel.index_of("temp"), Some(2));

    assert!(matches!(
        dd.modify_struct("tMissing", |_| {}),
        Err(Error::UnknownType(_))
    ));
    assert!(matches!(
        dd.modify_struct("tWheel", |w| w.name = "tAxle".into()),
        Err(Error::DuplicateName(_))
    ));

    dd.replace_struct(StructType::new("tWheel").element(Element::new("rpm", ScalarKind::U32)))
        .unwrap();
    let layout = dd.layout("tAxle", Representation::Serialized).unwrap();
    assert_eq!(layout.size(), 8);
    assert!(layout.leaf("left.rpm").is_some());
}

#[test]
fn test_rename_through_modify() {
    let mut dd = DataDefinition::new();
    dd.add_struct(StructType::new("tOld")).unwrap();
    dd.modify_struct("tOld", |s| s.name = "tNew".into()).unwrap();
    assert!(dd.get_struct("tOld").is_none());
    assert!(dd.get_struct("tNew").is_some());
}

#[test]
fn test_validate_clean_definition() {
    assert!(vehicle_dd().validate().is_empty());
}

#[test]
fn test_validate_dangling_reference_cites_struct() {
    let mut dd = DataDefinition::new();
    dd.add_struct(
        StructType::new("tBroken")
            .element(Element::new("x", "tMissing"))
            .element(Element::new("y", ScalarKind::U8).with_enum("tNoEnum")),
    )
    .unwrap();

    let problems = dd.validate();
    assert_eq!(problems.len(), 2);
    assert!(problems
        .iter()
        .all(|p| p.kind == ProblemKind::DanglingReference && p.item_name == "tBroken"));
    assert!(problems[0].message.contains("tMissing"));
    assert!(problems[0].to_string().starts_with("tBroken: "));
}

#[test]
fn test_validate_collects_every_problem() {
    let mut dd = DataDefinition::new();
    dd.add_enum(
        EnumType::new("tSmall")
            .with_underlying(ScalarKind::U8)
            .value("A", 1)
            .value("A", 2)
            .value("BIG", 300),
    )
    .unwrap();
    dd.add_enum(EnumType::new("tFloaty").with_underlying(ScalarKind::F32))
        .unwrap();
    dd.add_struct(
        StructType::new("tBad")
            .with_alignment(6)
            .element(Element::new("a", ScalarKind::U8))
            .element(Element::new("a", ScalarKind::U8))
            .element(Element::new("f", ScalarKind::F64).bits(3))
            .element(Element::new("w", ScalarKind::U8).bits(9))
            .element(Element::new("p", ScalarKind::U16).at_bit(2))
            .element(Element::new("al", ScalarKind::U16).aligned(5)),
    )
    .unwrap();

    let problems = dd.validate();
    let count = |kind| problems.iter().filter(|p| p.kind == kind).count();
    assert_eq!(count(ProblemKind::InvalidEnum), 2);
    assert_eq!(count(ProblemKind::DuplicateName), 2);
    assert_eq!(count(ProblemKind::Layout), 5);
    assert_eq!(count(ProblemKind::DanglingReference), 0);
}

#[test]
fn test_validate_cycles_and_size_overflow() {
    let mut dd = DataDefinition::new();
    dd.add_struct(StructType::new("tA").element(Element::new("b", "tB")))
        .unwrap();
    dd.add_struct(StructType::new("tB").element(Element::new("a", "tA")))
        .unwrap();
    dd.add_struct(StructType::new("tSelf").element(Element::new("me", "tSelf")))
        .unwrap();
    dd.add_struct(
        StructType::new("tHuge").element(Element::new("x", ScalarKind::U64).array(usize::MAX)),
    )
    .unwrap();

    let problems = dd.validate();
    let mut cyclic: Vec<_> = problems
        .iter()
        .filter(|p| p.kind == ProblemKind::CyclicComposition)
        .map(|p| p.item_name.as_str())
        .collect();
    cyclic.sort_unstable();
    assert_eq!(cyclic, vec!["tA", "tB", "tSelf"]);

    let layout: Vec<_> = problems
        .iter()
        .filter(|p| p.kind == ProblemKind::Layout)
        .collect();
    assert_eq!(layout.len(), 1);
    assert_eq!(layout[0].item_name, "tHuge");
}

#[test]
fn test_validate_bit_position_near_u32_max() {
    let mut dd = DataDefinition::new();
    dd.add_struct(
        StructType::new("tBad")
            .element(Element::new("f", ScalarKind::U8).bits(1).at_bit(u32::MAX)),
    )
    .unwrap();
    dd.add_struct(
        StructType::new("tWide").element(Element::new("w", ScalarKind::U32).bits(u32::MAX).at_bit(1)),
    )
    .unwrap();

    let problems = dd.validate();
    let mut items: Vec<_> = problems
        .iter()
        .filter(|p| p.kind == ProblemKind::Layout)
        .map(|p| p.item_name.as_str())
        .collect();
    items.sort_unstable();
    assert_eq!(items, vec!["tBad", "tWide"]);
    assert!(problems[0].message.contains(&u32::MAX.to_string()));
}

#[test]
fn test_validate_leaf_limit_and_empty_struct_arrays() {
    let mut dd = DataDefinition::with_config(DefinitionConfig::default().with_max_leaves(16))
        .unwrap();
    dd.add_struct(StructType::new("tEmpty")).unwrap();
    dd.add_struct(StructType::new("tHollow").element(Element::new("xs", "tEmpty").array(usize::MAX)))
        .unwrap();
    dd.add_struct(StructType::new("tBlob").element(Element::new("data", ScalarKind::U8).array(17)))
        .unwrap();

    let problems = dd.validate();
    assert_eq!(problems.len(), 1);
    assert_eq!(problems[0].kind, ProblemKind::Layout);
    assert_eq!(problems[0].item_name, "tBlob");
}

#[test]
fn test_enum_lookup() {
    let mut gear = EnumType::new("tGear").value("PARK", 0).value("P", 0);
    gear.insert("DRIVE", 1).unwrap();
    assert!(matches!(gear.insert("PARK", 5), Err(Error::DuplicateName(_))));
    assert_eq!(gear.value_of("DRIVE"), Some(1));
    assert_eq!(gear.name_of(0), Some("PARK"));
    assert_eq!(gear.name_of(7), None);
}

#[test]
fn test_scalar_names() {
    assert_eq!(ScalarKind::from_name("tUInt16"), Some(ScalarKind::U16));
    assert_eq!(ScalarKind::from_name("double"), Some(ScalarKind::F64));
    assert_eq!(ScalarKind::I32.ddl_name(), "tInt32");
    assert_eq!(ByteOrder::from_name("BE"), Some(ByteOrder::BigEndian));
    assert_eq!(ByteOrder::from_name("little"), Some(ByteOrder::LittleEndian));
}
