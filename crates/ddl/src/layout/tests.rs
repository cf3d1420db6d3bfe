// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Layout calculator and cache tests.

use super::*;
use crate::config::DefinitionConfig;
use crate::dd::{DataDefinition, Element, EnumType, StructType};
use crate::error::{Error, LayoutError};

fn flag_struct() -> StructType {
    StructType::new("tFlags")
        .element(Element::new("a", ScalarKind::U16))
        .element(Element::new("flag", ScalarKind::U8).bits(1))
        .element(Element::new("b", ScalarKind::U32))
}

fn offsets(layout: &StructLayout) -> Vec<usize> {
    layout.elements().iter().map(|e| e.offset).collect()
}

fn dd_with(structs: Vec<StructType>) -> DataDefinition {
    let mut dd = DataDefinition::new();
    for s in structs {
        dd.add_struct(s).expect("add struct");
    }
    dd
}

#[test]
fn test_bitfield_struct_with_four_byte_default_alignment() {
    let config = DefinitionConfig::default().with_default_alignment(4);
    let mut dd = DataDefinition::with_config(config).expect("config");
    dd.add_struct(flag_struct()).expect("add");

    let deser = dd.layout("tFlags", Representation::Deserialized).unwrap();
    assert_eq!(offsets(&deser), vec![0, 4, 8]);
    assert_eq!(deser.size(), 12);
    assert_eq!(deser.alignment(), 4);
    assert_eq!(
        deser.padding(),
        &[Padding { offset: 2, len: 2 }, Padding { offset: 5, len: 3 }]
    );

    let ser = dd.layout("tFlags", Representation::Serialized).unwrap();
    assert_eq!(offsets(&ser), vec![0, 2, 3]);
    assert_eq!(ser.size(), 7);
    assert!(ser.padding().is_empty());
    assert_eq!(ser.element("b").unwrap().byte_order, ByteOrder::LittleEndian);
}

#[test]
fn test_native_c_layout_with_default_alignment() {
    let dd = dd_with(vec![flag_struct()]);
    let deser = dd.layout("tFlags", Representation::Deserialized).unwrap();
    assert_eq!(offsets(&deser), vec![0, 2, 4]);
    assert_eq!(deser.size(), 8);

    let flag = deser.element("flag").unwrap();
    assert_eq!(flag.bits, Some(BitField { pos: 0, width: 1 }));
    assert_eq!(flag.byte_order, ByteOrder::native());
}

#[test]
fn test_compute_is_deterministic() {
    let dd = dd_with(vec![flag_struct()]);
    let s = dd.get_struct("tFlags").unwrap();
    for repr in [Representation::Serialized, Representation::Deserialized] {
        let first = compute_layout(&dd, s, repr).unwrap();
        let second = compute_layout(&dd, s, repr).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn test_bitfields_share_container_until_full() {
    let dd = dd_with(vec![StructType::new("tBits")
        .element(Element::new("a", ScalarKind::U8).bits(3))
        .element(Element::new("b", ScalarKind::U8).bits(4))
        .element(Element::new("c", ScalarKind::U8).bits(2))]);

    let layout = dd.layout("tBits", Representation::Serialized).unwrap();
    let bits: Vec<_> = layout
        .elements()
        .iter()
        .map(|e| (e.offset, e.bits.unwrap().pos))
        .collect();
    assert_eq!(bits, vec![(0, 0), (0, 3), (1, 0)]);
    assert_eq!(layout.size(), 2);
}

#[test]
fn test_bitfield_container_kind_change_starts_new_container() {
    let dd = dd_with(vec![StructType::new("tMixed")
        .element(Element::new("a", ScalarKind::U8).bits(2))
        .element(Element::new("b", ScalarKind::U16).bits(2))]);

    let layout = dd.layout("tMixed", Representation::Serialized).unwrap();
    assert_eq!(offsets(&layout), vec![0, 1]);
    assert_eq!(layout.size(), 3);
}

#[test]
fn test_explicit_bit_position() {
    let dd = dd_with(vec![StructType::new("tPos")
        .element(Element::new("low", ScalarKind::U8).bits(2))
        .element(Element::new("high", ScalarKind::U8).bits(2).at_bit(6))]);

    let layout = dd.layout("tPos", Representation::Serialized).unwrap();
    let high = layout.element("high").unwrap();
    assert_eq!(high.offset, 0);
    assert_eq!(high.bits, Some(BitField { pos: 6, width: 2 }));
    assert_eq!(layout.size(), 1);
}

#[test]
fn test_bitfield_overflow_is_error() {
    let dd = dd_with(vec![StructType::new("tWide")
        .element(Element::new("x", ScalarKind::U8).bits(9))]);
    let err = dd.layout("tWide", Representation::Serialized).unwrap_err();
    assert!(matches!(
        err,
        Error::Layout(LayoutError::BitFieldOverflow {
            needed: 9,
            available: 8,
            ..
        })
    ));

    let dd = dd_with(vec![StructType::new("tShifted")
        .element(Element::new("x", ScalarKind::U8).bits(4).at_bit(6))]);
    let err = dd.layout("tShifted", Representation::Deserialized).unwrap_err();
    assert!(matches!(
        err,
        Error::Layout(LayoutError::BitFieldOverflow { needed: 10, .. })
    ));
}

#[test]
fn test_invalid_bitfields() {
    let float_bits = StructType::new("tFloatBits").element(Element::new("f", ScalarKind::F32).bits(3));
    let array_bits = StructType::new("tArrayBits")
        .element(Element::new("a", ScalarKind::U8).bits(3).array(2));
    let zero = StructType::new("tZero").element(Element::new("z", ScalarKind::U8).bits(0));
    let dd = dd_with(vec![float_bits, array_bits, zero]);

    for name in ["tFloatBits", "tArrayBits", "tZero"] {
        let err = dd.layout(name, Representation::Serialized).unwrap_err();
        assert!(
            matches!(err, Error::Layout(LayoutError::InvalidBitField { .. })),
            "{}: {:?}",
            name,
            err
        );
    }
}

#[test]
fn test_serialized_explicit_byte_position_records_gap() {
    let dd = dd_with(vec![StructType::new("tGap")
        .element(Element::new("a", ScalarKind::U8))
        .element(Element::new("b", ScalarKind::U16).at_byte(4))]);

    let ser = dd.layout("tGap", Representation::Serialized).unwrap();
    assert_eq!(offsets(&ser), vec![0, 4]);
    assert_eq!(ser.size(), 6);
    assert_eq!(ser.padding(), &[Padding { offset: 1, len: 3 }]);

    // byte positions only apply to the serialized form
    let deser = dd.layout("tGap", Representation::Deserialized).unwrap();
    assert_eq!(offsets(&deser), vec![0, 2]);
}

#[test]
fn test_per_element_byte_order() {
    let dd = dd_with(vec![StructType::new("tOrder")
        .element(Element::new("le", ScalarKind::U32))
        .element(Element::new("be", ScalarKind::U32).byte_order(ByteOrder::BigEndian))]);

    let ser = dd.layout("tOrder", Representation::Serialized).unwrap();
    assert_eq!(ser.element("le").unwrap().byte_order, ByteOrder::LittleEndian);
    assert_eq!(ser.element("be").unwrap().byte_order, ByteOrder::BigEndian);

    let deser = dd.layout("tOrder", Representation::Deserialized).unwrap();
    assert!(deser
        .elements()
        .iter()
        .all(|e| e.byte_order == ByteOrder::native()));
}

#[test]
fn test_nested_arrays_flatten_to_leaves() {
    let point = StructType::new("tPoint")
        .element(Element::new("x", ScalarKind::F32))
        .element(Element::new("y", ScalarKind::F32));
    let path = StructType::new("tPath")
        .element(Element::new("count", ScalarKind::U8))
        .element(Element::new("pts", "tPoint").array(2));
    let dd = dd_with(vec![point, path]);

    let deser = dd.layout("tPath", Representation::Deserialized).unwrap();
    assert_eq!(deser.size(), 20);
    let pts = deser.element("pts").unwrap();
    assert_eq!((pts.offset, pts.stride, pts.size()), (4, 8, 16));

    let paths: Vec<_> = deser.leaves().iter().map(|l| l.path.as_str()).collect();
    assert_eq!(
        paths,
        vec!["count", "pts[0].x", "pts[0].y", "pts[1].x", "pts[1].y"]
    );
    assert_eq!(deser.leaf("pts[1].y").unwrap().offset, 16);

    let ser = dd.layout("tPath", Representation::Serialized).unwrap();
    assert_eq!(ser.size(), 17);
    assert_eq!(ser.leaf("pts[1].y").unwrap().offset, 13);
    assert_eq!(ser.leaf_index("pts[0].x"), Some(1));
}

#[test]
fn test_zero_length_array_has_no_leaves() {
    let dd = dd_with(vec![StructType::new("tEmptyArr")
        .element(Element::new("head", ScalarKind::U32))
        .element(Element::new("none", ScalarKind::U16).array(0))]);
    let layout = dd.layout("tEmptyArr", Representation::Serialized).unwrap();
    assert_eq!(layout.size(), 4);
    assert_eq!(layout.leaves().len(), 1);
    assert_eq!(layout.element("none").unwrap().size(), 0);
}

#[test]
fn test_empty_struct_has_size_zero() {
    let dd = dd_with(vec![StructType::new("tNothing")]);
    for repr in [Representation::Serialized, Representation::Deserialized] {
        let layout = dd.layout("tNothing", repr).unwrap();
        assert_eq!(layout.size(), 0);
        assert!(layout.is_empty());
    }
}

#[test]
fn test_array_of_empty_structs_has_no_leaves() {
    let dd = dd_with(vec![
        StructType::new("tEmpty"),
        StructType::new("tOuter")
            .element(Element::new("id", ScalarKind::U8))
            .element(Element::new("xs", "tEmpty").array(usize::MAX)),
    ]);
    for repr in [Representation::Serialized, Representation::Deserialized] {
        let layout = dd.layout("tOuter", repr).unwrap();
        assert_eq!(layout.size(), 1);
        assert_eq!(layout.leaves().len(), 1);
        assert_eq!(layout.leaves()[0].path, "id");
        assert_eq!(layout.element("xs").unwrap().size(), 0);
    }
}

#[test]
fn test_leaf_limit() {
    let dd = dd_with(vec![
        StructType::new("tAtLimit")
            .element(Element::new("data", ScalarKind::U8).array(crate::config::DEFAULT_MAX_LEAVES)),
        StructType::new("tOverLimit")
            .element(Element::new("data", ScalarKind::U8).array(crate::config::DEFAULT_MAX_LEAVES))
            .element(Element::new("flag", ScalarKind::U8).bits(1)),
    ]);
    let layout = dd.layout("tAtLimit", Representation::Serialized).unwrap();
    assert_eq!(layout.leaves().len(), crate::config::DEFAULT_MAX_LEAVES);

    let err = dd.layout("tOverLimit", Representation::Serialized).unwrap_err();
    match err {
        Error::Layout(LayoutError::TooManyLeaves { item, limit }) => {
            assert_eq!(item, "tOverLimit.flag");
            assert_eq!(limit, crate::config::DEFAULT_MAX_LEAVES);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_leaf_limit_counts_nested_items() {
    let config = DefinitionConfig::default().with_max_leaves(16);
    let mut dd = DataDefinition::with_config(config).expect("config");
    dd.add_struct(
        StructType::new("tPoint")
            .element(Element::new("x", ScalarKind::F32))
            .element(Element::new("y", ScalarKind::F32)),
    )
    .unwrap();
    dd.add_struct(StructType::new("tPath8").element(Element::new("p", "tPoint").array(8)))
        .unwrap();
    dd.add_struct(StructType::new("tPath9").element(Element::new("p", "tPoint").array(9)))
        .unwrap();
    dd.add_struct(
        StructType::new("tHugeBlob").element(Element::new("data", ScalarKind::U8).array(usize::MAX)),
    )
    .unwrap();

    assert_eq!(
        dd.layout("tPath8", Representation::Deserialized)
            .unwrap()
            .leaves()
            .len(),
        16
    );
    assert!(matches!(
        dd.layout("tPath9", Representation::Deserialized),
        Err(Error::Layout(LayoutError::TooManyLeaves { limit: 16, .. }))
    ));
    assert!(matches!(
        dd.layout("tHugeBlob", Representation::Serialized),
        Err(Error::Layout(LayoutError::TooManyLeaves { .. }))
    ));
}

#[test]
fn test_struct_alignment_rounds_size() {
    let dd = dd_with(vec![StructType::new("tAligned")
        .with_alignment(8)
        .element(Element::new("a", ScalarKind::U8))]);
    let deser = dd.layout("tAligned", Representation::Deserialized).unwrap();
    assert_eq!(deser.size(), 8);
    assert_eq!(deser.alignment(), 8);
    assert_eq!(deser.padding(), &[Padding { offset: 1, len: 7 }]);

    let ser = dd.layout("tAligned", Representation::Serialized).unwrap();
    assert_eq!(ser.size(), 1);
}

#[test]
fn test_enum_elements_use_underlying_type() {
    let mut dd = DataDefinition::new();
    dd.add_enum(
        EnumType::new("tGear")
            .with_underlying(ScalarKind::U8)
            .value("PARK", 0)
            .value("DRIVE", 1),
    )
    .unwrap();
    dd.add_struct(
        StructType::new("tCar")
            .element(Element::new("gear", "tGear"))
            .element(Element::new("raw", ScalarKind::I16).with_enum("tGear")),
    )
    .unwrap();

    let layout = dd.layout("tCar", Representation::Serialized).unwrap();
    assert_eq!(layout.size(), 3);
    let gear = layout.leaf("gear").unwrap();
    assert_eq!(gear.kind, ScalarKind::U8);
    assert_eq!(gear.enum_type.as_ref().unwrap().name, "tGear");
    let raw = layout.leaf("raw").unwrap();
    assert_eq!(raw.kind, ScalarKind::I16);
    assert!(raw.enum_type.is_some());
}

#[test]
fn test_layout_errors() {
    let dd = dd_with(vec![
        StructType::new("tDangling").element(Element::new("x", "tMissing")),
        StructType::new("tBadAlign").element(Element::new("x", ScalarKind::U8).aligned(3)),
        StructType::new("tHuge").element(Element::new("x", ScalarKind::U64).array(usize::MAX)),
        StructType::new("tA").element(Element::new("b", "tB")),
        StructType::new("tB").element(Element::new("a", "tA")),
    ]);

    let err = dd.layout("tDangling", Representation::Serialized).unwrap_err();
    assert!(matches!(
        err,
        Error::Layout(LayoutError::UnresolvedType { ref type_name, .. }) if type_name == "tMissing"
    ));

    let err = dd.layout("tBadAlign", Representation::Deserialized).unwrap_err();
    assert!(matches!(
        err,
        Error::Layout(LayoutError::InvalidAlignment { alignment: 3, .. })
    ));

    let err = dd.layout("tHuge", Representation::Serialized).unwrap_err();
    assert!(matches!(err, Error::Layout(LayoutError::SizeOverflow { .. })));

    let err = dd.layout("tA", Representation::Serialized).unwrap_err();
    match err {
        Error::Layout(LayoutError::CyclicComposition { name, path }) => {
            assert_eq!(name, "tA");
            assert_eq!(path, "tA -> tB -> tA");
        }
        other => panic!("unexpected error: {:?}", other),
    }

    assert!(matches!(
        dd.layout("tUnknown", Representation::Serialized),
        Err(Error::UnknownType(_))
    ));
}

#[test]
fn test_cache_hits_and_invalidation() {
    let point = StructType::new("tPoint")
        .element(Element::new("x", ScalarKind::F32))
        .element(Element::new("y", ScalarKind::F32));
    let path = StructType::new("tPath").element(Element::new("pts", "tPoint").array(2));
    let mut dd = dd_with(vec![point, path]);

    let first = dd.layout("tPath", Representation::Deserialized).unwrap();
    let second = dd.layout("tPath", Representation::Deserialized).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert!(dd.layout_cache_stats().hits >= 1);
    assert_eq!(first.size(), 16);

    dd.modify_struct("tPoint", |p| p.push(Element::new("z", ScalarKind::F32)))
        .unwrap();
    let updated = dd.layout("tPath", Representation::Deserialized).unwrap();
    assert!(!Arc::ptr_eq(&first, &updated));
    assert_eq!(updated.size(), 24);
    assert_eq!(updated.element("pts").unwrap().stride, 12);
}

#[test]
fn test_config_change_clears_cache() {
    let mut dd = dd_with(vec![flag_struct()]);
    let before = dd.layout("tFlags", Representation::Serialized).unwrap();
    assert_eq!(before.element("a").unwrap().byte_order, ByteOrder::LittleEndian);

    dd.set_byte_order(ByteOrder::BigEndian);
    assert_eq!(dd.layout_cache_stats().entries, 0);
    let after = dd.layout("tFlags", Representation::Serialized).unwrap();
    assert_eq!(after.element("a").unwrap().byte_order, ByteOrder::BigEndian);

    dd.set_config(DefinitionConfig::default().with_default_alignment(4))
        .unwrap();
    let deser = dd.layout("tFlags", Representation::Deserialized).unwrap();
    assert_eq!(deser.size(), 12);
}

#[test]
fn test_cache_capacity_evicts_least_recent() {
    let cache = LayoutCache::new(1);
    let layout = Arc::new(StructLayout::new(
        "tOne".into(),
        1,
        Representation::Serialized,
        0,
        1,
        Vec::new(),
        Vec::new(),
    ));
    cache.insert("tOne", Representation::Serialized, Arc::clone(&layout));
    cache.insert("tTwo", Representation::Serialized, layout);
    assert_eq!(cache.len(), 1);
    assert!(!cache.contains("tOne", Representation::Serialized));
    assert!(cache.get("tTwo", Representation::Serialized).is_some());

    cache.invalidate(["tTwo"]);
    assert!(cache.is_empty());
    assert_eq!(cache.stats().hits, 1);
}

#[test]
fn test_bitfield_mask() {
    assert_eq!(BitField { pos: 0, width: 3 }.mask(), 0b111);
    assert_eq!(BitField { pos: 0, width: 64 }.mask(), u64::MAX);
}
