// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Exhaustive consistency checks over a `DataDefinition`.
//!
//! Every check runs to completion; problems are collected, never
//! short-circuited, so callers can report all of them at once.

use crate::config::is_valid_alignment;
use crate::dd::{DataDefinition, Element, EnumType, ResolvedType, StructType};
use crate::layout::{self, Representation};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

/// Problem classes reported by [`DataDefinition::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProblemKind {
    /// A type or enum reference that does not resolve.
    DanglingReference,
    /// Duplicate element or enum symbol name.
    DuplicateName,
    /// Alignment, bit-field or size constraint violated.
    Layout,
    /// Struct contains itself.
    CyclicComposition,
    /// Enum with a non-integer base or values outside its base range.
    InvalidEnum,
}

/// One validation finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    /// Struct or enum the problem belongs to.
    pub item_name: String,
    pub kind: ProblemKind,
    pub message: String,
}

impl Problem {
    fn new(item_name: &str, kind: ProblemKind, message: String) -> Self {
        Self {
            item_name: item_name.to_string(),
            kind,
            message,
        }
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.item_name, self.message)
    }
}

impl DataDefinition {
    /// Check the whole definition and return every problem found.
    pub fn validate(&self) -> Vec<Problem> {
        crate::trace_fn!("DataDefinition::validate");
        let mut problems = Vec::new();

        for enum_type in self.enums() {
            check_enum(enum_type, &mut problems);
        }

        let cyclic = self.cyclic_structs();
        for name in &cyclic {
            problems.push(Problem::new(
                name,
                ProblemKind::CyclicComposition,
                format!("struct '{}' contains itself", name),
            ));
        }

        let mut dirty = BTreeSet::new();
        for struct_type in self.structs() {
            let before = problems.len();
            self.check_struct(struct_type, &mut problems);
            if problems.len() != before || cyclic.contains(&struct_type.name) {
                dirty.insert(struct_type.name.clone());
            }
        }

        // Trial layout for clean structs whose dependencies are clean too;
        // catches size overflow and anything the element checks missed.
        for struct_type in self.structs() {
            if dirty.contains(&struct_type.name)
                || self
                    .embedded_structs(&struct_type.name)
                    .iter()
                    .any(|n| dirty.contains(n))
            {
                continue;
            }
            for representation in [Representation::Serialized, Representation::Deserialized] {
                if let Err(e) = layout::compute_layout(self, struct_type, representation) {
                    problems.push(Problem::new(
                        &struct_type.name,
                        ProblemKind::Layout,
                        format!("{} layout: {}", representation, e),
                    ));
                    break;
                }
            }
        }

        if !problems.is_empty() {
            log::debug!(
                "[DataDefinition::validate] {} problem(s) found",
                problems.len()
            );
        }
        problems
    }

    fn check_struct(&self, struct_type: &StructType, problems: &mut Vec<Problem>) {
        let item = struct_type.name.as_str();
        if !is_valid_alignment(struct_type.alignment) {
            problems.push(Problem::new(
                item,
                ProblemKind::Layout,
                format!(
                    "struct alignment {} is not a power of two",
                    struct_type.alignment
                ),
            ));
        }

        let mut seen = HashSet::new();
        for element in &struct_type.elements {
            if !seen.insert(element.name.as_str()) {
                problems.push(Problem::new(
                    item,
                    ProblemKind::DuplicateName,
                    format!("element '{}' is declared more than once", element.name),
                ));
            }
            self.check_element(item, element, problems);
        }
    }

    fn check_element(&self, item: &str, element: &Element, problems: &mut Vec<Problem>) {
        if let Some(alignment) = element.alignment {
            if !is_valid_alignment(alignment) {
                problems.push(Problem::new(
                    item,
                    ProblemKind::Layout,
                    format!(
                        "element '{}' alignment {} is not a power of two",
                        element.name, alignment
                    ),
                ));
            }
        }

        let resolved = self.resolve(&element.type_ref);
        if resolved.is_none() {
            problems.push(Problem::new(
                item,
                ProblemKind::DanglingReference,
                format!(
                    "element '{}' references unknown type '{}'",
                    element.name, element.type_ref
                ),
            ));
        }

        if let Some(enum_name) = &element.enum_ref {
            match self.get_enum(enum_name) {
                None => problems.push(Problem::new(
                    item,
                    ProblemKind::DanglingReference,
                    format!(
                        "element '{}' references unknown enum '{}'",
                        element.name, enum_name
                    ),
                )),
                Some(_) => {
                    if !matches!(resolved, Some(ResolvedType::Scalar(k)) if k.is_integer())
                        && !matches!(resolved, Some(ResolvedType::Enum(_)))
                    {
                        problems.push(Problem::new(
                            item,
                            ProblemKind::Layout,
                            format!(
                                "element '{}' uses enum '{}' on non-integer type '{}'",
                                element.name, enum_name, element.type_ref
                            ),
                        ));
                    }
                }
            }
        }

        if let Some(width) = element.bit_width {
            let container = match resolved {
                Some(ResolvedType::Scalar(kind)) => Some(kind),
                Some(ResolvedType::Enum(e)) => Some(e.underlying),
                _ => None,
            };
            match container {
                Some(kind) if kind.is_integer() => {
                    let needed = element.bit_pos.unwrap_or(0).saturating_add(width);
                    if width == 0 || needed > kind.bits() {
                        problems.push(Problem::new(
                            item,
                            ProblemKind::Layout,
                            format!(
                                "bit-field '{}' needs {} bits but '{}' holds {}",
                                element.name,
                                needed,
                                kind,
                                kind.bits()
                            ),
                        ));
                    }
                }
                _ if resolved.is_some() => problems.push(Problem::new(
                    item,
                    ProblemKind::Layout,
                    format!(
                        "bit-field '{}' must use an integer type, not '{}'",
                        element.name, element.type_ref
                    ),
                )),
                _ => {}
            }
            if element.array_size != 1 {
                problems.push(Problem::new(
                    item,
                    ProblemKind::Layout,
                    format!("bit-field '{}' cannot be an array", element.name),
                ));
            }
        } else if element.bit_pos.is_some() {
            problems.push(Problem::new(
                item,
                ProblemKind::Layout,
                format!(
                    "element '{}' has a bit position but no bit width",
                    element.name
                ),
            ));
        }
    }

    /// Struct names reachable through struct-typed elements of `name`.
    fn embedded_structs(&self, name: &str) -> BTreeSet<String> {
        let mut found = BTreeSet::new();
        let mut stack = vec![name.to_string()];
        while let Some(current) = stack.pop() {
            let Some(struct_type) = self.get_struct(&current) else {
                continue;
            };
            for element in &struct_type.elements {
                if let Some(ResolvedType::Struct(nested)) = self.resolve(&element.type_ref) {
                    if found.insert(nested.name.clone()) {
                        stack.push(nested.name.clone());
                    }
                }
            }
        }
        found
    }

    /// Structs that take part in a composition cycle.
    fn cyclic_structs(&self) -> BTreeSet<String> {
        let graph: BTreeMap<&str, Vec<&str>> = self
            .structs()
            .map(|s| {
                let edges = s
                    .elements
                    .iter()
                    .filter_map(|e| match self.resolve(&e.type_ref) {
                        Some(ResolvedType::Struct(nested)) => Some(nested.name.as_str()),
                        _ => None,
                    })
                    .collect();
                (s.name.as_str(), edges)
            })
            .collect();

        graph
            .keys()
            .filter(|start| reaches(&graph, start, start))
            .map(|s| (*s).to_string())
            .collect()
    }
}

/// True when `target` is reachable from `from` through at least one edge.
fn reaches(graph: &BTreeMap<&str, Vec<&str>>, from: &str, target: &str) -> bool {
    let mut visited = HashSet::new();
    let mut stack: Vec<&str> = graph.get(from).cloned().unwrap_or_default();
    while let Some(node) = stack.pop() {
        if node == target {
            return true;
        }
        if visited.insert(node) {
            if let Some(next) = graph.get(node) {
                stack.extend(next.iter().copied());
            }
        }
    }
    false
}

fn check_enum(enum_type: &EnumType, problems: &mut Vec<Problem>) {
    let item = enum_type.name.as_str();
    let Some((min, max)) = enum_type.underlying.integer_range() else {
        problems.push(Problem::new(
            item,
            ProblemKind::InvalidEnum,
            format!(
                "enum base type '{}' is not an integer type",
                enum_type.underlying
            ),
        ));
        return;
    };

    let mut seen = HashSet::new();
    for symbol in &enum_type.values {
        if !seen.insert(symbol.name.as_str()) {
            problems.push(Problem::new(
                item,
                ProblemKind::DuplicateName,
                format!("enum symbol '{}' is declared more than once", symbol.name),
            ));
        }
        let value = i128::from(symbol.value);
        if value < min || value > max {
            problems.push(Problem::new(
                item,
                ProblemKind::InvalidEnum,
                format!(
                    "enum symbol '{}' = {} does not fit '{}'",
                    symbol.name, symbol.value, enum_type.underlying
                ),
            ));
        }
    }
}
