// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Element addressing: top-level index or dotted path.

use crate::error::{Error, Result};
use crate::layout::{ElementKind, ElementLayout, StructLayout};

/// Identifies an element of a struct layout.
///
/// Paths look like `speed`, `pose.position.x`, `samples[3]` or
/// `wheels[1].pressure`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementId<'a> {
    /// Top-level element index in declaration order.
    Index(usize),
    Path(&'a str),
}

impl From<usize> for ElementId<'_> {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl<'a> From<&'a str> for ElementId<'a> {
    fn from(path: &'a str) -> Self {
        Self::Path(path)
    }
}

impl<'a> From<&'a String> for ElementId<'a> {
    fn from(path: &'a String) -> Self {
        Self::Path(path)
    }
}

impl std::fmt::Display for ElementId<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Index(i) => write!(f, "#{}", i),
            Self::Path(p) => f.write_str(p),
        }
    }
}

/// An element resolved against a layout.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Selection<'l> {
    pub element: &'l ElementLayout,
    /// Absolute offset: of the selected item, or of the array start.
    pub offset: usize,
    /// True when a whole array element is selected.
    pub whole_array: bool,
}

impl<'l> Selection<'l> {
    pub fn resolve(layout: &'l StructLayout, id: ElementId<'_>) -> Result<Self> {
        match id {
            ElementId::Index(index) => {
                let element = layout
                    .elements()
                    .get(index)
                    .ok_or_else(|| Error::ElementNotFound(id.to_string()))?;
                Ok(Self {
                    element,
                    offset: element.offset,
                    whole_array: element.is_array(),
                })
            }
            ElementId::Path(path) => Self::resolve_path(layout, path),
        }
    }

    fn resolve_path(layout: &'l StructLayout, path: &str) -> Result<Self> {
        let not_found = || Error::ElementNotFound(path.to_string());
        let mut current = layout;
        let mut base = 0usize;
        let mut segments = path.split('.').peekable();

        while let Some(segment) = segments.next() {
            let (name, index) = parse_segment(segment).ok_or_else(not_found)?;
            let element = current.element(name).ok_or_else(not_found)?;
            let mut offset = base + element.offset;
            if let Some(index) = index {
                if !element.is_array() || index >= element.array_size {
                    return Err(not_found());
                }
                offset += index * element.stride;
            }

            if segments.peek().is_none() {
                return Ok(Self {
                    element,
                    offset,
                    whole_array: index.is_none() && element.is_array(),
                });
            }

            // Only single struct items can be descended into.
            match &element.kind {
                ElementKind::Struct(nested) if index.is_some() || !element.is_array() => {
                    current = &**nested;
                    base = offset;
                }
                _ => return Err(not_found()),
            }
        }
        Err(not_found())
    }
}

/// Split `name[3]` into `("name", Some(3))`.
fn parse_segment(segment: &str) -> Option<(&str, Option<usize>)> {
    match segment.find('[') {
        None if !segment.is_empty() => Some((segment, None)),
        None => None,
        Some(open) => {
            let index = segment[open + 1..].strip_suffix(']')?.trim().parse().ok()?;
            let name = &segment[..open];
            (!name.is_empty()).then_some((name, Some(index)))
        }
    }
}
