// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Single-pass conversion between two representations of one struct.

use super::access::ScalarSlot;
use super::{Codec, Decoder};
use crate::error::{Error, Result};
use crate::layout::StructLayout;

/// True when both layouts flatten to the same leaves (paths and kinds).
fn compatible(source: &StructLayout, target: &StructLayout) -> bool {
    source.name() == target.name()
        && source.leaves().len() == target.leaves().len()
        && source
            .leaves()
            .iter()
            .zip(target.leaves())
            .all(|(s, t)| {
                s.path == t.path
                    && s.kind == t.kind
                    && s.bits.map(|b| b.width) == t.bits.map(|b| b.width)
            })
}

/// Copy every leaf of `source` into `target`, applying offset, padding and
/// byte-order differences. Target padding is zeroed.
pub fn transcode(source: &Decoder<'_>, target: &mut Codec<'_>) -> Result<()> {
    crate::trace_fn!("transcode");
    let (from, to) = (source.layout(), target.layout());
    if !compatible(from, to) {
        return Err(Error::LayoutMismatch {
            source_name: from.name().to_string(),
            target_name: to.name().to_string(),
        });
    }

    target.reset();
    let input = source.buffer();
    let output = target.buffer_mut();
    for (s, t) in from.leaves().iter().zip(to.leaves()) {
        let raw = ScalarSlot::from_leaf(s).read_raw(input)?;
        ScalarSlot::from_leaf(t).write_raw(output, raw)?;
    }
    log::trace!(
        "[transcode] '{}' {} -> {} ({} leaves)",
        from.name(),
        from.representation(),
        to.representation(),
        from.leaves().len()
    );
    Ok(())
}

/// Transcode into a freshly allocated buffer laid out as `target`.
pub fn transcode_to_vec(source: &Decoder<'_>, target: &StructLayout) -> Result<Vec<u8>> {
    let mut buffer = target.new_buffer();
    let mut codec = Codec::new(target, &mut buffer)?;
    transcode(source, &mut codec)?;
    Ok(buffer)
}
