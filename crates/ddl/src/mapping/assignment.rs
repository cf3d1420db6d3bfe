// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Struct targets: assemble an output buffer from signal values.

use super::{SignalValues, Target};
use crate::codec::{Codec, Variant};
use crate::error::{Error, Result};
use crate::layout::StructLayout;
use std::sync::Arc;

/// `c0 + c1*x + c2*x^2 + ...`
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    coefficients: Vec<f64>,
}

impl Polynomial {
    /// Coefficients in ascending power order.
    pub fn new(coefficients: Vec<f64>) -> Self {
        Self { coefficients }
    }

    /// `offset + factor * x`
    pub fn linear(offset: f64, factor: f64) -> Self {
        Self::new(vec![offset, factor])
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, &c| acc * x + c)
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }
}

/// Where an assigned value comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum AssignmentSource {
    /// Latest value of `element` in `signal`.
    Element { signal: String, element: String },
    Constant(Variant),
    /// `true` once `signal` was received.
    Received { signal: String },
}

/// Fills one element of the output struct.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// Element path in the output struct.
    pub target: String,
    pub source: AssignmentSource,
    pub transform: Option<Polynomial>,
}

impl Assignment {
    pub fn from_element(
        target: impl Into<String>,
        signal: impl Into<String>,
        element: impl Into<String>,
    ) -> Self {
        Self {
            target: target.into(),
            source: AssignmentSource::Element {
                signal: signal.into(),
                element: element.into(),
            },
            transform: None,
        }
    }

    pub fn constant(target: impl Into<String>, value: impl Into<Variant>) -> Self {
        Self {
            target: target.into(),
            source: AssignmentSource::Constant(value.into()),
            transform: None,
        }
    }

    pub fn received(target: impl Into<String>, signal: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            source: AssignmentSource::Received {
                signal: signal.into(),
            },
            transform: None,
        }
    }

    #[must_use]
    pub fn with_transform(mut self, transform: Polynomial) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Value to store, `None` while the source signal is missing.
    fn resolve(&self, values: &SignalValues) -> Option<Variant> {
        match &self.source {
            AssignmentSource::Element { signal, element } => values.get(signal, element).cloned(),
            AssignmentSource::Constant(value) => Some(value.clone()),
            AssignmentSource::Received { signal } => Some(Variant::Bool(values.received(signal))),
        }
    }
}

/// Target that encodes its assignments into a struct buffer and hands the
/// bytes to a sink.
pub struct StructTarget<F>
where
    F: Fn(&[u8]) -> Result<()> + Send + Sync,
{
    layout: Arc<StructLayout>,
    assignments: Vec<Assignment>,
    sink: F,
}

impl<F> StructTarget<F>
where
    F: Fn(&[u8]) -> Result<()> + Send + Sync,
{
    pub fn new(layout: Arc<StructLayout>, sink: F) -> Self {
        Self {
            layout,
            assignments: Vec::new(),
            sink,
        }
    }

    #[must_use]
    pub fn assign(mut self, assignment: Assignment) -> Self {
        self.assignments.push(assignment);
        self
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    pub fn layout(&self) -> &StructLayout {
        &self.layout
    }

    /// Encode the current values. Elements without a value stay zero.
    pub fn build(&self, values: &SignalValues) -> Result<Vec<u8>> {
        let mut buffer = self.layout.new_buffer();
        let mut codec = Codec::new(&self.layout, &mut buffer)?;
        for assignment in &self.assignments {
            let Some(mut value) = assignment.resolve(values) else {
                continue;
            };
            let leaf = self.layout.leaf(&assignment.target);

            if let Some(transform) = &assignment.transform {
                let x = value.as_f64().ok_or_else(|| {
                    Error::type_mismatch(&assignment.target, "numeric value", value.type_name())
                })?;
                let y = transform.evaluate(x);
                let integral = leaf.is_some_and(|l| !l.kind.is_float());
                value = Variant::F64(if integral { y.round() } else { y });
            }
            if let Some(converted) = leaf.and_then(|l| value.convert_to(l.kind)) {
                value = converted;
            }
            codec.set_element_value(assignment.target.as_str(), value)?;
        }
        Ok(buffer)
    }
}

impl<F> Target for StructTarget<F>
where
    F: Fn(&[u8]) -> Result<()> + Send + Sync,
{
    fn on_trigger(&self, _trigger: &str, values: &SignalValues) -> Result<()> {
        let bytes = self.build(values)?;
        (self.sink)(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polynomial() {
        let p = Polynomial::new(vec![1.0, 2.0, 3.0]);
        assert_eq!(p.evaluate(2.0), 1.0 + 4.0 + 12.0);
        assert_eq!(Polynomial::linear(-40.0, 0.5).evaluate(100.0), 10.0);
        assert_eq!(Polynomial::new(Vec::new()).evaluate(3.0), 0.0);
    }
}
