// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Signal samples and the latest-value snapshot delivered to targets.

use crate::codec::{Decoder, Variant};
use crate::error::Result;
use std::collections::BTreeMap;

/// One sample of a named signal: element values by path.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SignalSample {
    pub signal: String,
    pub values: Vec<(String, Variant)>,
}

impl SignalSample {
    pub fn new(signal: impl Into<String>) -> Self {
        Self {
            signal: signal.into(),
            values: Vec::new(),
        }
    }

    /// Add an element value (builder style).
    #[must_use]
    pub fn with(mut self, element: impl Into<String>, value: impl Into<Variant>) -> Self {
        self.values.push((element.into(), value.into()));
        self
    }

    /// Sample holding every leaf of a decoded buffer.
    pub fn from_decoder(signal: impl Into<String>, decoder: &Decoder<'_>) -> Result<Self> {
        Ok(Self {
            signal: signal.into(),
            values: decoder.leaf_values()?,
        })
    }

    pub fn get(&self, element: &str) -> Option<&Variant> {
        self.values
            .iter()
            .find(|(name, _)| name == element)
            .map(|(_, v)| v)
    }
}

/// Latest values of one signal.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SignalState {
    values: Vec<(String, Variant)>,
    samples: u64,
}

impl SignalState {
    pub fn get(&self, element: &str) -> Option<&Variant> {
        self.values
            .iter()
            .find(|(name, _)| name == element)
            .map(|(_, v)| v)
    }

    pub fn values(&self) -> &[(String, Variant)] {
        &self.values
    }

    /// Number of samples received so far.
    pub fn sample_count(&self) -> u64 {
        self.samples
    }

    fn merge(&mut self, sample: &SignalSample) {
        for (name, value) in &sample.values {
            match self.values.iter_mut().find(|(n, _)| n == name) {
                Some((_, slot)) => *slot = value.clone(),
                None => self.values.push((name.clone(), value.clone())),
            }
        }
        self.samples += 1;
    }
}

/// Immutable snapshot of every signal's latest values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SignalValues {
    signals: BTreeMap<String, SignalState>,
}

impl SignalValues {
    pub fn get(&self, signal: &str, element: &str) -> Option<&Variant> {
        self.signals.get(signal)?.get(element)
    }

    pub fn signal(&self, signal: &str) -> Option<&SignalState> {
        self.signals.get(signal)
    }

    /// True once at least one sample of `signal` was published.
    pub fn received(&self, signal: &str) -> bool {
        self.signals.contains_key(signal)
    }

    pub fn signal_names(&self) -> impl Iterator<Item = &str> {
        self.signals.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    pub(crate) fn apply(&mut self, sample: &SignalSample) {
        self.signals
            .entry(sample.signal.clone())
            .or_default()
            .merge(sample);
    }
}
