// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Target trait, target handles and the per-trigger target set.

use super::SignalValues;
use crate::error::Result;
use std::fmt;

/// Opaque handle of a registered target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(pub(crate) u64);

impl TargetId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "target#{}", self.0)
    }
}

/// Consumer of signal values.
///
/// # Thread Safety
/// Implementations must be Send + Sync; triggers fire on whichever thread
/// calls `publish` or `tick`.
///
/// # Examples
/// ```
/// use ddl::mapping::{SignalValues, Target};
///
/// struct Printer;
///
/// impl Target for Printer {
///     fn on_trigger(&self, trigger: &str, values: &SignalValues) -> ddl::Result<()> {
///         println!("{} fired, {} signal(s) known", trigger, values.len());
///         Ok(())
///     }
/// }
/// ```
pub trait Target: Send + Sync {
    /// Called when a trigger holding this target fires.
    ///
    /// An error (or a panic) is recorded in the `DeliveryReport`; the other
    /// targets of the trigger still receive the values.
    fn on_trigger(&self, trigger: &str, values: &SignalValues) -> Result<()>;
}

/// Closure-based target.
pub struct CallbackTarget<F>
where
    F: Fn(&str, &SignalValues) -> Result<()> + Send + Sync,
{
    callback: F,
}

impl<F> CallbackTarget<F>
where
    F: Fn(&str, &SignalValues) -> Result<()> + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> Target for CallbackTarget<F>
where
    F: Fn(&str, &SignalValues) -> Result<()> + Send + Sync,
{
    fn on_trigger(&self, trigger: &str, values: &SignalValues) -> Result<()> {
        (self.callback)(trigger, values)
    }
}

/// Ordered set of target handles (insertion order, no duplicates).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetSet {
    ids: Vec<TargetId>,
}

impl TargetSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the handle was already present.
    pub fn insert(&mut self, id: TargetId) -> bool {
        if self.contains(id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    /// Returns false when the handle was absent.
    pub fn remove(&mut self, id: TargetId) -> bool {
        let before = self.ids.len();
        self.ids.retain(|&t| t != id);
        self.ids.len() != before
    }

    pub fn contains(&self, id: TargetId) -> bool {
        self.ids.contains(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = TargetId> + '_ {
        self.ids.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
