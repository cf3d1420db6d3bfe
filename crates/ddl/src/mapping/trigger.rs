// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Triggers: dispatch condition, target set and state machine.
//!
//! ```text
//! Idle   --add_target-->          Armed
//! Armed  --last remove_target-->  Idle
//! Armed  --condition holds-->     Firing
//! Firing --delivery done-->       Armed (Idle if the set became empty)
//! ```

use super::{SignalSample, TargetId, TargetSet};
use crate::codec::Variant;
use crate::error::{Error, Result};
use std::fmt;
use std::time::Duration;

/// Lifecycle state of a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerState {
    /// No targets; conditions are still tracked but nothing is delivered.
    Idle,
    Armed,
    /// Delivery in progress.
    Firing,
}

/// Numeric comparison for [`TriggerCondition::OnValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

impl Comparison {
    pub fn holds(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Self::Equal => lhs == rhs,
            Self::NotEqual => lhs != rhs,
            Self::Less => lhs < rhs,
            Self::LessOrEqual => lhs <= rhs,
            Self::Greater => lhs > rhs,
            Self::GreaterOrEqual => lhs >= rhs,
        }
    }

    /// Parse `==`, `!=`, `<`, `<=`, `>`, `>=` or `equal`, `not_equal`, `less`, ...
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let cmp = match symbol.trim() {
            "==" | "equal" | "eq" => Self::Equal,
            "!=" | "not_equal" | "ne" => Self::NotEqual,
            "<" | "less" | "lt" => Self::Less,
            "<=" | "less_equal" | "le" => Self::LessOrEqual,
            ">" | "greater" | "gt" => Self::Greater,
            ">=" | "greater_equal" | "ge" => Self::GreaterOrEqual,
            _ => return None,
        };
        Some(cmp)
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessOrEqual => "<=",
            Self::Greater => ">",
            Self::GreaterOrEqual => ">=",
        })
    }
}

/// When a trigger fires.
#[derive(Debug, Clone, PartialEq)]
pub enum TriggerCondition {
    /// Every `period` of engine time; missed periods coalesce into one firing.
    Periodic { period: Duration },
    /// Every sample of `signal`.
    OnData { signal: String },
    /// When `element` of `signal` differs from the last observed value.
    /// The first observation counts as a change.
    OnChange { signal: String, element: String },
    /// When `element` of `signal` compares true against `value`.
    OnValue {
        signal: String,
        element: String,
        comparison: Comparison,
        value: f64,
    },
}

impl TriggerCondition {
    pub fn periodic(period: Duration) -> Self {
        Self::Periodic { period }
    }

    pub fn on_data(signal: impl Into<String>) -> Self {
        Self::OnData {
            signal: signal.into(),
        }
    }

    pub fn on_change(signal: impl Into<String>, element: impl Into<String>) -> Self {
        Self::OnChange {
            signal: signal.into(),
            element: element.into(),
        }
    }

    pub fn on_value(
        signal: impl Into<String>,
        element: impl Into<String>,
        comparison: Comparison,
        value: f64,
    ) -> Self {
        Self::OnValue {
            signal: signal.into(),
            element: element.into(),
            comparison,
            value,
        }
    }

    /// Signal the condition listens to (`None` for periodic triggers).
    pub fn signal(&self) -> Option<&str> {
        match self {
            Self::Periodic { .. } => None,
            Self::OnData { signal }
            | Self::OnChange { signal, .. }
            | Self::OnValue { signal, .. } => Some(signal),
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| Err(Error::InvalidTrigger(reason.to_string()));
        match self {
            Self::Periodic { period } if period.is_zero() => invalid("period must be non-zero"),
            Self::OnData { signal } if signal.is_empty() => invalid("empty signal name"),
            Self::OnChange { signal, element } | Self::OnValue { signal, element, .. }
                if signal.is_empty() || element.is_empty() =>
            {
                invalid("empty signal or element name")
            }
            Self::OnValue { value, .. } if value.is_nan() => invalid("comparison value is NaN"),
            _ => Ok(()),
        }
    }
}

/// A dispatch unit: condition, targets and state.
#[derive(Debug, Clone)]
pub struct Trigger {
    name: String,
    condition: TriggerCondition,
    targets: TargetSet,
    state: TriggerState,
    next_deadline: Option<Duration>,
    last_seen: Option<Variant>,
}

impl Trigger {
    /// New trigger, `Idle` with no targets.
    pub fn new(name: impl Into<String>, condition: TriggerCondition) -> Self {
        Self {
            name: name.into(),
            condition,
            targets: TargetSet::new(),
            state: TriggerState::Idle,
            next_deadline: None,
            last_seen: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn condition(&self) -> &TriggerCondition {
        &self.condition
    }

    pub fn state(&self) -> TriggerState {
        self.state
    }

    pub fn targets(&self) -> &TargetSet {
        &self.targets
    }

    /// Add a target handle; a present handle is a no-op returning false.
    pub fn add_target(&mut self, id: TargetId) -> bool {
        let inserted = self.targets.insert(id);
        if self.state == TriggerState::Idle && !self.targets.is_empty() {
            self.state = TriggerState::Armed;
        }
        inserted
    }

    /// Remove a target handle; an absent handle is a no-op returning false.
    ///
    /// A `Firing` trigger stays `Firing`; `end_firing` settles the state.
    pub fn remove_target(&mut self, id: TargetId) -> bool {
        let removed = self.targets.remove(id);
        if self.targets.is_empty() && self.state == TriggerState::Armed {
            self.state = TriggerState::Idle;
        }
        removed
    }

    /// Evaluate the condition against a new sample.
    pub(crate) fn observe(&mut self, sample: &SignalSample) -> bool {
        if self.condition.signal() != Some(sample.signal.as_str()) {
            return false;
        }
        match &self.condition {
            TriggerCondition::Periodic { .. } => false,
            TriggerCondition::OnData { .. } => true,
            TriggerCondition::OnChange { element, .. } => match sample.get(element) {
                Some(value) if self.last_seen.as_ref() != Some(value) => {
                    self.last_seen = Some(value.clone());
                    true
                }
                _ => false,
            },
            TriggerCondition::OnValue {
                element,
                comparison,
                value,
                ..
            } => sample
                .get(element)
                .and_then(Variant::as_f64)
                .is_some_and(|observed| comparison.holds(observed, *value)),
        }
    }

    /// Advance engine time; periodic triggers fire once per passed deadline
    /// group. The first tick only schedules the first deadline.
    pub(crate) fn advance(&mut self, now: Duration) -> bool {
        let TriggerCondition::Periodic { period } = self.condition else {
            return false;
        };
        let Some(deadline) = self.next_deadline else {
            self.next_deadline = now.checked_add(period);
            return false;
        };
        if now < deadline {
            return false;
        }
        // Skip every period already missed.
        let missed = (now - deadline).as_nanos() / period.as_nanos();
        let steps = u32::try_from(missed + 1).unwrap_or(u32::MAX);
        self.next_deadline = period
            .checked_mul(steps)
            .and_then(|span| deadline.checked_add(span));
        true
    }

    /// Enter `Firing` when armed; returns the targets to deliver to.
    pub(crate) fn begin_firing(&mut self) -> Option<Vec<TargetId>> {
        if self.state != TriggerState::Armed {
            return None;
        }
        self.state = TriggerState::Firing;
        Some(self.targets.iter().collect())
    }

    pub(crate) fn end_firing(&mut self) {
        if self.state == TriggerState::Firing {
            self.state = if self.targets.is_empty() {
                TriggerState::Idle
            } else {
                TriggerState::Armed
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_machine() {
        let mut trigger = Trigger::new("t", TriggerCondition::on_data("s"));
        assert_eq!(trigger.state(), TriggerState::Idle);

        assert!(trigger.add_target(TargetId(1)));
        assert!(!trigger.add_target(TargetId(1)));
        assert_eq!(trigger.state(), TriggerState::Armed);
        assert_eq!(trigger.targets().len(), 1);

        assert_eq!(trigger.begin_firing(), Some(vec![TargetId(1)]));
        assert_eq!(trigger.state(), TriggerState::Firing);
        trigger.end_firing();
        assert_eq!(trigger.state(), TriggerState::Armed);

        assert!(!trigger.remove_target(TargetId(9)));
        assert!(trigger.remove_target(TargetId(1)));
        assert_eq!(trigger.state(), TriggerState::Idle);
        assert_eq!(trigger.begin_firing(), None);
    }

    #[test]
    fn test_target_changes_while_firing_settle_at_end() {
        let mut trigger = Trigger::new("t", TriggerCondition::on_data("s"));
        trigger.add_target(TargetId(1));
        assert_eq!(trigger.begin_firing(), Some(vec![TargetId(1)]));

        assert!(trigger.remove_target(TargetId(1)));
        assert_eq!(trigger.state(), TriggerState::Firing);
        trigger.add_target(TargetId(2));
        assert_eq!(trigger.state(), TriggerState::Firing);
        assert_eq!(trigger.begin_firing(), None);
        trigger.end_firing();
        assert_eq!(trigger.state(), TriggerState::Armed);

        assert_eq!(trigger.begin_firing(), Some(vec![TargetId(2)]));
        assert!(trigger.remove_target(TargetId(2)));
        assert_eq!(trigger.state(), TriggerState::Firing);
        trigger.end_firing();
        assert_eq!(trigger.state(), TriggerState::Idle);
    }

    #[test]
    fn test_on_change_first_observation_fires() {
        let mut trigger = Trigger::new("t", TriggerCondition::on_change("s", "v"));
        let sample = |v: u8| SignalSample::new("s").with("v", v);

        assert!(trigger.observe(&sample(1)));
        assert!(!trigger.observe(&sample(1)));
        assert!(trigger.observe(&sample(2)));
        assert!(!trigger.observe(&SignalSample::new("s").with("other", 5u8)));
        assert!(!trigger.observe(&SignalSample::new("x").with("v", 9u8)));
    }

    #[test]
    fn test_on_value_comparison() {
        let mut trigger = Trigger::new(
            "t",
            TriggerCondition::on_value("s", "speed", Comparison::GreaterOrEqual, 50.0),
        );
        assert!(!trigger.observe(&SignalSample::new("s").with("speed", 49u16)));
        assert!(trigger.observe(&SignalSample::new("s").with("speed", 50u16)));
        assert!(trigger.observe(&SignalSample::new("s").with("speed", 72.5f64)));
        assert!(!trigger.observe(&SignalSample::new("s").with("speed", "fast")));
    }

    #[test]
    fn test_periodic_coalesces_missed_periods() {
        let period = Duration::from_millis(10);
        let mut trigger = Trigger::new("t", TriggerCondition::periodic(period));

        assert!(!trigger.advance(Duration::from_millis(0)));
        assert!(!trigger.advance(Duration::from_millis(9)));
        assert!(trigger.advance(Duration::from_millis(10)));
        assert!(!trigger.advance(Duration::from_millis(15)));
        // 20, 30 and 40 were missed: one firing, next deadline 50
        assert!(trigger.advance(Duration::from_millis(45)));
        assert!(!trigger.advance(Duration::from_millis(49)));
        assert!(trigger.advance(Duration::from_millis(50)));
    }

    #[test]
    fn test_condition_validation() {
        assert!(TriggerCondition::periodic(Duration::ZERO).validate().is_err());
        assert!(TriggerCondition::on_data("").validate().is_err());
        assert!(TriggerCondition::on_change("s", "").validate().is_err());
        assert!(
            TriggerCondition::on_value("s", "v", Comparison::Equal, f64::NAN)
                .validate()
                .is_err()
        );
        assert!(TriggerCondition::on_data("s").validate().is_ok());
        assert_eq!(Comparison::from_symbol("<="), Some(Comparison::LessOrEqual));
        assert_eq!(Comparison::Greater.to_string(), ">");
    }
}
