// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Mapping engine: target registry, triggers and dispatch.
//!
//! # Architecture
//!
//! ```text
//! publish(sample) --> SignalValues (ArcSwap snapshot)
//!        |
//!        v
//! triggers (RwLock) --observe/advance--> fired triggers + target snapshot
//!        |
//!        v  (no lock held)
//! targets (DashMap) --on_trigger(values)--> DeliveryReport
//! ```
//!
//! Delivery runs outside every lock on a snapshot of each trigger's target
//! set. Registration calls made from a target callback on the dispatching
//! thread fail with `ReentrantDispatch`.

use super::{SignalSample, SignalValues, Target, TargetId, Trigger, TriggerCondition, TriggerState};
use crate::codec::Decoder;
use crate::error::{Error, Result};
use crate::id::{self, IdGenerator};
use arc_swap::ArcSwap;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::cell::Cell;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

thread_local! {
    static DISPATCH_DEPTH: Cell<u32> = const { Cell::new(0) };
}

/// Marks the current thread as dispatching until dropped.
struct DispatchGuard;

impl DispatchGuard {
    fn enter() -> Self {
        DISPATCH_DEPTH.with(|d| d.set(d.get() + 1));
        Self
    }

    fn active() -> bool {
        DISPATCH_DEPTH.with(|d| d.get() > 0)
    }
}

impl Drop for DispatchGuard {
    fn drop(&mut self) {
        DISPATCH_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}

fn ensure_not_dispatching() -> Result<()> {
    if DispatchGuard::active() {
        return Err(Error::ReentrantDispatch);
    }
    Ok(())
}

/// Opaque handle of a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TriggerId(u64);

impl TriggerId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TriggerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "trigger#{}", self.0)
    }
}

/// One failed delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryFailure {
    pub trigger: TriggerId,
    pub target: TargetId,
    pub error: String,
}

/// Outcome of one `publish` or `tick`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Triggers that fired, in id order.
    pub fired: Vec<TriggerId>,
    /// Successful deliveries.
    pub delivered: usize,
    pub failures: Vec<DeliveryFailure>,
}

impl DeliveryReport {
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn has_fired(&self, trigger: TriggerId) -> bool {
        self.fired.contains(&trigger)
    }
}

struct Registration {
    label: String,
    target: Arc<dyn Target>,
}

/// Routes signal samples to registered targets through triggers.
///
/// All methods take `&self`; the engine can be shared as `Arc<MappingEngine>`.
pub struct MappingEngine {
    targets: DashMap<TargetId, Registration>,
    triggers: RwLock<BTreeMap<TriggerId, Trigger>>,
    values: ArcSwap<SignalValues>,
    next_id: AtomicU64,
    ids: Arc<dyn IdGenerator>,
}

impl Default for MappingEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MappingEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappingEngine")
            .field("targets", &self.targets.len())
            .field("triggers", &self.triggers.read().len())
            .field("signals", &self.values.load().len())
            .finish()
    }
}

impl MappingEngine {
    /// Engine labelling unnamed targets/triggers with the process-wide UUID generator.
    pub fn new() -> Self {
        struct Global;
        impl IdGenerator for Global {
            fn generate(&self) -> String {
                id::generate_uuid_v4()
            }
        }
        Self::with_id_generator(Arc::new(Global))
    }

    pub fn with_id_generator(ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            targets: DashMap::new(),
            triggers: RwLock::new(BTreeMap::new()),
            values: ArcSwap::from_pointee(SignalValues::default()),
            next_id: AtomicU64::new(1),
            ids,
        }
    }

    fn next_raw_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn label_or_generate(&self, label: Option<&str>) -> String {
        label.map_or_else(|| self.ids.generate(), str::to_string)
    }

    // ------------------------------------------------------------------
    // Targets
    // ------------------------------------------------------------------

    /// Register a target; `label` defaults to a generated UUID.
    pub fn register_target(&self, label: Option<&str>, target: Arc<dyn Target>) -> Result<TargetId> {
        ensure_not_dispatching()?;
        let id = TargetId(self.next_raw_id());
        let label = self.label_or_generate(label);
        log::debug!("[MappingEngine::register_target] {} '{}'", id, label);
        self.targets.insert(id, Registration { label, target });
        Ok(id)
    }

    /// Unregister a target and drop its handle from every trigger.
    pub fn unregister_target(&self, id: TargetId) -> Result<()> {
        ensure_not_dispatching()?;
        if self.targets.remove(&id).is_none() {
            return Err(Error::UnknownTarget(id.to_string()));
        }
        for trigger in self.triggers.write().values_mut() {
            trigger.remove_target(id);
        }
        log::debug!("[MappingEngine::unregister_target] {}", id);
        Ok(())
    }

    pub fn target_label(&self, id: TargetId) -> Option<String> {
        self.targets.get(&id).map(|r| r.label.clone())
    }

    /// First target registered under `label`.
    pub fn find_target(&self, label: &str) -> Option<TargetId> {
        self.targets
            .iter()
            .filter(|r| r.label == label)
            .map(|r| *r.key())
            .min()
    }

    pub fn registered_targets(&self) -> usize {
        self.targets.len()
    }

    // ------------------------------------------------------------------
    // Triggers
    // ------------------------------------------------------------------

    /// Add a trigger (starts `Idle`); `label` defaults to a generated UUID.
    pub fn add_trigger(&self, label: Option<&str>, condition: TriggerCondition) -> Result<TriggerId> {
        ensure_not_dispatching()?;
        condition.validate()?;
        let id = TriggerId(self.next_raw_id());
        let trigger = Trigger::new(self.label_or_generate(label), condition);
        log::debug!(
            "[MappingEngine::add_trigger] {} '{}' {:?}",
            id,
            trigger.name(),
            trigger.condition()
        );
        self.triggers.write().insert(id, trigger);
        Ok(id)
    }

    pub fn remove_trigger(&self, id: TriggerId) -> Result<()> {
        ensure_not_dispatching()?;
        self.triggers
            .write()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Error::UnknownTrigger(id.to_string()))
    }

    /// Attach a registered target. Returns false when it was already attached.
    pub fn add_target(&self, trigger: TriggerId, target: TargetId) -> Result<bool> {
        ensure_not_dispatching()?;
        // Registration is checked under the trigger lock; `unregister_target`
        // drops the registration before taking that lock.
        let mut triggers = self.triggers.write();
        if !self.targets.contains_key(&target) {
            return Err(Error::UnknownTarget(target.to_string()));
        }
        let entry = triggers
            .get_mut(&trigger)
            .ok_or_else(|| Error::UnknownTrigger(trigger.to_string()))?;
        Ok(entry.add_target(target))
    }

    /// Detach a target. Returns false when it was not attached.
    pub fn remove_target(&self, trigger: TriggerId, target: TargetId) -> Result<bool> {
        ensure_not_dispatching()?;
        let mut triggers = self.triggers.write();
        let entry = triggers
            .get_mut(&trigger)
            .ok_or_else(|| Error::UnknownTrigger(trigger.to_string()))?;
        Ok(entry.remove_target(target))
    }

    pub fn trigger_state(&self, trigger: TriggerId) -> Result<TriggerState> {
        self.with_trigger(trigger, Trigger::state)
    }

    pub fn target_count(&self, trigger: TriggerId) -> Result<usize> {
        self.with_trigger(trigger, |t| t.targets().len())
    }

    pub fn trigger_name(&self, trigger: TriggerId) -> Result<String> {
        self.with_trigger(trigger, |t| t.name().to_string())
    }

    pub fn trigger_count(&self) -> usize {
        self.triggers.read().len()
    }

    fn with_trigger<T>(&self, trigger: TriggerId, f: impl FnOnce(&Trigger) -> T) -> Result<T> {
        self.triggers
            .read()
            .get(&trigger)
            .map(f)
            .ok_or_else(|| Error::UnknownTrigger(trigger.to_string()))
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    /// Latest signal values.
    pub fn values(&self) -> Arc<SignalValues> {
        self.values.load_full()
    }

    /// Record a sample and fire every trigger whose condition holds.
    pub fn publish(&self, sample: SignalSample) -> Result<DeliveryReport> {
        ensure_not_dispatching()?;
        self.values.rcu(|current| {
            let mut next = SignalValues::clone(current);
            next.apply(&sample);
            next
        });
        self.dispatch(|trigger| trigger.observe(&sample))
    }

    /// Publish every leaf of a decoded buffer as one sample of `signal`.
    pub fn publish_decoded(&self, signal: &str, decoder: &Decoder<'_>) -> Result<DeliveryReport> {
        self.publish(SignalSample::from_decoder(signal, decoder)?)
    }

    /// Advance engine time and fire due periodic triggers.
    pub fn tick(&self, now: Duration) -> Result<DeliveryReport> {
        ensure_not_dispatching()?;
        self.dispatch(|trigger| trigger.advance(now))
    }

    fn dispatch(&self, mut condition: impl FnMut(&mut Trigger) -> bool) -> Result<DeliveryReport> {
        let plan: Vec<(TriggerId, String, Vec<TargetId>)> = {
            let mut triggers = self.triggers.write();
            triggers
                .iter_mut()
                .filter_map(|(id, trigger)| {
                    if !condition(trigger) {
                        return None;
                    }
                    let targets = trigger.begin_firing()?;
                    Some((*id, trigger.name().to_string(), targets))
                })
                .collect()
        };

        let mut report = DeliveryReport::default();
        if plan.is_empty() {
            return Ok(report);
        }

        let values = self.values.load_full();
        {
            let _guard = DispatchGuard::enter();
            for (trigger_id, name, targets) in &plan {
                report.fired.push(*trigger_id);
                for target_id in targets {
                    // Clone out of the map so no shard lock is held during delivery.
                    let Some(target) = self.targets.get(target_id).map(|r| Arc::clone(&r.target))
                    else {
                        continue;
                    };
                    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                        target.on_trigger(name, &values)
                    }));
                    let error = match outcome {
                        Ok(Ok(())) => {
                            report.delivered += 1;
                            continue;
                        }
                        Ok(Err(e)) => e.to_string(),
                        Err(_) => "target panicked during delivery".to_string(),
                    };
                    log::debug!(
                        "[MappingEngine::dispatch] delivery of '{}' to {} failed: {}",
                        name,
                        target_id,
                        error
                    );
                    report.failures.push(DeliveryFailure {
                        trigger: *trigger_id,
                        target: *target_id,
                        error,
                    });
                }
            }
        }

        let mut triggers = self.triggers.write();
        for (trigger_id, _, _) in &plan {
            if let Some(trigger) = triggers.get_mut(trigger_id) {
                trigger.end_firing();
            }
        }
        Ok(report)
    }
}
