// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Signal mapping: triggers route published signal values to targets.
//!
//! # Example
//!
//! ```rust
//! use ddl::mapping::{CallbackTarget, MappingEngine, SignalSample, TriggerCondition};
//! use std::sync::Arc;
//!
//! let engine = MappingEngine::new();
//! let target = engine
//!     .register_target(
//!         Some("printer"),
//!         Arc::new(CallbackTarget::new(|trigger, values| {
//!             println!("{}: {:?}", trigger, values.get("speed", "kmh"));
//!             Ok(())
//!         })),
//!     )
//!     .unwrap();
//! let trigger = engine
//!     .add_trigger(Some("on-speed"), TriggerCondition::on_data("speed"))
//!     .unwrap();
//! engine.add_target(trigger, target).unwrap();
//!
//! let report = engine
//!     .publish(SignalSample::new("speed").with("kmh", 88u16))
//!     .unwrap();
//! assert_eq!(report.delivered, 1);
//! ```

mod assignment;
mod engine;
mod signals;
mod target;
mod trigger;

pub use assignment::{Assignment, AssignmentSource, Polynomial, StructTarget};
pub use engine::{DeliveryFailure, DeliveryReport, MappingEngine, TriggerId};
pub use signals::{SignalSample, SignalState, SignalValues};
pub use target::{CallbackTarget, Target, TargetId, TargetSet};
pub use trigger::{Comparison, Trigger, TriggerCondition, TriggerState};
