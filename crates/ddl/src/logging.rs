// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Logging helpers.
//!
//! The crate logs through the `log` facade (`log::debug!`, `log::warn!`)
//! using the `[Type::method] message` convention and never installs a
//! logger; binaries pick the backend (e.g. `env_logger`).
//!
//! `trace_fn!` marks function entry as `[ENTER:FNC] name` at trace level.
//! It is only active with the `trace` feature and compiles to nothing
//! otherwise.

#[doc(hidden)]
pub use log as __log;

/// Function entry trace marker.
///
/// # Example
/// ```ignore
/// fn compute_layout() {
///     trace_fn!("compute_layout");
/// }
/// ```
#[macro_export]
#[cfg(feature = "trace")]
macro_rules! trace_fn {
    ($fn_name:expr) => {
        $crate::logging::__log::trace!("[ENTER:FNC] {}", $fn_name);
    };
}

/// No-op trace macro (when trace feature disabled).
#[macro_export]
#[cfg(not(feature = "trace"))]
macro_rules! trace_fn {
    ($fn_name:expr) => {};
}
