// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Identifier generation for dynamically created targets and triggers.
//!
//! The process-wide [`UuidGenerator`] is initialized once on first use and
//! guards a single random generator with one mutex. It must not be called
//! re-entrantly from inside the lock (the generator never calls back out).
//! Components that want to avoid global state take an [`IdGenerator`]
//! instance instead (see `MappingEngine::with_id_generator`).

use parking_lot::Mutex;
use std::sync::OnceLock;

/// Source of unique string identifiers.
pub trait IdGenerator: Send + Sync {
    /// Produce a new identifier.
    fn generate(&self) -> String;
}

/// Random (version 4) UUID generator.
pub struct UuidGenerator {
    rng: Mutex<fastrand::Rng>,
}

impl UuidGenerator {
    /// Generator seeded from the OS entropy source.
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(fastrand::Rng::new()),
        }
    }

    /// Deterministic generator (tests, reproducible tooling).
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(fastrand::Rng::with_seed(seed)),
        }
    }
}

impl Default for UuidGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> String {
        let mut bytes = [0u8; 16];
        self.rng.lock().fill(&mut bytes);
        uuid::Builder::from_random_bytes(bytes)
            .into_uuid()
            .hyphenated()
            .to_string()
    }
}

/// Process-wide generator.
pub fn global() -> &'static UuidGenerator {
    static GENERATOR: OnceLock<UuidGenerator> = OnceLock::new();
    GENERATOR.get_or_init(UuidGenerator::new)
}

/// Generate a version 4 UUID string from the process-wide generator.
pub fn generate_uuid_v4() -> String {
    global().generate()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_format() {
        let id = generate_uuid_v4();
        let parsed = uuid::Uuid::parse_str(&id).expect("valid uuid");
        assert_eq!(parsed.get_version_num(), 4);
        assert_eq!(id.len(), 36);
    }

    #[test]
    fn test_seeded_generator_is_reproducible() {
        let a = UuidGenerator::with_seed(7);
        let b = UuidGenerator::with_seed(7);
        assert_eq!(a.generate(), b.generate());
        assert_ne!(a.generate(), a.generate());
    }
}
