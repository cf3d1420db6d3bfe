// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! DDL configuration.
//!
//! - **Static**: crate constants (default alignment, cache capacity, limits).
//! - **Per definition**: [`DefinitionConfig`], owned by each `DataDefinition`.
//!   Changing it invalidates every cached layout of that definition.
//!
//! # Example
//!
//! ```
//! use ddl::{ByteOrder, DefinitionConfig};
//!
//! let config = DefinitionConfig::default()
//!     .with_byte_order(ByteOrder::BigEndian)
//!     .with_default_alignment(4);
//! assert!(config.validate().is_ok());
//! ```

use crate::dd::ByteOrder;
use crate::error::{Error, Result};

/// Element alignment used in the deserialized representation when an element
/// carries no override. 1 yields the native C layout.
pub const DEFAULT_ELEMENT_ALIGNMENT: usize = 1;

/// Number of layouts kept by a definition's LRU cache.
pub const DEFAULT_LAYOUT_CACHE_CAPACITY: usize = 256;

/// Flattened scalar slots allowed in one struct layout.
pub const DEFAULT_MAX_LEAVES: usize = 65_536;

/// Largest alignment accepted anywhere in a definition.
pub const MAX_ALIGNMENT: usize = 4096;

/// Serialized byte order used when neither element nor definition override it.
pub const DEFAULT_BYTE_ORDER: ByteOrder = ByteOrder::LittleEndian;

/// Per-definition settings.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DefinitionConfig {
    /// Byte order of the serialized representation.
    pub byte_order: ByteOrder,
    /// Element alignment for the deserialized representation.
    pub default_alignment: usize,
    /// Layout cache capacity (entries).
    pub layout_cache_capacity: usize,
    /// Upper bound on the leaves of one layout (array items included).
    pub max_leaves: usize,
}

impl Default for DefinitionConfig {
    fn default() -> Self {
        Self {
            byte_order: DEFAULT_BYTE_ORDER,
            default_alignment: DEFAULT_ELEMENT_ALIGNMENT,
            layout_cache_capacity: DEFAULT_LAYOUT_CACHE_CAPACITY,
            max_leaves: DEFAULT_MAX_LEAVES,
        }
    }
}

impl DefinitionConfig {
    /// Set the serialized byte order.
    #[must_use]
    pub fn with_byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    /// Set the default deserialized element alignment.
    #[must_use]
    pub fn with_default_alignment(mut self, alignment: usize) -> Self {
        self.default_alignment = alignment;
        self
    }

    /// Set the layout cache capacity.
    #[must_use]
    pub fn with_layout_cache_capacity(mut self, capacity: usize) -> Self {
        self.layout_cache_capacity = capacity;
        self
    }

    /// Set the leaf limit of a single layout.
    #[must_use]
    pub fn with_max_leaves(mut self, max_leaves: usize) -> Self {
        self.max_leaves = max_leaves;
        self
    }

    /// Check limits.
    pub fn validate(&self) -> Result<()> {
        if !is_valid_alignment(self.default_alignment) {
            return Err(Error::InvalidConfig(format!(
                "default_alignment {} is not a power of two <= {}",
                self.default_alignment, MAX_ALIGNMENT
            )));
        }
        if self.layout_cache_capacity == 0 {
            return Err(Error::InvalidConfig(
                "layout_cache_capacity must be > 0".into(),
            ));
        }
        if self.max_leaves == 0 {
            return Err(Error::InvalidConfig("max_leaves must be > 0".into()));
        }
        Ok(())
    }
}

/// Power of two within [`MAX_ALIGNMENT`].
pub(crate) fn is_valid_alignment(alignment: usize) -> bool {
    alignment.is_power_of_two() && alignment <= MAX_ALIGNMENT
}
