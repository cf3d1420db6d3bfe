// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Tool configuration (TOML).
//!
//! ```toml
//! log_level = "debug"
//!
//! [definition]
//! byte_order = "big_endian"
//! default_alignment = 4
//! layout_cache_capacity = 64
//! max_leaves = 1048576
//! ```

use ddl::DefinitionConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectConfig {
    /// Log level used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Settings applied to every loaded description.
    #[serde(default)]
    pub definition: DefinitionConfig,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            definition: DefinitionConfig::default(),
        }
    }
}

impl InspectConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read config '{}': {}", path.display(), e))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.definition.validate()?;
        Ok(config)
    }
}
