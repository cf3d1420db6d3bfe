// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `DataDefinition`: owner of the struct/enum types of one schema.

use crate::config::DefinitionConfig;
use crate::dd::{ByteOrder, EnumType, ScalarKind, StructType, TypeRef};
use crate::error::{Error, Result};
use crate::layout::{self, LayoutCache, Representation, StructLayout};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Arc;

/// What a [`TypeRef`] resolves to inside a definition.
#[derive(Debug, Clone, Copy)]
pub enum ResolvedType<'a> {
    Scalar(ScalarKind),
    Struct(&'a Arc<StructType>),
    Enum(&'a Arc<EnumType>),
}

/// How [`DataDefinition::remove_type`] treats types that still reference the removed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemoveMode {
    /// Fail with `DanglingReference` while references exist.
    #[default]
    Strict,
    /// Also remove every struct that (transitively) references the type.
    Cascade,
}

/// In-memory schema: structs, enums, configuration and the derived layout cache.
///
/// Mutations take `&mut self`; layout lookups take `&self` and may run
/// concurrently.
#[derive(Debug)]
pub struct DataDefinition {
    config: DefinitionConfig,
    structs: BTreeMap<String, Arc<StructType>>,
    enums: BTreeMap<String, Arc<EnumType>>,
    layouts: LayoutCache,
}

impl Default for DataDefinition {
    fn default() -> Self {
        Self::new()
    }
}

impl DataDefinition {
    /// Empty definition with the default configuration.
    pub fn new() -> Self {
        let config = DefinitionConfig::default();
        Self {
            layouts: LayoutCache::new(config.layout_cache_capacity),
            config,
            structs: BTreeMap::new(),
            enums: BTreeMap::new(),
        }
    }

    /// Empty definition with a custom configuration.
    pub fn with_config(config: DefinitionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            layouts: LayoutCache::new(config.layout_cache_capacity),
            config,
            structs: BTreeMap::new(),
            enums: BTreeMap::new(),
        })
    }

    pub fn config(&self) -> &DefinitionConfig {
        &self.config
    }

    /// Replace the configuration; drops every cached layout.
    pub fn set_config(&mut self, config: DefinitionConfig) -> Result<()> {
        config.validate()?;
        if config.layout_cache_capacity != self.config.layout_cache_capacity {
            self.layouts = LayoutCache::new(config.layout_cache_capacity);
        } else {
            self.layouts.clear();
        }
        self.config = config;
        Ok(())
    }

    /// Default serialized byte order.
    pub fn byte_order(&self) -> ByteOrder {
        self.config.byte_order
    }

    pub fn set_byte_order(&mut self, byte_order: ByteOrder) {
        if self.config.byte_order != byte_order {
            self.config.byte_order = byte_order;
            self.layouts.clear();
        }
    }

    fn name_taken(&self, name: &str) -> bool {
        self.structs.contains_key(name)
            || self.enums.contains_key(name)
            || ScalarKind::from_name(name).is_some()
    }

    /// Add a struct. Forward references are accepted; see [`validate`](Self::validate).
    pub fn add_struct(&mut self, struct_type: StructType) -> Result<()> {
        if self.name_taken(&struct_type.name) {
            return Err(Error::DuplicateName(struct_type.name));
        }
        let name = struct_type.name.clone();
        self.structs.insert(name.clone(), Arc::new(struct_type));
        self.invalidate_from(&name);
        log::debug!("[DataDefinition::add_struct] added '{}'", name);
        Ok(())
    }

    /// Add an enum.
    pub fn add_enum(&mut self, enum_type: EnumType) -> Result<()> {
        if self.name_taken(&enum_type.name) {
            return Err(Error::DuplicateName(enum_type.name));
        }
        let name = enum_type.name.clone();
        self.enums.insert(name.clone(), Arc::new(enum_type));
        self.invalidate_from(&name);
        log::debug!("[DataDefinition::add_enum] added '{}'", name);
        Ok(())
    }

    pub fn get_struct(&self, name: &str) -> Option<&Arc<StructType>> {
        self.structs.get(name)
    }

    pub fn get_enum(&self, name: &str) -> Option<&Arc<EnumType>> {
        self.enums.get(name)
    }

    /// Iterate structs in name order.
    pub fn structs(&self) -> impl Iterator<Item = &Arc<StructType>> {
        self.structs.values()
    }

    /// Iterate enums in name order.
    pub fn enums(&self) -> impl Iterator<Item = &Arc<EnumType>> {
        self.enums.values()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.structs.contains_key(name) || self.enums.contains_key(name)
    }

    /// Resolve a type reference.
    pub fn resolve(&self, type_ref: &TypeRef) -> Option<ResolvedType<'_>> {
        match type_ref {
            TypeRef::Scalar(kind) => Some(ResolvedType::Scalar(*kind)),
            TypeRef::Named(name) => {
                if let Some(kind) = ScalarKind::from_name(name) {
                    return Some(ResolvedType::Scalar(kind));
                }
                self.structs
                    .get(name)
                    .map(ResolvedType::Struct)
                    .or_else(|| self.enums.get(name).map(ResolvedType::Enum))
            }
        }
    }

    /// Mutate a struct in place. Renaming is allowed if the new name is free.
    pub fn modify_struct<F>(&mut self, name: &str, f: F) -> Result<()>
    where
        F: FnOnce(&mut StructType),
    {
        let current = self
            .structs
            .get(name)
            .ok_or_else(|| Error::UnknownType(name.to_string()))?;
        let mut updated = StructType::clone(current);
        f(&mut updated);
        if updated.name != name && self.name_taken(&updated.name) {
            return Err(Error::DuplicateName(updated.name));
        }

        self.invalidate_from(name);
        self.structs.remove(name);
        let new_name = updated.name.clone();
        self.structs.insert(new_name.clone(), Arc::new(updated));
        self.invalidate_from(&new_name);
        log::debug!("[DataDefinition::modify_struct] updated '{}'", new_name);
        Ok(())
    }

    /// Replace the struct carrying the same name.
    pub fn replace_struct(&mut self, struct_type: StructType) -> Result<()> {
        let name = struct_type.name.clone();
        self.modify_struct(&name, move |s| *s = struct_type)
    }

    /// Structs that reference `name` directly.
    fn direct_dependents(&self, name: &str) -> Vec<String> {
        self.structs
            .values()
            .filter(|s| s.name != name && s.references(name))
            .map(|s| s.name.clone())
            .collect()
    }

    /// Structs that reference `name` directly or through other structs.
    pub fn dependents_of(&self, name: &str) -> BTreeSet<String> {
        let mut found = BTreeSet::new();
        let mut queue = VecDeque::from([name.to_string()]);
        while let Some(current) = queue.pop_front() {
            for dependent in self.direct_dependents(&current) {
                if dependent != name && found.insert(dependent.clone()) {
                    queue.push_back(dependent);
                }
            }
        }
        found
    }

    /// Remove a struct or enum. Returns the names actually removed.
    pub fn remove_type(&mut self, name: &str, mode: RemoveMode) -> Result<Vec<String>> {
        if !self.contains(name) {
            return Err(Error::UnknownType(name.to_string()));
        }

        let dependents = self.dependents_of(name);
        if mode == RemoveMode::Strict {
            if let Some(referenced_by) = self.direct_dependents(name).into_iter().next() {
                return Err(Error::DanglingReference {
                    name: name.to_string(),
                    referenced_by,
                });
            }
        }

        self.invalidate_from(name);
        let mut removed = vec![name.to_string()];
        self.structs.remove(name);
        self.enums.remove(name);
        if mode == RemoveMode::Cascade {
            for dependent in dependents {
                self.structs.remove(&dependent);
                removed.push(dependent);
            }
        }
        log::debug!("[DataDefinition::remove_type] removed {:?}", removed);
        Ok(removed)
    }

    /// Layout of a struct, computed on first use and cached.
    pub fn layout(&self, name: &str, representation: Representation) -> Result<Arc<StructLayout>> {
        crate::trace_fn!("DataDefinition::layout");
        if let Some(cached) = self.layouts.get(name, representation) {
            return Ok(cached);
        }
        let struct_type = self
            .structs
            .get(name)
            .ok_or_else(|| Error::UnknownType(name.to_string()))?;
        let computed = Arc::new(layout::compute_layout(self, struct_type, representation)?);
        self.layouts
            .insert(name, representation, Arc::clone(&computed));
        Ok(computed)
    }

    pub(crate) fn layout_cache(&self) -> &LayoutCache {
        &self.layouts
    }

    /// Cache statistics (hits, misses, entries).
    pub fn layout_cache_stats(&self) -> layout::CacheStats {
        self.layouts.stats()
    }

    fn invalidate_from(&self, name: &str) {
        let mut names = self.dependents_of(name);
        names.insert(name.to_string());
        self.layouts.invalidate(names.iter().map(String::as_str));
    }
}
