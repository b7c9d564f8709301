// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Alias registry
//!
//! A thin application-layer wrapper over `AliasArchive` (§3, §6): mostly
//! pass-through, but centralizes the "alias must resolve to a value that
//! actually exists" check so a dangling alias can never be handed back to a
//! caller.

use std::sync::Arc;

use kiara_domain::value_objects::ValueId;
use kiara_domain::{AliasArchive, DataArchive, KiaraError};

pub struct AliasRegistry {
    aliases: Arc<dyn AliasArchive>,
    data: Arc<dyn DataArchive>,
}

impl AliasRegistry {
    pub fn new(aliases: Arc<dyn AliasArchive>, data: Arc<dyn DataArchive>) -> Self {
        Self { aliases, data }
    }

    pub async fn bind(&self, alias: &str, value_id: ValueId, overwrite: bool) -> Result<(), KiaraError> {
        if !self.data.has_value(value_id).await? {
            return Err(KiaraError::ValueNotFound(value_id.to_string()));
        }
        self.aliases.set_alias(alias, value_id, overwrite).await
    }

    pub async fn resolve(&self, alias: &str) -> Result<ValueId, KiaraError> {
        self.aliases.resolve_alias(alias).await
    }

    pub async fn unbind(&self, alias: &str) -> Result<(), KiaraError> {
        self.aliases.remove_alias(alias).await
    }

    pub async fn list(&self) -> Result<Vec<String>, KiaraError> {
        self.aliases.list_aliases().await
    }

    /// Every alias currently bound to `value_id` (§4.7).
    pub async fn find_aliases_for_value_id(&self, value_id: ValueId) -> Result<Vec<String>, KiaraError> {
        self.aliases.reverse_lookup(value_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::archives::MemoryArchive;
    use kiara_domain::{canonical_hash, entities::Value, value_objects::ValueSchema, value_objects::ValueSize};

    #[tokio::test]
    async fn binding_an_alias_to_a_nonexistent_value_is_rejected() {
        let archive = Arc::new(MemoryArchive::new());
        let registry = AliasRegistry::new(archive.clone(), archive);
        assert!(registry.bind("result", ValueId::new(), false).await.is_err());
    }

    #[tokio::test]
    async fn resolves_a_bound_alias() {
        let archive = Arc::new(MemoryArchive::new());
        let value = Value::new_orphan(ValueSchema::new("integer"), "ctx", canonical_hash(&1), ValueSize::new(8));
        let id = value.value_id();
        archive.store_value(value).await.unwrap();
        let registry = AliasRegistry::new(archive.clone(), archive);
        registry.bind("result", id, false).await.unwrap();
        assert_eq!(registry.resolve("result").await.unwrap(), id);
    }

    #[tokio::test]
    async fn finds_every_alias_bound_to_a_value() {
        let archive = Arc::new(MemoryArchive::new());
        let value = Value::new_orphan(ValueSchema::new("integer"), "ctx", canonical_hash(&1), ValueSize::new(8));
        let id = value.value_id();
        archive.store_value(value).await.unwrap();
        let registry = AliasRegistry::new(archive.clone(), archive);
        registry.bind("result", id, false).await.unwrap();
        registry.bind("latest", id, false).await.unwrap();
        let mut aliases = registry.find_aliases_for_value_id(id).await.unwrap();
        aliases.sort();
        assert_eq!(aliases, vec!["latest".to_string(), "result".to_string()]);
    }
}
