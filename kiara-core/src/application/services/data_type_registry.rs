// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Data type registry
//!
//! Holds every registered `DataType` by name. `ValueSchema::type_name` is
//! only meaningful relative to a registry: building a `Value` from raw
//! JSON data looks up the schema's type here to validate, hash and size the
//! payload (§3, §4.2).

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value as Json;

use kiara_domain::services::DataType;
use kiara_domain::value_objects::{Digest, TypeConfig, ValueSize};
use kiara_domain::KiaraError;

#[derive(Clone, Default)]
pub struct DataTypeRegistry {
    types: HashMap<String, Arc<dyn DataType>>,
}

impl DataTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, data_type: Arc<dyn DataType>) {
        self.types.insert(data_type.type_name().to_string(), data_type);
    }

    pub fn get(&self, type_name: &str) -> Result<Arc<dyn DataType>, KiaraError> {
        self.types
            .get(type_name)
            .cloned()
            .ok_or_else(|| KiaraError::UnknownDataType(type_name.to_string()))
    }

    pub fn registered_types(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(|s| s.as_str())
    }

    /// Validates `data` against `type_name`/`type_config` and returns the
    /// `(bytes, value_hash, value_size)` triple a `Value` needs at
    /// construction time.
    pub fn prepare(
        &self,
        type_name: &str,
        type_config: &TypeConfig,
        data: &Json,
    ) -> Result<(Vec<u8>, Digest, ValueSize), KiaraError> {
        let data_type = self.get(type_name)?;
        data_type.validate_type_config(type_config)?;
        data_type.is_valid(data, type_config)?;
        let bytes = data_type.serialize(data)?;
        let hash = data_type.hash(&bytes);
        let size = data_type.size(&bytes);
        Ok((bytes, hash, size))
    }

    pub fn decode(&self, type_name: &str, bytes: &[u8]) -> Result<Json, KiaraError> {
        self.get(type_name)?.deserialize(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::IntegerType;

    #[test]
    fn unregistered_type_name_is_an_error() {
        let registry = DataTypeRegistry::new();
        assert!(registry.get("integer").is_err());
    }

    #[test]
    fn prepare_validates_and_hashes_data() {
        let mut registry = DataTypeRegistry::new();
        registry.register(Arc::new(IntegerType));
        let (_, hash_a, _) = registry.prepare("integer", &TypeConfig::new(), &Json::from(5)).unwrap();
        let (_, hash_b, _) = registry.prepare("integer", &TypeConfig::new(), &Json::from(5)).unwrap();
        assert_eq!(hash_a, hash_b);
        assert!(registry.prepare("integer", &TypeConfig::new(), &Json::from("nope")).is_err());
    }
}
