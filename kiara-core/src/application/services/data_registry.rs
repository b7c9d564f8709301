// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Data registry
//!
//! The application-layer service that turns raw JSON data plus a
//! `ValueSchema` into a registered `Value` (§3): validates and hashes the
//! data through the `DataTypeRegistry`, stores the payload and value
//! metadata in the `DataArchive`, and hands back the `ValueId` callers use
//! from then on. This is where "two values with the same hash can have
//! different ids" (invariant 1) actually plays out: calling `register`
//! twice on identical data always mints a fresh `ValueId` unless
//! `reuse_existing` is set, in which case an existing value with the same
//! `(schema_hash, value_hash)` is returned instead of writing a duplicate.
//!
//! Also implements `PayloadStore` (§4.6): a module process reads an input's
//! bytes and writes an output's bytes through this same registry, so the
//! job registry can hand it straight to `ModuleExecutor::execute` as the
//! one place that knows how to turn schema + JSON into validated, hashed,
//! archived bytes.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value as Json;

use kiara_domain::entities::Value;
use kiara_domain::value_objects::{combine, Digest, ValueId, ValueSchema};
use kiara_domain::{DataArchive, KiaraError, PayloadStore};

use super::data_type_registry::DataTypeRegistry;
use crate::infrastructure::metrics::MetricsService;

pub struct DataRegistry {
    data_types: DataTypeRegistry,
    archive: Arc<dyn DataArchive>,
    metrics: Option<Arc<MetricsService>>,
    /// A process-local cache from the combined `(schema_hash, value_hash)`
    /// digest to a known `ValueId`, consulted before falling back to the
    /// archive's own `find_by_hash` so a hot dedup path doesn't always pay
    /// for a round trip.
    hash_index: parking_lot::RwLock<HashMap<Digest, ValueId>>,
}

impl DataRegistry {
    pub fn new(data_types: DataTypeRegistry, archive: Arc<dyn DataArchive>) -> Self {
        Self { data_types, archive, metrics: None, hash_index: parking_lot::RwLock::new(HashMap::new()) }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsService>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub async fn register_orphan(
        &self,
        kiara_id: &str,
        schema: ValueSchema,
        data: &Json,
        reuse_existing: bool,
    ) -> Result<ValueId, KiaraError> {
        let (bytes, value_hash, value_size) = self.data_types.prepare(&schema.type_name, &schema.type_config, data)?;
        let schema_hash = schema.schema_hash();
        let combined = combine(&[&schema_hash, &value_hash]);

        if reuse_existing {
            if let Some(existing) = self.lookup_by_hash(combined, schema_hash, value_hash).await? {
                return Ok(existing);
            }
        }

        let value = Value::new_orphan(schema, kiara_id, value_hash, value_size);
        let value_id = value.value_id();

        self.archive.store_payload(value_hash, bytes).await?;
        self.archive.store_value(value).await?;
        self.hash_index.write().insert(combined, value_id);

        if let Some(metrics) = &self.metrics {
            metrics.record_value_registered();
        }

        Ok(value_id)
    }

    async fn lookup_by_hash(
        &self,
        combined: Digest,
        schema_hash: Digest,
        value_hash: Digest,
    ) -> Result<Option<ValueId>, KiaraError> {
        if let Some(existing) = self.hash_index.read().get(&combined).copied() {
            return Ok(Some(existing));
        }
        let found = self.archive.find_by_hash(schema_hash, value_hash).await?;
        if let Some(value_id) = found {
            self.hash_index.write().insert(combined, value_id);
        }
        Ok(found)
    }

    pub async fn get_value(&self, value_id: ValueId) -> Result<Value, KiaraError> {
        self.archive.load_value(value_id).await
    }

    /// Loads a value's payload and decodes it back into JSON through the
    /// type registered for its schema.
    pub async fn get_data(&self, value_id: ValueId) -> Result<Json, KiaraError> {
        let value = self.archive.load_value(value_id).await?;
        self.read(&value).await
    }

    pub fn data_types(&self) -> &DataTypeRegistry {
        &self.data_types
    }

    /// Every value id any registered archive still holds metadata for
    /// (§4.7's `retrieve_all_available_value_ids`).
    pub async fn retrieve_all_available_value_ids(&self) -> Result<Vec<ValueId>, KiaraError> {
        self.archive.list_value_ids().await
    }

    /// The value ids that consumed `value_id` as an input, together with
    /// the field path each was bound to, per that downstream value's own
    /// `destiny_backlinks` record (§4.7).
    pub async fn find_destinies_for_value(&self, value_id: ValueId) -> Result<BTreeMap<ValueId, String>, KiaraError> {
        let value = self.archive.load_value(value_id).await?;
        Ok(value.destiny_backlinks().clone())
    }
}

#[async_trait]
impl PayloadStore for DataRegistry {
    async fn read(&self, value: &Value) -> Result<Json, KiaraError> {
        let value_hash = value
            .value_hash()
            .ok_or_else(|| KiaraError::ValueNotFound(format!("value {} has no data", value.value_id())))?;
        let bytes = self.archive.load_payload(value_hash).await?;
        self.data_types.decode(&value.schema().type_name, &bytes)
    }

    async fn write(&self, schema: &ValueSchema, data: &Json) -> Result<(Digest, kiara_domain::value_objects::ValueSize), KiaraError> {
        let (bytes, value_hash, value_size) = self.data_types.prepare(&schema.type_name, &schema.type_config, data)?;
        self.archive.store_payload(value_hash, bytes).await?;
        Ok((value_hash, value_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::IntegerType;
    use crate::infrastructure::archives::MemoryArchive;

    fn registry() -> DataRegistry {
        let mut data_types = DataTypeRegistry::new();
        data_types.register(Arc::new(IntegerType));
        DataRegistry::new(data_types, Arc::new(MemoryArchive::new()))
    }

    #[tokio::test]
    async fn registering_the_same_data_twice_mints_distinct_ids_by_default() {
        let registry = registry();
        let a = registry.register_orphan("ctx", ValueSchema::new("integer"), &Json::from(5), false).await.unwrap();
        let b = registry.register_orphan("ctx", ValueSchema::new("integer"), &Json::from(5), false).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn reuse_existing_returns_the_same_id_for_identical_data() {
        let registry = registry();
        let a = registry.register_orphan("ctx", ValueSchema::new("integer"), &Json::from(5), true).await.unwrap();
        let b = registry.register_orphan("ctx", ValueSchema::new("integer"), &Json::from(5), true).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn reuse_existing_distinguishes_by_schema_not_just_bytes() {
        let mut data_types = DataTypeRegistry::new();
        data_types.register(Arc::new(IntegerType));
        data_types.register(Arc::new(crate::infrastructure::adapters::FloatType));
        let registry = DataRegistry::new(data_types, Arc::new(MemoryArchive::new()));

        let as_int = registry.register_orphan("ctx", ValueSchema::new("integer"), &Json::from(5), true).await.unwrap();
        let as_float = registry.register_orphan("ctx", ValueSchema::new("float"), &Json::from(5.0), true).await.unwrap();
        assert_ne!(as_int, as_float);
    }

    #[tokio::test]
    async fn get_data_round_trips_through_the_archive() {
        let registry = registry();
        let id = registry.register_orphan("ctx", ValueSchema::new("integer"), &Json::from(42), false).await.unwrap();
        let data = registry.get_data(id).await.unwrap();
        assert_eq!(data, Json::from(42));
    }

    #[tokio::test]
    async fn payload_store_write_then_read_round_trips() {
        let registry = registry();
        let schema = ValueSchema::new("integer");
        let (value_hash, value_size) = registry.write(&schema, &Json::from(14)).await.unwrap();
        let value = Value::new_orphan(schema, "ctx", value_hash, value_size);
        assert_eq!(registry.read(&value).await.unwrap(), Json::from(14));
    }

    #[tokio::test]
    async fn retrieve_all_available_value_ids_lists_every_registered_value() {
        let registry = registry();
        let a = registry.register_orphan("ctx", ValueSchema::new("integer"), &Json::from(1), false).await.unwrap();
        let b = registry.register_orphan("ctx", ValueSchema::new("integer"), &Json::from(2), false).await.unwrap();
        let ids = registry.retrieve_all_available_value_ids().await.unwrap();
        assert!(ids.contains(&a));
        assert!(ids.contains(&b));
    }
}
