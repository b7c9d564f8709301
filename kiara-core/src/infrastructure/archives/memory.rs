// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # In-memory archive
//!
//! `DataArchive`/`AliasArchive`/`JobArchive` backed by `parking_lot` maps
//! behind an `Arc`. No durability across restarts -- the default backend
//! for tests and single-process use where a `kiara.toml` doesn't name a
//! `sqlite` archive.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use kiara_domain::{
    AliasArchive, DataArchive, Digest, JobArchive, JobId, KiaraError, JobRecord, Value, ValueId,
};

#[derive(Clone, Default)]
pub struct MemoryArchive {
    values: Arc<RwLock<HashMap<ValueId, Value>>>,
    payloads: Arc<RwLock<HashMap<Digest, Vec<u8>>>>,
    aliases: Arc<RwLock<HashMap<String, ValueId>>>,
    jobs: Arc<RwLock<HashMap<JobId, JobRecord>>>,
    jobs_by_inputs_hash: Arc<RwLock<HashMap<Digest, JobId>>>,
    archive_metadata: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DataArchive for MemoryArchive {
    async fn store_value(&self, value: Value) -> Result<(), KiaraError> {
        self.values.write().insert(value.value_id(), value);
        Ok(())
    }

    async fn load_value(&self, value_id: ValueId) -> Result<Value, KiaraError> {
        self.values
            .read()
            .get(&value_id)
            .cloned()
            .ok_or_else(|| KiaraError::ValueNotFound(value_id.to_string()))
    }

    async fn has_value(&self, value_id: ValueId) -> Result<bool, KiaraError> {
        Ok(self.values.read().contains_key(&value_id))
    }

    async fn store_payload(&self, value_hash: Digest, bytes: Vec<u8>) -> Result<(), KiaraError> {
        self.payloads.write().insert(value_hash, bytes);
        Ok(())
    }

    async fn load_payload(&self, value_hash: Digest) -> Result<Vec<u8>, KiaraError> {
        self.payloads
            .read()
            .get(&value_hash)
            .cloned()
            .ok_or_else(|| KiaraError::ValueNotFound(format!("payload {value_hash}")))
    }

    async fn has_payload(&self, value_hash: Digest) -> Result<bool, KiaraError> {
        Ok(self.payloads.read().contains_key(&value_hash))
    }

    async fn list_value_ids(&self) -> Result<Vec<ValueId>, KiaraError> {
        Ok(self.values.read().keys().copied().collect())
    }

    async fn find_by_hash(&self, schema_hash: Digest, value_hash: Digest) -> Result<Option<ValueId>, KiaraError> {
        let values = self.values.read();
        Ok(values
            .values()
            .find(|v| v.schema().schema_hash() == schema_hash && v.value_hash() == Some(value_hash))
            .map(|v| v.value_id()))
    }

    async fn get_archive_metadata(&self, key: &str) -> Result<Option<String>, KiaraError> {
        Ok(self.archive_metadata.read().get(key).cloned())
    }

    async fn set_archive_metadata(&self, key: &str, value: &str) -> Result<(), KiaraError> {
        self.archive_metadata.write().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[async_trait]
impl AliasArchive for MemoryArchive {
    async fn set_alias(&self, alias: &str, value_id: ValueId, overwrite: bool) -> Result<(), KiaraError> {
        let mut aliases = self.aliases.write();
        if !overwrite && aliases.contains_key(alias) {
            return Err(KiaraError::AliasConflict(alias.to_string()));
        }
        aliases.insert(alias.to_string(), value_id);
        Ok(())
    }

    async fn resolve_alias(&self, alias: &str) -> Result<ValueId, KiaraError> {
        self.aliases
            .read()
            .get(alias)
            .copied()
            .ok_or_else(|| KiaraError::AliasNotFound(alias.to_string()))
    }

    async fn remove_alias(&self, alias: &str) -> Result<(), KiaraError> {
        self.aliases
            .write()
            .remove(alias)
            .map(|_| ())
            .ok_or_else(|| KiaraError::AliasNotFound(alias.to_string()))
    }

    async fn list_aliases(&self) -> Result<Vec<String>, KiaraError> {
        Ok(self.aliases.read().keys().cloned().collect())
    }

    async fn reverse_lookup(&self, value_id: ValueId) -> Result<Vec<String>, KiaraError> {
        Ok(self
            .aliases
            .read()
            .iter()
            .filter(|(_, id)| **id == value_id)
            .map(|(alias, _)| alias.clone())
            .collect())
    }
}

#[async_trait]
impl JobArchive for MemoryArchive {
    async fn store_job(&self, record: JobRecord) -> Result<(), KiaraError> {
        let job_id = record.job_id();
        let inputs_hash = record.config().inputs_hash();
        self.jobs.write().insert(job_id, record);
        self.jobs_by_inputs_hash.write().insert(inputs_hash, job_id);
        Ok(())
    }

    async fn load_job(&self, job_id: JobId) -> Result<JobRecord, KiaraError> {
        self.jobs
            .read()
            .get(&job_id)
            .cloned()
            .ok_or_else(|| KiaraError::internal_error(format!("no such job: {job_id}")))
    }

    async fn find_by_inputs_hash(&self, inputs_hash: Digest) -> Result<Option<JobRecord>, KiaraError> {
        let Some(job_id) = self.jobs_by_inputs_hash.read().get(&inputs_hash).copied() else {
            return Ok(None);
        };
        Ok(self.jobs.read().get(&job_id).cloned())
    }
}
