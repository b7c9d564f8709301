// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Data archive port
//!
//! Storage contract for `Value` payloads and metadata (§6). Domain code
//! depends only on this trait; `kiara-core` provides the in-memory and
//! SQLite implementations. Kept async-first and `Send + Sync` so it can
//! back a shared, concurrently-accessed context (§7).

use async_trait::async_trait;

use crate::entities::Value;
use crate::error::KiaraError;
use crate::value_objects::{Digest, ValueId};

#[async_trait]
pub trait DataArchive: Send + Sync {
    /// Persists a value's metadata under its id, marking it persisted.
    /// Idempotent: storing the same `value_id` twice with identical
    /// metadata is a no-op success.
    async fn store_value(&self, value: Value) -> Result<(), KiaraError>;

    async fn load_value(&self, value_id: ValueId) -> Result<Value, KiaraError>;

    async fn has_value(&self, value_id: ValueId) -> Result<bool, KiaraError>;

    /// Stores the raw serialized payload bytes for a value, addressed by
    /// its `value_hash` so identical payloads across different `value_id`s
    /// are stored once (§3's hash/id separation).
    async fn store_payload(&self, value_hash: Digest, bytes: Vec<u8>) -> Result<(), KiaraError>;

    async fn load_payload(&self, value_hash: Digest) -> Result<Vec<u8>, KiaraError>;

    async fn has_payload(&self, value_hash: Digest) -> Result<bool, KiaraError>;

    /// Every value id this archive currently holds metadata for.
    async fn list_value_ids(&self) -> Result<Vec<ValueId>, KiaraError>;

    /// Looks up a stored value by the composite `(schema_hash, value_hash)`
    /// key (invariant 3): two values with the same bytes under different
    /// schemas are distinct, so the index can't be keyed by `value_hash`
    /// alone.
    async fn find_by_hash(&self, schema_hash: Digest, value_hash: Digest) -> Result<Option<ValueId>, KiaraError>;

    /// Reads back an archive-level key/value entry (e.g. a schema version
    /// marker), distinct from any individual value's own metadata.
    async fn get_archive_metadata(&self, key: &str) -> Result<Option<String>, KiaraError>;

    async fn set_archive_metadata(&self, key: &str, value: &str) -> Result<(), KiaraError>;
}
