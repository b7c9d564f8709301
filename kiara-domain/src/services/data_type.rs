// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Data type service
//!
//! Contract every registered value type implements (§3, §4.2): serialize a
//! Rust value to bytes, hash and size those bytes, and validate a
//! `type_config` before it is used in a `ValueSchema`. Implementations live
//! in `kiara-core`'s data type registry; this trait is what the domain's
//! `Value`/`ValueSchema` machinery is written against.

use serde_json::Value as Json;

use crate::error::KiaraError;
use crate::value_objects::{Digest, ValueSize};

pub trait DataType: Send + Sync {
    fn type_name(&self) -> &'static str;

    /// Validates a `type_config` map before it is accepted into a
    /// `ValueSchema` (e.g. a `list` type might require an `item_type` key).
    fn validate_type_config(&self, type_config: &crate::value_objects::TypeConfig) -> Result<(), KiaraError>;

    /// Validates that `data` conforms to this type under `type_config`
    /// (§3's "is_valid" rule), independent of hashing/serialization.
    fn is_valid(&self, data: &Json, type_config: &crate::value_objects::TypeConfig) -> Result<(), KiaraError>;

    fn serialize(&self, data: &Json) -> Result<Vec<u8>, KiaraError>;

    fn deserialize(&self, bytes: &[u8]) -> Result<Json, KiaraError>;

    /// `value_hash = hash(schema_hash, canonical(serialized data))` is
    /// assembled by the caller; this just hashes the type's own serialized
    /// bytes (§3).
    fn hash(&self, bytes: &[u8]) -> Digest {
        crate::value_objects::hash_bytes(bytes)
    }

    fn size(&self, bytes: &[u8]) -> ValueSize {
        ValueSize::new(bytes.len() as u64)
    }
}
