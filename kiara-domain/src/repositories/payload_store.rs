// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Payload store port
//!
//! The payload half of `DataArchive` (§3, §4): a `Value` carries only
//! schema/hash/size metadata, so a module that actually wants to look at or
//! produce data needs a way to move between a `Value`'s hash and its decoded
//! JSON. Kept separate from `DataArchive` because a module only ever needs
//! this narrower surface -- raw value/alias/job storage stays an
//! infrastructure concern the module layer never touches directly.

use async_trait::async_trait;
use serde_json::Value as Json;

use crate::entities::Value;
use crate::error::KiaraError;
use crate::value_objects::{Digest, ValueSchema, ValueSize};

#[async_trait]
pub trait PayloadStore: Send + Sync {
    /// Decodes `value`'s stored payload back into JSON through the data type
    /// named by its schema. Fails if the value has no data (`value_hash` is
    /// `None`) or its payload was never written.
    async fn read(&self, value: &Value) -> Result<Json, KiaraError>;

    /// Validates `data` against `schema`, serializes and stores it, and
    /// returns the `(value_hash, value_size)` pair the caller needs to build
    /// the `Value` that now owns this data.
    async fn write(&self, schema: &ValueSchema, data: &Json) -> Result<(Digest, ValueSize), KiaraError>;
}
