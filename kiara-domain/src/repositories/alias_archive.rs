// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Alias archive port
//!
//! Storage contract for human-readable name -> `ValueId` bindings (§3, §6).
//! Aliases let callers refer to a value by a stable name instead of its
//! ULID; rebinding an existing alias is a conflict unless the caller
//! explicitly overwrites.

use async_trait::async_trait;

use crate::error::KiaraError;
use crate::value_objects::ValueId;

#[async_trait]
pub trait AliasArchive: Send + Sync {
    async fn set_alias(&self, alias: &str, value_id: ValueId, overwrite: bool) -> Result<(), KiaraError>;

    async fn resolve_alias(&self, alias: &str) -> Result<ValueId, KiaraError>;

    async fn remove_alias(&self, alias: &str) -> Result<(), KiaraError>;

    async fn list_aliases(&self) -> Result<Vec<String>, KiaraError>;

    /// Every alias currently bound to `value_id`, in no particular order.
    async fn reverse_lookup(&self, value_id: ValueId) -> Result<Vec<String>, KiaraError>;
}
