// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Value identifier
//!
//! `ValueId` is the opaque, ULID-backed identity assigned to a `Value` when
//! it is registered. It is stable across a context (§3) and independent of
//! `value_hash` (invariant 1): two values with the same schema/data hash can
//! still carry different ids if registered without `reuse_existing`.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

use super::generic_id::{GenericId, IdCategory};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct ValueId(GenericId<ValueMarker>);

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
struct ValueMarker;

impl IdCategory for ValueMarker {
    fn category_name() -> &'static str {
        "value"
    }
}

impl ValueId {
    pub fn new() -> Self {
        Self(GenericId::new())
    }

    pub fn from_string(s: &str) -> Result<Self, crate::KiaraError> {
        Ok(Self(GenericId::from_string(s)?))
    }

    pub fn timestamp_ms(&self) -> u64 {
        self.0.timestamp_ms()
    }
}

impl Default for ValueId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `JobId`s are assigned the same way value ids are: time-ordered and
/// process-unique, scoped to a single `JobRegistry`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct JobId(GenericId<JobMarker>);

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
struct JobMarker;

impl IdCategory for JobMarker {
    fn category_name() -> &'static str {
        "job"
    }
}

impl JobId {
    pub fn new() -> Self {
        Self(GenericId::new())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
