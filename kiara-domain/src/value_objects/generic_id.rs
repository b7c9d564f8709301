// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Generic ID Value Object
//!
//! A type-safe, ULID-backed id with a phantom category marker, so
//! `ValueId`, `StepId` and friends cannot be confused with each other at
//! compile time even though they share one representation. ULIDs sort
//! lexicographically by creation time, which keeps value and step ids
//! naturally ordered in logs and archive listings.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;
use ulid::Ulid;

use crate::KiaraError;

/// Per-category validation hook. Every concrete id type (`ValueId`,
/// `StepId`, ...) implements this with its own category name.
pub trait IdCategory {
    fn category_name() -> &'static str;

    fn validate_id(ulid: &Ulid) -> Result<(), KiaraError> {
        if *ulid == Ulid::nil() {
            return Err(KiaraError::InvalidManifestConfig(format!(
                "{} id cannot be nil",
                Self::category_name()
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
pub struct GenericId<T: IdCategory> {
    value: Ulid,
    _phantom: std::marker::PhantomData<T>,
}

impl<T: IdCategory> std::hash::Hash for GenericId<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

// Serialize/deserialize as a plain ULID string, not `{value: "...", _phantom: null}`.
impl<T: IdCategory> Serialize for GenericId<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.value.to_string().serialize(serializer)
    }
}

impl<'de, T: IdCategory> Deserialize<'de> for GenericId<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let ulid = Ulid::from_string(&s).map_err(|e| serde::de::Error::custom(e.to_string()))?;
        Ok(Self { value: ulid, _phantom: std::marker::PhantomData })
    }
}

impl<T: IdCategory> GenericId<T> {
    pub fn new() -> Self {
        Self { value: Ulid::new(), _phantom: std::marker::PhantomData }
    }

    pub fn from_ulid(ulid: Ulid) -> Result<Self, KiaraError> {
        T::validate_id(&ulid)?;
        Ok(Self { value: ulid, _phantom: std::marker::PhantomData })
    }

    pub fn from_string(s: &str) -> Result<Self, KiaraError> {
        let ulid =
            Ulid::from_str(s).map_err(|e| KiaraError::InvalidManifestConfig(format!("invalid id format: {}", e)))?;
        Self::from_ulid(ulid)
    }

    pub fn as_ulid(&self) -> Ulid {
        self.value
    }

    pub fn timestamp_ms(&self) -> u64 {
        self.value.timestamp_ms()
    }

    pub fn category(&self) -> &'static str {
        T::category_name()
    }

    #[cfg(test)]
    pub fn nil() -> Self {
        Self { value: Ulid(0), _phantom: std::marker::PhantomData }
    }
}

impl<T: IdCategory> Default for GenericId<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: IdCategory> Display for GenericId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}
