// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Value entity
//!
//! The central artifact of the value graph (§3): a `ValueId` identity, a
//! `ValueSchema`, a `ValueStatus`, and -- once the status has data -- a
//! `value_hash`, `value_size` and `ValuePedigree`. A `Value` is frozen once
//! `is_persisted` flips true: the archive owns the data from that point on,
//! so any later field mutation is a caller bug rather than a recoverable
//! error (invariant, §3).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::KiaraError;
use crate::value_objects::{Digest, ValueId, ValuePedigree, ValueSchema, ValueSize, ValueStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Value {
    value_id: ValueId,
    schema: ValueSchema,
    status: ValueStatus,
    value_hash: Option<Digest>,
    value_size: Option<ValueSize>,
    pedigree: ValuePedigree,
    /// The output field name on the producing module this value came from,
    /// `None` for orphan (externally supplied) values.
    pedigree_output_name: Option<String>,
    /// Forward links, by field path, to values whose schema marks them
    /// "property of" this one (e.g. a table's column values), mirrored from
    /// kiara's `Value.property_links`.
    property_links: BTreeMap<String, ValueId>,
    /// Backward links recording which later values this one helped destine
    /// (kiara's `Value.destiny_backlinks`), keyed by the destined value and
    /// naming the field path it was consumed as; populated once a
    /// downstream job consumes this value as an input.
    destiny_backlinks: BTreeMap<ValueId, String>,
    is_persisted: bool,
}

impl Value {
    pub fn new_not_set(schema: ValueSchema) -> Self {
        Self {
            value_id: ValueId::new(),
            schema,
            status: ValueStatus::NotSet,
            value_hash: None,
            value_size: None,
            pedigree: ValuePedigree::orphan("unset"),
            pedigree_output_name: None,
            property_links: BTreeMap::new(),
            destiny_backlinks: BTreeMap::new(),
            is_persisted: false,
        }
    }

    pub fn new_orphan(
        schema: ValueSchema,
        kiara_id: impl Into<String>,
        value_hash: Digest,
        value_size: ValueSize,
    ) -> Self {
        Self {
            value_id: ValueId::new(),
            schema,
            status: ValueStatus::Set,
            value_hash: Some(value_hash),
            value_size: Some(value_size),
            pedigree: ValuePedigree::orphan(kiara_id),
            pedigree_output_name: None,
            property_links: BTreeMap::new(),
            destiny_backlinks: BTreeMap::new(),
            is_persisted: false,
        }
    }

    pub fn new_computed(
        schema: ValueSchema,
        status: ValueStatus,
        value_hash: Option<Digest>,
        value_size: Option<ValueSize>,
        pedigree: ValuePedigree,
        pedigree_output_name: impl Into<String>,
    ) -> Self {
        Self {
            value_id: ValueId::new(),
            schema,
            status,
            value_hash,
            value_size,
            pedigree,
            pedigree_output_name: Some(pedigree_output_name.into()),
            property_links: BTreeMap::new(),
            destiny_backlinks: BTreeMap::new(),
            is_persisted: false,
        }
    }

    pub fn value_id(&self) -> ValueId {
        self.value_id
    }

    pub fn schema(&self) -> &ValueSchema {
        &self.schema
    }

    pub fn status(&self) -> ValueStatus {
        self.status
    }

    pub fn value_hash(&self) -> Option<Digest> {
        self.value_hash
    }

    pub fn value_size(&self) -> Option<ValueSize> {
        self.value_size
    }

    pub fn pedigree(&self) -> &ValuePedigree {
        &self.pedigree
    }

    pub fn pedigree_output_name(&self) -> Option<&str> {
        self.pedigree_output_name.as_deref()
    }

    pub fn is_persisted(&self) -> bool {
        self.is_persisted
    }

    pub fn property_links(&self) -> &BTreeMap<String, ValueId> {
        &self.property_links
    }

    pub fn property_link(&self, path: &str) -> Option<ValueId> {
        self.property_links.get(path).copied()
    }

    pub fn add_property_link(&mut self, path: impl Into<String>, value_id: ValueId) -> Result<(), KiaraError> {
        self.reject_if_persisted()?;
        self.property_links.insert(path.into(), value_id);
        Ok(())
    }

    pub fn destiny_backlinks(&self) -> &BTreeMap<ValueId, String> {
        &self.destiny_backlinks
    }

    pub fn add_destiny_backlink(&mut self, value_id: ValueId, path: impl Into<String>) {
        // Recording that a later job consumed this value does not mutate
        // the value's own data, so it is allowed even after persistence.
        self.destiny_backlinks.insert(value_id, path.into());
    }

    /// Marks the value persisted, after which `value_hash`/`value_size`/
    /// `status` can never change again.
    pub fn mark_persisted(&mut self) -> Result<(), KiaraError> {
        if !self.status.has_data() && self.status != ValueStatus::None {
            return Err(KiaraError::internal_error(format!(
                "cannot persist value {} with status {:?} and no data",
                self.value_id, self.status
            )));
        }
        self.is_persisted = true;
        Ok(())
    }

    fn reject_if_persisted(&self) -> Result<(), KiaraError> {
        if self.is_persisted {
            return Err(KiaraError::internal_error(format!(
                "value {} is already persisted and cannot be mutated",
                self.value_id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::canonical_hash;

    #[test]
    fn not_set_values_have_no_data() {
        let v = Value::new_not_set(ValueSchema::new("integer"));
        assert!(!v.status().has_data());
        assert!(v.value_hash().is_none());
    }

    #[test]
    fn persisted_values_reject_further_mutation() {
        let mut v = Value::new_orphan(
            ValueSchema::new("integer"),
            "ctx",
            canonical_hash(&5),
            ValueSize::new(8),
        );
        v.mark_persisted().unwrap();
        assert!(v.add_property_link("col", ValueId::new()).is_err());
    }

    #[test]
    fn mark_persisted_rejects_unset_values() {
        let mut v = Value::new_not_set(ValueSchema::new("integer"));
        assert!(v.mark_persisted().is_err());
    }
}
