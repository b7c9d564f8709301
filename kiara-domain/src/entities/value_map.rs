// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Value map entity
//!
//! A named collection of `Value`s bound against a `ValueSchema` map -- the
//! shape used for both a module's inputs and its outputs (§3). Validity
//! requires every schema-required field to have a bound value whose status
//! satisfies `ValueSchema::is_required` (through `ValueStatus::satisfies_required`).

use std::collections::BTreeMap;

use crate::error::KiaraError;
use crate::value_objects::{ValueId, ValueSchema};

use super::value::Value;

#[derive(Debug, Clone, Default)]
pub struct ValueMap {
    schemas: BTreeMap<String, ValueSchema>,
    values: BTreeMap<String, Value>,
}

impl ValueMap {
    pub fn new(schemas: BTreeMap<String, ValueSchema>) -> Self {
        Self { schemas, values: BTreeMap::new() }
    }

    pub fn schema(&self, field: &str) -> Option<&ValueSchema> {
        self.schemas.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &String> {
        self.schemas.keys()
    }

    pub fn set_value(&mut self, field: &str, value: Value) -> Result<(), KiaraError> {
        let schema = self
            .schemas
            .get(field)
            .ok_or_else(|| KiaraError::InputValuesInvalid(format!("no such field: {field}")))?;
        if value.schema().schema_hash() != schema.schema_hash() {
            return Err(KiaraError::InputValuesInvalid(format!(
                "field '{field}' schema mismatch: expected {}, got {}",
                schema.type_name, value.schema().type_name
            )));
        }
        self.values.insert(field.to_string(), value);
        Ok(())
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    pub fn get_value_id(&self, field: &str) -> Option<ValueId> {
        self.values.get(field).map(|v| v.value_id())
    }

    pub fn values(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    /// Whether every schema-required field is bound to a value that
    /// satisfies it (§3's required-field rule, via `ValueStatus`).
    pub fn all_items_valid(&self) -> bool {
        self.schemas.iter().all(|(field, schema)| {
            if !schema.is_required() {
                return true;
            }
            match self.values.get(field) {
                Some(value) => value.status().satisfies_required(),
                None => false,
            }
        })
    }

    /// Lists schema-required fields that are missing or unsatisfied, for
    /// building a descriptive `InputValuesInvalid` error.
    pub fn missing_required_fields(&self) -> Vec<String> {
        self.schemas
            .iter()
            .filter(|(field, schema)| {
                if !schema.is_required() {
                    return false;
                }
                !self.values.get(*field).is_some_and(|v| v.status().satisfies_required())
            })
            .map(|(field, _)| field.clone())
            .collect()
    }
}
