// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Built-in data types
//!
//! Primitive `DataType` implementations registered into every context by
//! default: `integer`, `float`, `string`, `boolean`, `list`, and `any` (an
//! escape hatch for an unconstrained JSON value). Custom types defined by
//! module authors are registered the same way through the same trait.

use kiara_domain::services::DataType;
use kiara_domain::value_objects::{Digest, TypeConfig, ValueSize};
use kiara_domain::KiaraError;
use serde_json::Value as Json;

pub struct IntegerType;

impl DataType for IntegerType {
    fn type_name(&self) -> &'static str {
        "integer"
    }

    fn validate_type_config(&self, _type_config: &TypeConfig) -> Result<(), KiaraError> {
        Ok(())
    }

    fn is_valid(&self, data: &Json, _type_config: &TypeConfig) -> Result<(), KiaraError> {
        if data.is_i64() || data.is_u64() {
            Ok(())
        } else {
            Err(KiaraError::input_values_invalid(format!("expected an integer, got {data}")))
        }
    }

    fn serialize(&self, data: &Json) -> Result<Vec<u8>, KiaraError> {
        Ok(serde_json::to_vec(data)?)
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Json, KiaraError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

pub struct FloatType;

impl DataType for FloatType {
    fn type_name(&self) -> &'static str {
        "float"
    }

    fn validate_type_config(&self, _type_config: &TypeConfig) -> Result<(), KiaraError> {
        Ok(())
    }

    fn is_valid(&self, data: &Json, _type_config: &TypeConfig) -> Result<(), KiaraError> {
        if data.is_number() {
            Ok(())
        } else {
            Err(KiaraError::input_values_invalid(format!("expected a float, got {data}")))
        }
    }

    fn serialize(&self, data: &Json) -> Result<Vec<u8>, KiaraError> {
        Ok(serde_json::to_vec(data)?)
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Json, KiaraError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

pub struct StringType;

impl DataType for StringType {
    fn type_name(&self) -> &'static str {
        "string"
    }

    fn validate_type_config(&self, _type_config: &TypeConfig) -> Result<(), KiaraError> {
        Ok(())
    }

    fn is_valid(&self, data: &Json, _type_config: &TypeConfig) -> Result<(), KiaraError> {
        if data.is_string() {
            Ok(())
        } else {
            Err(KiaraError::input_values_invalid(format!("expected a string, got {data}")))
        }
    }

    fn serialize(&self, data: &Json) -> Result<Vec<u8>, KiaraError> {
        let s = data.as_str().ok_or_else(|| KiaraError::input_values_invalid("not a string"))?;
        Ok(s.as_bytes().to_vec())
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Json, KiaraError> {
        let s = String::from_utf8(bytes.to_vec()).map_err(|e| KiaraError::SerializationError(e.to_string()))?;
        Ok(Json::String(s))
    }
}

pub struct BooleanType;

impl DataType for BooleanType {
    fn type_name(&self) -> &'static str {
        "boolean"
    }

    fn validate_type_config(&self, _type_config: &TypeConfig) -> Result<(), KiaraError> {
        Ok(())
    }

    fn is_valid(&self, data: &Json, _type_config: &TypeConfig) -> Result<(), KiaraError> {
        if data.is_boolean() {
            Ok(())
        } else {
            Err(KiaraError::input_values_invalid(format!("expected a boolean, got {data}")))
        }
    }

    fn serialize(&self, data: &Json) -> Result<Vec<u8>, KiaraError> {
        Ok(serde_json::to_vec(data)?)
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Json, KiaraError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// `list` requires an `item_type` entry in its `type_config` naming the
/// registered type of its elements; element validation itself is delegated
/// to the data type registry, not performed here.
pub struct ListType;

impl DataType for ListType {
    fn type_name(&self) -> &'static str {
        "list"
    }

    fn validate_type_config(&self, type_config: &TypeConfig) -> Result<(), KiaraError> {
        if !type_config.contains_key("item_type") {
            return Err(KiaraError::invalid_manifest_config("list type_config requires 'item_type'"));
        }
        Ok(())
    }

    fn is_valid(&self, data: &Json, _type_config: &TypeConfig) -> Result<(), KiaraError> {
        if data.is_array() {
            Ok(())
        } else {
            Err(KiaraError::input_values_invalid(format!("expected a list, got {data}")))
        }
    }

    fn serialize(&self, data: &Json) -> Result<Vec<u8>, KiaraError> {
        Ok(serde_json::to_vec(data)?)
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Json, KiaraError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Escape hatch accepting any JSON-representable value, for module authors
/// prototyping before they register a precise type.
pub struct AnyType;

impl DataType for AnyType {
    fn type_name(&self) -> &'static str {
        "any"
    }

    fn validate_type_config(&self, _type_config: &TypeConfig) -> Result<(), KiaraError> {
        Ok(())
    }

    fn is_valid(&self, _data: &Json, _type_config: &TypeConfig) -> Result<(), KiaraError> {
        Ok(())
    }

    fn serialize(&self, data: &Json) -> Result<Vec<u8>, KiaraError> {
        Ok(serde_json::to_vec(data)?)
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Json, KiaraError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Shared helper any `DataType` impl can use instead of hand-rolling a
/// bytes-to-(hash, size) computation.
pub fn hash_and_size(data_type: &dyn DataType, bytes: &[u8]) -> (Digest, ValueSize) {
    (data_type.hash(bytes), data_type.size(bytes))
}
