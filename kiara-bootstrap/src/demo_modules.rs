// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Demo modules
//!
//! Kiara itself ships no processing modules -- `module_type` is an
//! application concern, not an engine one. The binary in this crate
//! registers these two toy modules so a pipeline config file actually has
//! something to run without a real application wired in yet.

use std::collections::BTreeMap;

use async_trait::async_trait;

use kiara_core::{KiaraError, Module, ModuleConfig, PayloadStore, ValueMap};
use kiara_domain::entities::Value;
use kiara_domain::value_objects::{canonical_hash, ValuePedigree, ValueSchema};

/// Passes its `value` input through to `result` unchanged.
pub struct Identity;

#[async_trait]
impl Module for Identity {
    fn module_type(&self) -> &'static str {
        "identity"
    }

    fn inputs_schema(&self, _module_config: &ModuleConfig) -> Result<BTreeMap<String, ValueSchema>, KiaraError> {
        Ok(BTreeMap::from([("value".to_string(), ValueSchema::new("any"))]))
    }

    fn outputs_schema(&self, _module_config: &ModuleConfig) -> Result<BTreeMap<String, ValueSchema>, KiaraError> {
        Ok(BTreeMap::from([("result".to_string(), ValueSchema::new("any"))]))
    }

    async fn process(&self, _module_config: &ModuleConfig, inputs: &ValueMap, _data: &dyn PayloadStore) -> Result<ValueMap, KiaraError> {
        let input = inputs.get("value").ok_or_else(|| KiaraError::input_values_invalid("missing 'value'"))?;
        let pedigree = ValuePedigree::new(
            "identity",
            canonical_hash(&"identity"),
            BTreeMap::from([("value".to_string(), input.value_id())]),
            BTreeMap::new(),
        );
        let mut outputs = ValueMap::new(self.outputs_schema(&ModuleConfig::new())?);
        outputs.set_value(
            "result",
            Value::new_computed(input.schema().clone(), input.status(), input.value_hash(), input.value_size(), pedigree, "result"),
        )?;
        Ok(outputs)
    }

    fn is_cpu_intensive(&self) -> bool {
        false
    }
}

/// Adds a constant `amount` (from `module_config`, or an `amount` pipeline
/// input when not wired as a constant) to its `value` input.
pub struct AddConstant;

impl AddConstant {
    async fn resolve_amount(inputs: &ValueMap, module_config: &ModuleConfig, data: &dyn PayloadStore) -> Result<i64, KiaraError> {
        if let Some(amount) = inputs.get("amount") {
            let json = data.read(amount).await?;
            return json.as_i64().ok_or_else(|| KiaraError::input_values_invalid("'amount' is not an integer"));
        }
        module_config
            .get("amount")
            .and_then(|json| json.as_i64())
            .ok_or_else(|| KiaraError::input_values_invalid("missing 'amount'"))
    }
}

#[async_trait]
impl Module for AddConstant {
    fn module_type(&self) -> &'static str {
        "add_constant"
    }

    fn inputs_schema(&self, _module_config: &ModuleConfig) -> Result<BTreeMap<String, ValueSchema>, KiaraError> {
        Ok(BTreeMap::from([
            ("value".to_string(), ValueSchema::new("integer")),
            ("amount".to_string(), ValueSchema::new("integer")),
        ]))
    }

    fn outputs_schema(&self, _module_config: &ModuleConfig) -> Result<BTreeMap<String, ValueSchema>, KiaraError> {
        Ok(BTreeMap::from([("result".to_string(), ValueSchema::new("integer"))]))
    }

    async fn process(&self, module_config: &ModuleConfig, inputs: &ValueMap, data: &dyn PayloadStore) -> Result<ValueMap, KiaraError> {
        let value = inputs.get("value").ok_or_else(|| KiaraError::input_values_invalid("missing 'value'"))?;
        let base = data.read(value).await?;
        let base = base.as_i64().ok_or_else(|| KiaraError::input_values_invalid("'value' is not an integer"))?;
        let amount = Self::resolve_amount(inputs, module_config, data).await?;
        let sum = base + amount;

        let result_schema = ValueSchema::new("integer");
        let (value_hash, value_size) = data.write(&result_schema, &serde_json::json!(sum)).await?;

        let pedigree = ValuePedigree::new(
            "add_constant",
            canonical_hash(&("add_constant", module_config)),
            BTreeMap::from([("value".to_string(), value.value_id())]),
            BTreeMap::new(),
        );
        let mut outputs = ValueMap::new(self.outputs_schema(module_config)?);
        outputs.set_value(
            "result",
            Value::new_computed(result_schema, value.status(), Some(value_hash), Some(value_size), pedigree, "result"),
        )?;
        Ok(outputs)
    }

    fn is_cpu_intensive(&self) -> bool {
        false
    }
}
