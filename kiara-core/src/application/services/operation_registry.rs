// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Operation registry
//!
//! An "operation" is a named, pre-configured `Manifest` -- a convenience
//! layer over the module registry so pipeline authors can write
//! `operation: "add_constant"` instead of repeating a `module_type` plus
//! its full `module_config` at every use site. Operations are resolved to a
//! concrete `Manifest` once, at pipeline-build time; nothing downstream of
//! `PipelineStructure::build` needs to know an operation name was ever
//! involved.

use std::collections::HashMap;

use kiara_domain::value_objects::Manifest;
use kiara_domain::KiaraError;

#[derive(Clone, Default)]
pub struct OperationRegistry {
    operations: HashMap<String, Manifest>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, operation_name: impl Into<String>, manifest: Manifest) {
        self.operations.insert(operation_name.into(), manifest);
    }

    pub fn resolve(&self, operation_name: &str) -> Result<Manifest, KiaraError> {
        self.operations
            .get(operation_name)
            .cloned()
            .ok_or_else(|| KiaraError::UnknownOperation(operation_name.to_string()))
    }

    pub fn registered_operations(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().map(|s| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiara_domain::value_objects::ModuleConfig;
    use serde_json::Value as Json;

    #[test]
    fn resolves_a_registered_operation_to_its_manifest() {
        let mut registry = OperationRegistry::new();
        let mut config = ModuleConfig::new();
        config.insert("increment".into(), Json::from(1));
        registry.register("add_one", Manifest::new("add_constant", config));

        let manifest = registry.resolve("add_one").unwrap();
        assert_eq!(manifest.module_type, "add_constant");
    }

    #[test]
    fn unknown_operation_is_an_error() {
        let registry = OperationRegistry::new();
        assert!(registry.resolve("nope").is_err());
    }
}
