// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Module registry
//!
//! Holds every registered `Module` by its `module_type`, and doubles as the
//! `ModuleExecutor` port implementation that the job registry depends on
//! (§4, §6): looking a module up and running it are the same lookup, so
//! there is no way to execute a module type that was never registered.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use kiara_domain::entities::ValueMap;
use kiara_domain::services::Module;
use kiara_domain::value_objects::ModuleConfig;
use kiara_domain::{KiaraError, ModuleExecutor, PayloadStore};

#[derive(Clone, Default)]
pub struct ModuleRegistry {
    modules: HashMap<String, Arc<dyn Module>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, module: Arc<dyn Module>) {
        self.modules.insert(module.module_type().to_string(), module);
    }

    pub fn get(&self, module_type: &str) -> Result<Arc<dyn Module>, KiaraError> {
        self.modules
            .get(module_type)
            .cloned()
            .ok_or_else(|| KiaraError::UnknownModuleType(module_type.to_string()))
    }

    pub fn registered_modules(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(|s| s.as_str())
    }
}

#[async_trait]
impl ModuleExecutor for ModuleRegistry {
    async fn execute(
        &self,
        module_type: &str,
        module_config: &ModuleConfig,
        inputs: &ValueMap,
        data: &dyn PayloadStore,
    ) -> Result<ValueMap, KiaraError> {
        let module = self.get(module_type)?;
        module.process(module_config, inputs, data).await
    }

    fn is_cpu_intensive(&self, module_type: &str) -> bool {
        self.modules.get(module_type).map(|m| m.is_cpu_intensive()).unwrap_or(true)
    }

    fn is_idempotent(&self, module_type: &str) -> bool {
        self.modules.get(module_type).map(|m| m.is_idempotent()).unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    #[async_trait]
    impl Module for Noop {
        fn module_type(&self) -> &'static str {
            "noop"
        }
        fn inputs_schema(
            &self,
            _module_config: &ModuleConfig,
        ) -> Result<std::collections::BTreeMap<String, kiara_domain::value_objects::ValueSchema>, KiaraError> {
            Ok(Default::default())
        }
        fn outputs_schema(
            &self,
            _module_config: &ModuleConfig,
        ) -> Result<std::collections::BTreeMap<String, kiara_domain::value_objects::ValueSchema>, KiaraError> {
            Ok(Default::default())
        }
        async fn process(
            &self,
            _module_config: &ModuleConfig,
            _inputs: &ValueMap,
            _data: &dyn PayloadStore,
        ) -> Result<ValueMap, KiaraError> {
            Ok(ValueMap::new(Default::default()))
        }
        fn is_cpu_intensive(&self) -> bool {
            false
        }
        fn is_idempotent(&self) -> bool {
            false
        }
    }

    struct NullStore;

    #[async_trait]
    impl PayloadStore for NullStore {
        async fn read(&self, _value: &kiara_domain::entities::Value) -> Result<serde_json::Value, KiaraError> {
            unimplemented!("noop module never reads payload data")
        }
        async fn write(
            &self,
            _schema: &kiara_domain::value_objects::ValueSchema,
            _data: &serde_json::Value,
        ) -> Result<(kiara_domain::value_objects::Digest, kiara_domain::value_objects::ValueSize), KiaraError> {
            unimplemented!("noop module never writes payload data")
        }
    }

    #[test]
    fn unregistered_module_type_is_an_error() {
        let registry = ModuleRegistry::new();
        assert!(registry.get("noop").is_err());
    }

    #[tokio::test]
    async fn executes_a_registered_module_and_reflects_its_characteristics() {
        let mut registry = ModuleRegistry::new();
        registry.register(Arc::new(Noop));
        assert!(!registry.is_cpu_intensive("noop"));
        assert!(!registry.is_idempotent("noop"));
        let inputs = ValueMap::new(Default::default());
        let outputs = registry.execute("noop", &ModuleConfig::new(), &inputs, &NullStore).await.unwrap();
        assert!(outputs.values().next().is_none());
    }
}
