//! Exercises `PipelineRuntime` against a two-stage pipeline: `double` feeds
//! its `result` into `increment`, so the second step cannot start until the
//! first stage's job has actually produced a value.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use kiara_core::{KiaraError, Module, ModuleConfig, ModuleRegistry, PayloadStore, PipelineRuntime, ValueMap};
use kiara_domain::aggregates::{InputSource, PipelineOutputAlias, PipelineStructure, StepDefinition};
use kiara_domain::entities::Value;
use kiara_domain::value_objects::{canonical_hash, Manifest, StepId, StepValueAddress, ValuePedigree, ValueSchema};

use crate::common::{build_harness, Increment};

/// Doubles its `value` input, producing `result`.
struct Double;

#[async_trait]
impl Module for Double {
    fn module_type(&self) -> &'static str {
        "double"
    }

    fn inputs_schema(&self, _module_config: &ModuleConfig) -> Result<BTreeMap<String, ValueSchema>, KiaraError> {
        Ok(BTreeMap::from([("value".to_string(), ValueSchema::new("integer"))]))
    }

    fn outputs_schema(&self, _module_config: &ModuleConfig) -> Result<BTreeMap<String, ValueSchema>, KiaraError> {
        Ok(BTreeMap::from([("result".to_string(), ValueSchema::new("integer"))]))
    }

    async fn process(&self, _module_config: &ModuleConfig, inputs: &ValueMap, _data: &dyn PayloadStore) -> Result<ValueMap, KiaraError> {
        let input = inputs.get("value").expect("value bound by runtime");
        let pedigree = ValuePedigree::new(
            "double",
            canonical_hash(&"double"),
            BTreeMap::from([("value".to_string(), input.value_id())]),
            BTreeMap::new(),
        );
        let mut outputs = ValueMap::new(self.outputs_schema(&ModuleConfig::new())?);
        let value = Value::new_computed(
            ValueSchema::new("integer"),
            input.status(),
            input.value_hash(),
            input.value_size(),
            pedigree,
            "result",
        );
        outputs.set_value("result", value)?;
        Ok(outputs)
    }

    fn is_cpu_intensive(&self) -> bool {
        false
    }
}

fn two_stage_structure() -> PipelineStructure {
    let dbl = StepDefinition {
        step_id: StepId::new("dbl").unwrap(),
        manifest: Manifest::bare("double"),
        input_links: BTreeMap::from([("value".to_string(), InputSource::PipelineInput("n".to_string()))]),
    };
    let inc = StepDefinition {
        step_id: StepId::new("inc").unwrap(),
        manifest: Manifest::bare("increment"),
        input_links: BTreeMap::from([(
            "value".to_string(),
            InputSource::StepOutput(StepValueAddress::new(StepId::new("dbl").unwrap(), "result")),
        )]),
    };
    let outputs = vec![PipelineOutputAlias {
        alias: "answer".to_string(),
        source: StepValueAddress::new(StepId::new("inc").unwrap(), "result"),
    }];
    PipelineStructure::build(vec![dbl, inc], outputs).unwrap()
}

#[tokio::test]
async fn chained_steps_run_across_processing_stages() {
    let mut modules = ModuleRegistry::new();
    modules.register(Arc::new(Double));
    modules.register(Arc::new(Increment));
    let harness = build_harness(modules);

    let input_id = harness
        .data
        .register_orphan("ctx", ValueSchema::new("integer"), &serde_json::Value::from(5), false)
        .await
        .unwrap();

    let structure = two_stage_structure();
    let pipeline_inputs = BTreeMap::from([("n".to_string(), input_id)]);
    let resolved = harness.pipelines.run(&structure, pipeline_inputs).await.unwrap();

    assert!(resolved.contains_key("answer"));
    let answer = harness.data.get_value(resolved["answer"]).await.unwrap();
    assert!(!answer.pedigree().is_orphan(), "the alias should resolve to a value computed by a step, not an orphan");
}

#[tokio::test]
async fn unknown_step_output_reference_is_rejected_at_build_time() {
    let bad_step = StepDefinition {
        step_id: StepId::new("inc").unwrap(),
        manifest: Manifest::bare("increment"),
        input_links: BTreeMap::from([(
            "value".to_string(),
            InputSource::StepOutput(StepValueAddress::new(StepId::new("missing").unwrap(), "result")),
        )]),
    };
    let outputs = vec![PipelineOutputAlias {
        alias: "answer".to_string(),
        source: StepValueAddress::new(StepId::new("inc").unwrap(), "result"),
    }];
    assert!(PipelineStructure::build(vec![bad_step], outputs).is_err());
}
