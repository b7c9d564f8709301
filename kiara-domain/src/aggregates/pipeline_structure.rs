// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Pipeline structure aggregate
//!
//! Static analysis of a pipeline configuration (§5): builds the execution
//! DAG from step input links, detects cycles, assigns `processing_stages`
//! by longest path from a synthetic `__root__` node, and marks which steps
//! are `required` by propagating backward from the pipeline's declared
//! outputs. This aggregate owns no runtime state -- it is rebuilt once per
//! pipeline definition and then consulted by the runtime engine.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::error::KiaraError;
use crate::value_objects::{Manifest, ProcessingStage, StepId, StepValueAddress};

/// Where a step's input field gets its value from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputSource {
    /// Bound to a pipeline-level input field (§4.5).
    PipelineInput(String),
    /// Bound to another step's output (§4.5).
    StepOutput(StepValueAddress),
    /// A constant baked into the step's module config rather than wired in.
    Constant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepDefinition {
    pub step_id: StepId,
    pub manifest: Manifest,
    pub input_links: BTreeMap<String, InputSource>,
}

/// An alias exposed on the pipeline's outer boundary (§4.5's `auto` /
/// `auto_all_outputs` resolution, see DESIGN.md).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutputAlias {
    pub alias: String,
    pub source: StepValueAddress,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineStructure {
    steps: BTreeMap<StepId, StepDefinition>,
    pipeline_outputs: Vec<PipelineOutputAlias>,
    #[serde(skip)]
    processing_stages: BTreeMap<StepId, ProcessingStage>,
    #[serde(skip)]
    required_steps: BTreeSet<StepId>,
}

impl PipelineStructure {
    /// Builds and validates a pipeline structure: checks every referenced
    /// step/field exists, detects cycles, computes processing stages, and
    /// marks required steps. Fails closed on the first problem found.
    pub fn build(
        steps: Vec<StepDefinition>,
        pipeline_outputs: Vec<PipelineOutputAlias>,
    ) -> Result<Self, KiaraError> {
        let mut step_map = BTreeMap::new();
        for step in steps {
            if step_map.insert(step.step_id.clone(), step).is_some() {
                return Err(KiaraError::InvalidPipelineStepConfig(format!(
                    "duplicate step_id in pipeline: {}",
                    step_map.keys().last().unwrap()
                )));
            }
        }

        let mut structure = Self {
            steps: step_map,
            pipeline_outputs,
            processing_stages: BTreeMap::new(),
            required_steps: BTreeSet::new(),
        };

        structure.validate_references()?;
        structure.compute_processing_stages()?;
        structure.compute_required_steps()?;
        Ok(structure)
    }

    pub fn steps(&self) -> impl Iterator<Item = &StepDefinition> {
        self.steps.values()
    }

    pub fn step(&self, step_id: &StepId) -> Option<&StepDefinition> {
        self.steps.get(step_id)
    }

    pub fn pipeline_outputs(&self) -> &[PipelineOutputAlias] {
        &self.pipeline_outputs
    }

    pub fn processing_stage(&self, step_id: &StepId) -> Option<ProcessingStage> {
        self.processing_stages.get(step_id).copied()
    }

    pub fn is_required(&self, step_id: &StepId) -> bool {
        self.required_steps.contains(step_id)
    }

    /// Steps grouped by processing stage, in stage order; steps within a
    /// stage have no ordering dependency on each other and may be scheduled
    /// concurrently (§5).
    pub fn stages_in_order(&self) -> Vec<(ProcessingStage, Vec<&StepId>)> {
        let mut by_stage: BTreeMap<ProcessingStage, Vec<&StepId>> = BTreeMap::new();
        for (step_id, stage) in &self.processing_stages {
            by_stage.entry(*stage).or_default().push(step_id);
        }
        by_stage.into_iter().collect()
    }

    fn validate_references(&self) -> Result<(), KiaraError> {
        for step in self.steps.values() {
            for (field, source) in &step.input_links {
                if let InputSource::StepOutput(addr) = source {
                    if !self.steps.contains_key(&addr.step_id) {
                        return Err(KiaraError::InvalidPipelineStepConfig(format!(
                            "step '{}' input '{}' references unknown step '{}'",
                            step.step_id, field, addr.step_id
                        )));
                    }
                }
            }
        }
        for output in &self.pipeline_outputs {
            if !self.steps.contains_key(&output.source.step_id) {
                return Err(KiaraError::InvalidPipelineStepConfig(format!(
                    "pipeline output '{}' references unknown step '{}'",
                    output.alias, output.source.step_id
                )));
            }
        }
        Ok(())
    }

    /// Assigns stages by longest path from the synthetic root: a step with
    /// no step-to-step dependency is stage 0; a step depending on stage N
    /// steps is at least stage N+1. Also the point where dependency cycles
    /// surface, since a cycle can never reach a fixed point under this
    /// relaxation.
    fn compute_processing_stages(&mut self) -> Result<(), KiaraError> {
        let mut in_degree: BTreeMap<StepId, usize> = self.steps.keys().map(|id| (id.clone(), 0)).collect();
        let mut dependents: BTreeMap<StepId, Vec<StepId>> = BTreeMap::new();

        for step in self.steps.values() {
            let mut deps: BTreeSet<StepId> = BTreeSet::new();
            for source in step.input_links.values() {
                if let InputSource::StepOutput(addr) = source {
                    deps.insert(addr.step_id.clone());
                }
            }
            *in_degree.get_mut(&step.step_id).unwrap() = deps.len();
            for dep in deps {
                dependents.entry(dep).or_default().push(step.step_id.clone());
            }
        }

        let mut stage: BTreeMap<StepId, ProcessingStage> = BTreeMap::new();
        let mut queue: VecDeque<StepId> =
            in_degree.iter().filter(|(_, &d)| d == 0).map(|(id, _)| id.clone()).collect();
        for id in &queue {
            stage.insert(id.clone(), ProcessingStage::ROOT);
        }

        let mut remaining = in_degree.clone();
        let mut visited = 0usize;
        while let Some(step_id) = queue.pop_front() {
            visited += 1;
            let current_stage = stage[&step_id];
            if let Some(children) = dependents.get(&step_id) {
                for child in children {
                    let entry = remaining.get_mut(child).unwrap();
                    *entry -= 1;
                    let candidate = current_stage.next();
                    let slot = stage.entry(child.clone()).or_insert(candidate);
                    if candidate > *slot {
                        *slot = candidate;
                    }
                    if *entry == 0 {
                        queue.push_back(child.clone());
                    }
                }
            }
        }

        if visited != self.steps.len() {
            let stuck: Vec<String> = remaining
                .iter()
                .filter(|(_, &d)| d > 0)
                .map(|(id, _)| id.to_string())
                .collect();
            return Err(KiaraError::CyclicPipeline(format!(
                "cycle detected among steps: {}",
                stuck.join(", ")
            )));
        }

        self.processing_stages = stage;
        Ok(())
    }

    /// Backward propagation from the pipeline's declared outputs: a step is
    /// `required` if one of its outputs is a pipeline output, or if one of
    /// its outputs feeds a required step (§5's "required" rule). Steps that
    /// only feed other, non-required steps are optional and may be skipped
    /// by an execution target that doesn't need their outputs.
    fn compute_required_steps(&mut self) -> Result<(), KiaraError> {
        let mut required: BTreeSet<StepId> = self.pipeline_outputs.iter().map(|o| o.source.step_id.clone()).collect();

        let mut changed = true;
        while changed {
            changed = false;
            let snapshot: Vec<StepId> = required.iter().cloned().collect();
            for step_id in snapshot {
                let Some(step) = self.steps.get(&step_id) else { continue };
                for source in step.input_links.values() {
                    if let InputSource::StepOutput(addr) = source {
                        if required.insert(addr.step_id.clone()) {
                            changed = true;
                        }
                    }
                }
            }
        }

        self.required_steps = required;
        Ok(())
    }
}
