// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Pipeline config file loader
//!
//! Turns an author-facing pipeline definition (JSON or YAML, §6) into a
//! `PipelineStructure`: auto-generates any `step_id` the file omits,
//! resolves `input_links` refs (`"step.field"`) into `InputSource::StepOutput`,
//! and falls back every other input field to an implicit
//! `"{step_id}__{field}"` pipeline input, renamed by `input_aliases` when
//! present. `output_aliases` follows the same naming scheme, plus two
//! auto-generation markers: `"auto"` exposes one alias per step nothing
//! else in the pipeline consumes, `"auto_all_outputs"` exposes one per
//! output field of every step regardless of whether something downstream
//! already consumes it.
//!
//! `constants` and `defaults` key off the same implicit `"{step_id}__{field}"`
//! name as `input_aliases`, before renaming. A constant is baked straight
//! into the step's own `module_config` and the field is wired as
//! `InputSource::Constant`, matching how `PipelineRuntime::run_step` already
//! treats that variant. A default can't be injected here -- this loader has
//! no archive to register a value against -- so it is returned alongside the
//! structure for the caller to register and merge into `pipeline_inputs`
//! for any name the caller didn't already supply.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use kiara_domain::aggregates::{InputSource, PipelineOutputAlias, PipelineStructure, StepDefinition};
use kiara_domain::value_objects::{Manifest, ModuleConfig, StepId, StepValueAddress};
use kiara_domain::KiaraError;

use super::module_registry::ModuleRegistry;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfigFile {
    pub pipeline_name: String,
    #[serde(default)]
    pub doc: Option<String>,
    pub steps: Vec<RawStepConfig>,
    #[serde(default)]
    pub input_aliases: Option<AliasSpec>,
    #[serde(default)]
    pub output_aliases: Option<AliasSpec>,
    #[serde(default)]
    pub defaults: BTreeMap<String, Json>,
    #[serde(default)]
    pub constants: BTreeMap<String, Json>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawStepConfig {
    #[serde(default)]
    pub step_id: Option<String>,
    pub module_type: String,
    #[serde(default)]
    pub module_config: ModuleConfig,
    #[serde(default)]
    pub input_links: BTreeMap<String, InputLinkSpec>,
}

/// A step's `input_links` entry: the common single ref, or a one-element
/// list the examples pack occasionally writes for symmetry with
/// multi-valued fields. A list of more than one ref has no fan-in
/// semantics in this runtime and is rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputLinkSpec {
    Single(String),
    List(Vec<String>),
}

/// Either an explicit `{ "step__field": alias }` rename map or one of the
/// two auto-generation markers (`input_aliases` only ever uses `"auto"`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AliasSpec {
    Marker(String),
    Map(BTreeMap<String, String>),
}

/// Result of loading a pipeline config file: the structure the runtime
/// consumes, plus the pieces of the file a caller needs to finish wiring
/// `pipeline_inputs` before calling `PipelineRuntime::run`.
pub struct LoadedPipeline {
    pub structure: PipelineStructure,
    pub pipeline_name: String,
    pub doc: Option<String>,
    /// Default literal values for pipeline-input fields, keyed by the
    /// (post-alias) pipeline input name. Only present for inputs the file
    /// declared in `defaults`; the caller registers each as a value and
    /// uses it in place of a missing entry in `pipeline_inputs`.
    pub default_inputs: BTreeMap<String, Json>,
}

/// Parses `content` as YAML if `is_yaml`, otherwise JSON.
pub fn parse_config_str(content: &str, is_yaml: bool) -> Result<PipelineConfigFile, KiaraError> {
    if is_yaml {
        serde_yaml::from_str(content).map_err(|err| KiaraError::SerializationError(err.to_string()))
    } else {
        Ok(serde_json::from_str(content)?)
    }
}

/// Reads and parses a pipeline config file, choosing JSON or YAML by the
/// file extension (`.yaml`/`.yml` -> YAML, anything else -> JSON), then
/// resolves it against `modules` into a `LoadedPipeline`.
pub fn load_pipeline_file(path: &Path, modules: &ModuleRegistry) -> Result<LoadedPipeline, KiaraError> {
    let content = std::fs::read_to_string(path)?;
    let is_yaml = matches!(path.extension().and_then(|ext| ext.to_str()), Some("yaml") | Some("yml"));
    let file = parse_config_str(&content, is_yaml)?;
    parse_pipeline_structure(&file, modules)
}

/// Resolves an already-parsed config file against `modules` into a
/// `LoadedPipeline`.
pub fn parse_pipeline_structure(file: &PipelineConfigFile, modules: &ModuleRegistry) -> Result<LoadedPipeline, KiaraError> {
    if let Some(AliasSpec::Marker(marker)) = &file.input_aliases {
        if marker != "auto" {
            return Err(KiaraError::InvalidPipelineStepConfig(format!(
                "input_aliases marker must be 'auto', got '{marker}'"
            )));
        }
    }

    let step_ids = assign_step_ids(&file.steps)?;

    let mut step_defs = Vec::with_capacity(file.steps.len());
    let mut default_inputs = BTreeMap::new();
    let mut referenced_steps: BTreeSet<StepId> = BTreeSet::new();

    for (raw, step_id) in file.steps.iter().zip(step_ids.iter()) {
        let module = modules.get(&raw.module_type)?;
        let mut module_config = raw.module_config.clone();
        let inputs_schema = module.inputs_schema(&module_config)?;

        let mut input_links = BTreeMap::new();
        for field in inputs_schema.keys() {
            if let Some(spec) = raw.input_links.get(field) {
                let reference = single_reference(step_id, field, spec)?;
                let (source_step, source_field) = reference.split_once('.').ok_or_else(|| {
                    KiaraError::InvalidPipelineStepConfig(format!(
                        "step '{step_id}' input '{field}' ref '{reference}' must be 'step.field'"
                    ))
                })?;
                let source_step_id = StepId::new(source_step)?;
                referenced_steps.insert(source_step_id.clone());
                input_links.insert(field.clone(), InputSource::StepOutput(StepValueAddress::new(source_step_id, source_field)));
                continue;
            }

            let implicit_name = format!("{step_id}__{field}");
            if let Some(constant) = file.constants.get(&implicit_name) {
                if file.defaults.contains_key(&implicit_name) {
                    return Err(KiaraError::InvalidPipelineStepConfig(format!(
                        "pipeline input '{implicit_name}' appears in both constants and defaults"
                    )));
                }
                module_config.insert(field.clone(), constant.clone());
                input_links.insert(field.clone(), InputSource::Constant);
                continue;
            }

            let pipeline_input_name = resolve_input_alias(&file.input_aliases, &implicit_name);
            if let Some(default) = file.defaults.get(&implicit_name) {
                default_inputs.insert(pipeline_input_name.clone(), default.clone());
            }
            input_links.insert(field.clone(), InputSource::PipelineInput(pipeline_input_name));
        }

        step_defs.push(StepDefinition {
            step_id: step_id.clone(),
            manifest: Manifest::new(raw.module_type.clone(), module_config),
            input_links,
        });
    }

    let pipeline_outputs = resolve_output_aliases(&file.output_aliases, modules, &step_defs, &referenced_steps)?;
    let structure = PipelineStructure::build(step_defs, pipeline_outputs)?;

    Ok(LoadedPipeline {
        structure,
        pipeline_name: file.pipeline_name.clone(),
        doc: file.doc.clone(),
        default_inputs,
    })
}

/// Assigns a `StepId` to every raw step, in file order: explicit ids are
/// validated and reserved first, then missing ones are generated from the
/// module type and disambiguated against everything already reserved.
fn assign_step_ids(raw_steps: &[RawStepConfig]) -> Result<Vec<StepId>, KiaraError> {
    let mut used = BTreeSet::new();
    for raw in raw_steps {
        if let Some(id) = &raw.step_id {
            let step_id = StepId::new(id.clone())?;
            if !used.insert(step_id.as_str().to_string()) {
                return Err(KiaraError::InvalidPipelineStepConfig(format!("duplicate step_id '{id}'")));
            }
        }
    }

    let mut resolved = Vec::with_capacity(raw_steps.len());
    for raw in raw_steps {
        let step_id = match &raw.step_id {
            Some(id) => StepId::new(id.clone())?,
            None => {
                let mut candidate = StepId::from_module_type(&raw.module_type, None)?;
                let mut disambiguator = 2usize;
                while used.contains(candidate.as_str()) {
                    candidate = StepId::from_module_type(&raw.module_type, Some(disambiguator))?;
                    disambiguator += 1;
                }
                used.insert(candidate.as_str().to_string());
                candidate
            }
        };
        resolved.push(step_id);
    }
    Ok(resolved)
}

fn single_reference(step_id: &StepId, field: &str, spec: &InputLinkSpec) -> Result<String, KiaraError> {
    match spec {
        InputLinkSpec::Single(reference) => Ok(reference.clone()),
        InputLinkSpec::List(refs) if refs.len() == 1 => Ok(refs[0].clone()),
        InputLinkSpec::List(refs) if refs.is_empty() => Err(KiaraError::InvalidPipelineStepConfig(format!(
            "step '{step_id}' input '{field}' has an empty input_links list"
        ))),
        InputLinkSpec::List(_) => Err(KiaraError::InvalidPipelineStepConfig(format!(
            "step '{step_id}' input '{field}' lists more than one source, which this runtime does not fan in"
        ))),
    }
}

fn resolve_input_alias(spec: &Option<AliasSpec>, implicit_name: &str) -> String {
    match spec {
        None => implicit_name.to_string(),
        Some(AliasSpec::Marker(_)) => implicit_name.to_string(),
        Some(AliasSpec::Map(map)) => map.get(implicit_name).cloned().unwrap_or_else(|| implicit_name.to_string()),
    }
}

fn resolve_output_aliases(
    spec: &Option<AliasSpec>,
    modules: &ModuleRegistry,
    step_defs: &[StepDefinition],
    referenced_steps: &BTreeSet<StepId>,
) -> Result<Vec<PipelineOutputAlias>, KiaraError> {
    match spec {
        None => Ok(Vec::new()),
        Some(AliasSpec::Map(map)) => {
            let mut outputs = Vec::with_capacity(map.len());
            for (implicit_name, alias) in map {
                let (step_part, field_part) = implicit_name.split_once("__").ok_or_else(|| {
                    KiaraError::InvalidPipelineStepConfig(format!(
                        "output_aliases key '{implicit_name}' must be 'step__field'"
                    ))
                })?;
                outputs.push(PipelineOutputAlias {
                    alias: alias.clone(),
                    source: StepValueAddress::new(StepId::new(step_part)?, field_part),
                });
            }
            Ok(outputs)
        }
        Some(AliasSpec::Marker(marker)) if marker == "auto" => auto_outputs(modules, step_defs, Some(referenced_steps)),
        Some(AliasSpec::Marker(marker)) if marker == "auto_all_outputs" => auto_outputs(modules, step_defs, None),
        Some(AliasSpec::Marker(other)) => {
            Err(KiaraError::InvalidPipelineStepConfig(format!("unknown output_aliases marker '{other}'")))
        }
    }
}

/// Generates one `PipelineOutputAlias` per output field of every step,
/// skipping steps whose output some other step already consumes when
/// `skip_consumed` names the set of step ids to exclude.
fn auto_outputs(
    modules: &ModuleRegistry,
    step_defs: &[StepDefinition],
    skip_consumed: Option<&BTreeSet<StepId>>,
) -> Result<Vec<PipelineOutputAlias>, KiaraError> {
    let mut outputs = Vec::new();
    for step in step_defs {
        if let Some(consumed) = skip_consumed {
            if consumed.contains(&step.step_id) {
                continue;
            }
        }
        let module = modules.get(&step.manifest.module_type)?;
        let outputs_schema = module.outputs_schema(&step.manifest.module_config)?;
        for field in outputs_schema.keys() {
            outputs.push(PipelineOutputAlias {
                alias: format!("{}__{}", step.step_id, field),
                source: StepValueAddress::new(step.step_id.clone(), field.clone()),
            });
        }
    }
    Ok(outputs)
}
