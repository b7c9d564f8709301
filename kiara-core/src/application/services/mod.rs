// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Application services
//!
//! The six registries that turn the domain layer's pure types into a
//! running system: data types and modules get registered once at startup,
//! data/alias/job records accumulate as the system runs, the pipeline
//! runtime ties a `PipelineStructure` to the job registry to actually
//! execute one, and the pipeline config loader turns an external config
//! file into a `PipelineStructure` in the first place.

pub mod alias_registry;
pub mod data_registry;
pub mod data_type_registry;
pub mod job_registry;
pub mod module_registry;
pub mod operation_registry;
pub mod pipeline_config;
pub mod pipeline_runtime;

pub use alias_registry::AliasRegistry;
pub use data_registry::DataRegistry;
pub use data_type_registry::DataTypeRegistry;
pub use job_registry::JobRegistry;
pub use module_registry::ModuleRegistry;
pub use operation_registry::OperationRegistry;
pub use pipeline_config::{load_pipeline_file, parse_config_str, parse_pipeline_structure, LoadedPipeline, PipelineConfigFile};
pub use pipeline_runtime::PipelineRuntime;
