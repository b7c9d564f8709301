// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Kiara core
//!
//! The `tokio`-backed application and infrastructure layers that turn
//! `kiara-domain`'s pure types into a running content-addressed value graph
//! and pipeline execution engine:
//!
//! - [`application`] -- the data type, module, operation, data, alias and
//!   job registries, plus the pipeline runtime that drives a
//!   `PipelineStructure` through them.
//! - [`infrastructure`] -- concrete archive backends (in-memory, SQLite),
//!   built-in data types, the worker pool, config loading, logging and
//!   metrics, composed by [`infrastructure::KiaraContext`].
//!
//! Most callers only need [`KiaraContext::build`] and the registries hung
//! off it; the individual modules stay public for callers assembling a
//! custom context, e.g. a test harness that swaps in a fake `ModuleExecutor`.

pub mod application;
pub mod infrastructure;

pub use application::services::{
    load_pipeline_file, parse_config_str, parse_pipeline_structure, AliasRegistry, DataRegistry, DataTypeRegistry,
    JobRegistry, LoadedPipeline, ModuleRegistry, OperationRegistry, PipelineConfigFile, PipelineRuntime,
};
pub use application::utilities::{OperationOutcome, OutcomeBuilder};
pub use infrastructure::{ArchiveBackend, KiaraConfig, KiaraContext, MetricsService, WorkerPool};

pub use kiara_domain::{
    canonical_hash, AliasArchive, DataArchive, DataType, Digest, GenericId, IdCategory, InputSource, JobArchive,
    JobConfig, JobId, JobRecord, JobStatus, KiaraError, KiaraResult, Manifest, Module, ModuleConfig, ModuleExecutor,
    PayloadStore, PipelineOutputAlias, PipelineStructure, ProcessingStage, RuntimeEvent, StepDefinition, StepId,
    StepValueAddress, TypeConfig, Value, ValueId, ValueMap, ValuePedigree, ValueSchema, ValueSize, ValueStatus,
    WorkerCount,
};
