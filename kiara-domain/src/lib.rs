// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Kiara domain layer
//!
//! Pure, synchronous, dependency-free-of-`tokio` business logic for the
//! content-addressed value graph and pipeline DAG engine, laid out by
//! Domain-Driven Design layer:
//!
//! - [`value_objects`] -- immutable, self-validating types with no identity
//!   (`ValueId`, `Manifest`, `Digest`, `ValueSchema`, ...)
//! - [`entities`] -- mutable, identity-bearing objects (`Value`, `JobRecord`)
//! - [`aggregates`] -- consistency boundaries spanning multiple entities
//!   (`PipelineStructure`)
//! - [`events`] -- the runtime's causal change-propagation events
//! - [`repositories`] -- ports the infrastructure layer implements
//!   (`DataArchive`, `AliasArchive`, `JobArchive`, `ModuleExecutor`, `PayloadStore`)
//! - [`services`] -- stateless domain contracts (`DataType`, `Module`)
//!
//! Async traits exist here only as *ports*: this crate never touches a
//! runtime, a socket, or a filesystem path directly. `kiara-core` is where
//! those ports get concrete, tokio-backed bodies.

pub mod aggregates;
pub mod entities;
pub mod error;
pub mod events;
pub mod repositories;
pub mod services;
pub mod value_objects;

pub use error::KiaraError;

pub use aggregates::{InputSource, PipelineOutputAlias, PipelineStructure, StepDefinition};
pub use entities::{JobRecord, JobStatus, Value, ValueMap};
pub use events::{
    DomainEvent, PipelineInputChanged, PipelineOutputChanged, RuntimeEvent, StepInputChanged, StepOutputChanged,
};
pub use repositories::{AliasArchive, DataArchive, JobArchive, ModuleExecutor, PayloadStore};
pub use services::{DataType, Module};
pub use value_objects::{
    canonical_hash, Digest, GenericId, IdCategory, JobConfig, JobId, Manifest, ModuleConfig, ProcessingStage,
    StepId, StepValueAddress, TypeConfig, ValueId, ValuePedigree, ValueSchema, ValueSize, ValueStatus, WorkerCount,
};

pub type KiaraResult<T> = Result<T, KiaraError>;
