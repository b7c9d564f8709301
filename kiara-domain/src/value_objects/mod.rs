// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Value objects
//!
//! Immutable, self-validating types with no identity of their own (DDD value
//! object pattern, carried over from the teacher codebase's domain layer).
//! Identity types (`ValueId`, `JobId`, `StepId`) live here too since they are
//! still plain equality-comparable wrappers rather than aggregates.

pub mod digest;
pub mod generic_id;
pub mod job_config;
pub mod manifest;
pub mod pedigree;
pub mod processing_stage;
pub mod step_id;
pub mod step_value_address;
pub mod value_id;
pub mod value_schema;
pub mod value_size;
pub mod value_status;
pub mod worker_count;

pub use digest::{canonical_bytes, canonical_hash, combine, hash_bytes, Digest};
pub use generic_id::{GenericId, IdCategory};
pub use job_config::JobConfig;
pub use manifest::{Manifest, ModuleConfig};
pub use pedigree::ValuePedigree;
pub use processing_stage::ProcessingStage;
pub use step_id::StepId;
pub use step_value_address::StepValueAddress;
pub use value_id::{JobId, ValueId};
pub use value_schema::{TypeConfig, ValueSchema};
pub use value_size::ValueSize;
pub use value_status::ValueStatus;
pub use worker_count::WorkerCount;
