// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Module executor port
//!
//! Runs one `Module` invocation against a bound `ValueMap` of inputs and
//! returns its outputs (§4, §6). Kept separate from the `Module` trait
//! itself (`services::module`) so the execution strategy -- inline,
//! CPU-pool, IO-pool, or a future out-of-process sandbox -- can vary
//! independently of module authoring.

use async_trait::async_trait;

use crate::entities::ValueMap;
use crate::error::KiaraError;
use crate::repositories::PayloadStore;

#[async_trait]
pub trait ModuleExecutor: Send + Sync {
    /// Runs `module_type` against `inputs`, returning its outputs. The
    /// executor is responsible for resource accounting (worker pool
    /// acquisition) around the call, not for result caching -- that is the
    /// job registry's job (§5). `data` is passed straight through to the
    /// module so it can read/write real payload bytes.
    async fn execute(
        &self,
        module_type: &str,
        module_config: &crate::value_objects::ModuleConfig,
        inputs: &ValueMap,
        data: &dyn PayloadStore,
    ) -> Result<ValueMap, KiaraError>;

    /// Whether `module_type` should run on the CPU pool (`true`) or the IO
    /// pool (`false`); used by the worker pool to route the job (§6).
    fn is_cpu_intensive(&self, module_type: &str) -> bool;

    /// Whether `module_type`'s runs are safe to memoize and dedupe (§4.6).
    fn is_idempotent(&self, module_type: &str) -> bool;
}
