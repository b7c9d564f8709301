// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Module service
//!
//! Contract every pipeline-step module implements (§4): declare its input
//! and output schemas given a `module_config`, and process a bound
//! `ValueMap` of inputs into a `ValueMap` of outputs, reading and writing
//! real payload bytes through a `PayloadStore`. Modules are pure functions
//! of `(module_config, inputs, stored data)` (invariant, §4) -- no ambient
//! state, no side effects beyond their return value and whatever they write
//! through the store.

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::entities::ValueMap;
use crate::error::KiaraError;
use crate::repositories::PayloadStore;
use crate::value_objects::{ModuleConfig, ValueSchema};

#[async_trait]
pub trait Module: Send + Sync {
    fn module_type(&self) -> &'static str;

    /// Declares input field schemas for a given config. May depend on
    /// `module_config` (e.g. a config value selecting how many input slots
    /// a variadic module exposes), but never on runtime input values.
    fn inputs_schema(&self, module_config: &ModuleConfig) -> Result<BTreeMap<String, ValueSchema>, KiaraError>;

    fn outputs_schema(&self, module_config: &ModuleConfig) -> Result<BTreeMap<String, ValueSchema>, KiaraError>;

    /// Runs the module's computation. Implementations must be
    /// deterministic in `(module_config, inputs)` so the job registry's
    /// memoization (§5) is sound: the same inputs_hash must always be safe
    /// to serve from cache. `data` is how a module reads an input's actual
    /// bytes and writes a freshly computed output's bytes; a field wired as
    /// a constant never appears in `inputs` and must be read from
    /// `module_config` instead.
    async fn process(
        &self,
        module_config: &ModuleConfig,
        inputs: &ValueMap,
        data: &dyn PayloadStore,
    ) -> Result<ValueMap, KiaraError>;

    /// Whether this module type is CPU-bound (routed to the CPU worker
    /// pool) or IO-bound (routed to the IO pool); defaults to CPU-bound.
    fn is_cpu_intensive(&self) -> bool {
        true
    }

    /// Whether two runs with identical `(module_config, inputs)` always
    /// produce the same result and are therefore safe to memoize (§4.6). A
    /// module with effects outside its return value (a clock read, a random
    /// draw, an external call) must override this to `false` so the job
    /// registry never caches or dedupes its runs.
    fn is_idempotent(&self) -> bool {
        true
    }
}
