// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Job configuration
//!
//! `JobConfig` is the job registry's cache key (§5): same manifest, same
//! input value ids, same environment -> same `inputs_hash` -> same job. The
//! environment digest is folded in per Open Question 3 (§9); see
//! `pedigree::ValuePedigree::inputs_hash` for the identical fold used when a
//! produced value records its own pedigree.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::digest::{canonical_hash, combine, Digest};
use super::manifest::Manifest;
use super::value_id::ValueId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    pub manifest: Manifest,
    pub inputs: BTreeMap<String, ValueId>,
    pub environment_hashes: BTreeMap<String, Digest>,
}

impl JobConfig {
    pub fn new(
        manifest: Manifest,
        inputs: BTreeMap<String, ValueId>,
        environment_hashes: BTreeMap<String, Digest>,
    ) -> Self {
        Self { manifest, inputs, environment_hashes }
    }

    /// Cache key for the job registry: deterministic, folds in the runtime
    /// environment so a changed environment forces recomputation rather than
    /// silently reusing a stale job record (§9 Open Question 3).
    pub fn inputs_hash(&self) -> Digest {
        let manifest_hash = self.manifest.manifest_hash();
        let inputs_digest = canonical_hash(&self.inputs);
        let env_digest = canonical_hash(&self.environment_hashes);
        combine(&[&manifest_hash, &inputs_digest, &env_digest])
    }
}
