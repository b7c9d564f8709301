// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Value pedigree
//!
//! Records which module, with which inputs, produced a `Value` -- or that
//! it was supplied directly by a caller (`ORPHAN`). `environment_hashes` is
//! carried from the original kiara implementation
//! (`kiara.models.values.value.ValuePedigree.environments`) and resolves
//! Open Question 3 (§9): `inputs_hash` folds the environment digest in, so a
//! changed runtime environment is a cache miss rather than a silent stale
//! hit (see DESIGN.md).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::digest::{canonical_hash, combine, Digest};
use super::value_id::ValueId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuePedigree {
    pub kiara_id: String,
    pub manifest_hash: Digest,
    pub inputs: BTreeMap<String, ValueId>,
    pub environment_hashes: BTreeMap<String, Digest>,
}

impl ValuePedigree {
    pub fn new(
        kiara_id: impl Into<String>,
        manifest_hash: Digest,
        inputs: BTreeMap<String, ValueId>,
        environment_hashes: BTreeMap<String, Digest>,
    ) -> Self {
        Self { kiara_id: kiara_id.into(), manifest_hash, inputs, environment_hashes }
    }

    /// An `ORPHAN` pedigree denotes externally supplied data (§3): no
    /// manifest produced it, so `manifest_hash` is the hash of the empty
    /// manifest marker and `inputs` is empty.
    pub fn orphan(kiara_id: impl Into<String>) -> Self {
        Self {
            kiara_id: kiara_id.into(),
            manifest_hash: canonical_hash(&"ORPHAN"),
            inputs: BTreeMap::new(),
            environment_hashes: BTreeMap::new(),
        }
    }

    pub fn is_orphan(&self) -> bool {
        self.manifest_hash == canonical_hash(&"ORPHAN")
    }

    /// Folds the manifest hash, sorted input value ids, and environment
    /// digests into the `inputs_hash` used as the job registry's cache key
    /// component (§3, §9 Open Question 3).
    pub fn inputs_hash(&self) -> Digest {
        let inputs_digest = canonical_hash(&self.inputs);
        let env_digest = canonical_hash(&self.environment_hashes);
        combine(&[&self.manifest_hash, &inputs_digest, &env_digest])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orphan_pedigrees_share_a_manifest_hash() {
        let a = ValuePedigree::orphan("ctx-1");
        let b = ValuePedigree::orphan("ctx-2");
        assert_eq!(a.manifest_hash, b.manifest_hash);
        assert!(a.is_orphan());
    }

    #[test]
    fn inputs_hash_changes_with_environment() {
        let manifest_hash = canonical_hash(&"const_int");
        let mut envs_a = BTreeMap::new();
        envs_a.insert("python".to_string(), canonical_hash(&"3.11"));
        let mut envs_b = BTreeMap::new();
        envs_b.insert("python".to_string(), canonical_hash(&"3.12"));

        let a = ValuePedigree::new("ctx", manifest_hash, BTreeMap::new(), envs_a);
        let b = ValuePedigree::new("ctx", manifest_hash, BTreeMap::new(), envs_b);
        assert_ne!(a.inputs_hash(), b.inputs_hash());
    }
}
