// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Manifest value object
//!
//! A `Manifest` is the canonical `(module_type, module_config)` identity of a
//! pure function (§3). Two manifests with the same `manifest_hash` denote
//! the same module invocation regardless of how many times they are
//! constructed, which is what lets the job registry treat `manifest_hash` as
//! a cache key component.

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::collections::BTreeMap;

use super::digest::{canonical_hash, Digest};

/// Module configuration: an arbitrary, JSON-representable parameter map.
/// `BTreeMap` keeps iteration order deterministic even before canonical
/// hashing sorts keys again, which makes debugging easier.
pub type ModuleConfig = BTreeMap<String, Json>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub module_type: String,
    pub module_config: ModuleConfig,
}

impl Manifest {
    pub fn new(module_type: impl Into<String>, module_config: ModuleConfig) -> Self {
        Self { module_type: module_type.into(), module_config }
    }

    pub fn bare(module_type: impl Into<String>) -> Self {
        Self::new(module_type, ModuleConfig::new())
    }

    /// `manifest_hash = hash(module_type, canonical(module_config))` (§3).
    pub fn manifest_hash(&self) -> Digest {
        canonical_hash(&(&self.module_type, &self.module_config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_module_type_and_config_hash_equal_regardless_of_insertion_order() {
        let mut cfg_a = ModuleConfig::new();
        cfg_a.insert("value".into(), Json::from(5));
        cfg_a.insert("scale".into(), Json::from(1));

        let mut cfg_b = ModuleConfig::new();
        cfg_b.insert("scale".into(), Json::from(1));
        cfg_b.insert("value".into(), Json::from(5));

        let a = Manifest::new("const_int", cfg_a);
        let b = Manifest::new("const_int", cfg_b);
        assert_eq!(a.manifest_hash(), b.manifest_hash());
    }

    #[test]
    fn different_config_yields_different_hash() {
        let mut cfg = ModuleConfig::new();
        cfg.insert("value".into(), Json::from(5));
        let a = Manifest::new("const_int", cfg.clone());
        cfg.insert("value".into(), Json::from(6));
        let b = Manifest::new("const_int", cfg);
        assert_ne!(a.manifest_hash(), b.manifest_hash());
    }
}
