// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Value schema value object
//!
//! `ValueSchema` names a `DataType` plus its type-config and field-level
//! defaults (§3). Its hash is `hash(type_name, canonical(type_config))`,
//! independent of `default`/`optional`/`doc` — two schemas that differ only
//! in documentation or default value are the *same* schema for hashing
//! purposes, since those don't change what data the field can hold.

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::collections::BTreeMap;

use super::digest::{canonical_hash, Digest};

pub type TypeConfig = BTreeMap<String, Json>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueSchema {
    pub type_name: String,
    #[serde(default)]
    pub type_config: TypeConfig,
    #[serde(default)]
    pub default: Option<Json>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub is_constant: bool,
    #[serde(default)]
    pub doc: Option<String>,
}

impl ValueSchema {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            type_config: TypeConfig::new(),
            default: None,
            optional: false,
            is_constant: false,
            doc: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn with_default(mut self, default: Json) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// A schema is required iff `optional = false` and no default is set (§3).
    pub fn is_required(&self) -> bool {
        !self.optional && self.default.is_none()
    }

    pub fn schema_hash(&self) -> Digest {
        canonical_hash(&(&self.type_name, &self.type_config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_iff_not_optional_and_no_default() {
        assert!(ValueSchema::new("integer").is_required());
        assert!(!ValueSchema::new("integer").optional().is_required());
        assert!(!ValueSchema::new("integer").with_default(Json::from(0)).is_required());
    }

    #[test]
    fn schema_hash_ignores_doc_and_default() {
        let a = ValueSchema::new("integer").with_doc("a count");
        let b = ValueSchema::new("integer").with_default(Json::from(3));
        assert_eq!(a.schema_hash(), b.schema_hash());
    }

    #[test]
    fn schema_hash_differs_by_type_config() {
        let mut a = ValueSchema::new("list");
        a.type_config.insert("item_type".into(), Json::from("integer"));
        let b = ValueSchema::new("list");
        assert_ne!(a.schema_hash(), b.schema_hash());
    }
}
