// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Canonical hashing framework
//!
//! One canonicalization function, one digest primitive, used by every
//! `Manifest`, `Value` and `JobConfig` id in the crate (Design Notes, §9:
//! "forbid ad-hoc hashing of maps"). Canonicalization sorts map keys
//! lexicographically, preserves sequence order, and passes numbers and
//! strings through unchanged; hashing is SHA-256 over the canonical bytes.

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use sha2::{Digest as _, Sha256};
use std::fmt::{self, Display};

/// A 32-byte SHA-256 digest, displayed and serialized as lowercase hex.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Digest([u8; 32]);

impl Digest {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, crate::KiaraError> {
        let bytes = hex::decode(s).map_err(|e| crate::KiaraError::SerializationError(e.to_string()))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| crate::KiaraError::SerializationError("digest must be 32 bytes".into()))?;
        Ok(Self(arr))
    }
}

impl Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for Digest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_hex().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Digest::from_hex(&s).map_err(|e| serde::de::Error::custom(e.to_string()))
    }
}

/// Serializes `value` into its canonical byte form: maps have their keys
/// sorted lexicographically and re-emitted in that order; sequences keep
/// their given order; numbers and strings are passed through as parsed.
/// This is the only place map canonicalization is allowed to happen.
pub fn canonical_bytes<T: Serialize>(value: &T) -> Vec<u8> {
    let json = serde_json::to_value(value).expect("value must be representable as JSON for canonical hashing");
    let mut buf = Vec::new();
    write_canonical(&json, &mut buf);
    buf
}

fn write_canonical(value: &Json, buf: &mut Vec<u8>) {
    match value {
        Json::Null => buf.push(0u8),
        Json::Bool(b) => {
            buf.push(1u8);
            buf.push(if *b { 1 } else { 0 });
        }
        Json::Number(n) => {
            buf.push(2u8);
            buf.extend_from_slice(n.to_string().as_bytes());
        }
        Json::String(s) => {
            buf.push(3u8);
            buf.extend_from_slice(&(s.len() as u64).to_le_bytes());
            buf.extend_from_slice(s.as_bytes());
        }
        Json::Array(items) => {
            buf.push(4u8);
            buf.extend_from_slice(&(items.len() as u64).to_le_bytes());
            for item in items {
                write_canonical(item, buf);
            }
        }
        Json::Object(map) => {
            buf.push(5u8);
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            buf.extend_from_slice(&(keys.len() as u64).to_le_bytes());
            for key in keys {
                buf.extend_from_slice(&(key.len() as u64).to_le_bytes());
                buf.extend_from_slice(key.as_bytes());
                write_canonical(&map[key], buf);
            }
        }
    }
}

/// Hashes `value` after canonicalizing it. Deterministic across process,
/// host byte order, and map-iteration order (§4.1).
pub fn canonical_hash<T: Serialize>(value: &T) -> Digest {
    let bytes = canonical_bytes(value);
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let out = hasher.finalize();
    let mut arr = [0u8; 32];
    arr.copy_from_slice(&out);
    Digest(arr)
}

/// Hashes raw bytes directly (used by `DataType::hash` implementations that
/// operate on a value's serialized payload rather than a JSON config map).
pub fn hash_bytes(data: &[u8]) -> Digest {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let out = hasher.finalize();
    let mut arr = [0u8; 32];
    arr.copy_from_slice(&out);
    Digest(arr)
}

/// Combines several digests into one, order-sensitive. Used to fold
/// `(manifest_hash, inputs...)` or `(schema_hash, value_hash)` into a single
/// id without re-serializing the originals.
pub fn combine(parts: &[&Digest]) -> Digest {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
    }
    let out = hasher.finalize();
    let mut arr = [0u8; 32];
    arr.copy_from_slice(&out);
    Digest(arr)
}
