// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Value status
//!
//! `NOT_SET` and `NONE` both mean "no payload to observe" (invariant 2, §3)
//! but are not interchangeable: `NOT_SET` is a field that was never bound
//! and never satisfies a required schema; `NONE` is a module's explicit,
//! meaningful absence and does satisfy a required-but-optional-data field
//! (Open Question 2, §9 — resolved here, see DESIGN.md).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum ValueStatus {
    NotSet,
    None,
    Set,
    Default,
}

impl ValueStatus {
    /// Whether the caller may observe a real payload for this status.
    pub fn has_data(&self) -> bool {
        matches!(self, ValueStatus::Set | ValueStatus::Default)
    }

    /// Whether this status satisfies a field that schema-marks `optional =
    /// false` with no default (§3's "required" rule plus the `NONE`
    /// resolution above).
    pub fn satisfies_required(&self) -> bool {
        matches!(self, ValueStatus::Set | ValueStatus::Default | ValueStatus::None)
    }
}
