// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Step value address
//!
//! Points at one field on one pipeline step -- the unit a `PipelineInput`
//! connection or a step's `input_links` refers to (§3, §5).

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

use super::step_id::StepId;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StepValueAddress {
    pub step_id: StepId,
    pub field_name: String,
    /// Optional dotted sub-path into a structured value (e.g. a dict field),
    /// mirrored from the original kiara's `sub_value` addressing.
    #[serde(default)]
    pub sub_value: Option<String>,
}

impl StepValueAddress {
    pub fn new(step_id: StepId, field_name: impl Into<String>) -> Self {
        Self { step_id, field_name: field_name.into(), sub_value: None }
    }

    pub fn with_sub_value(mut self, sub_value: impl Into<String>) -> Self {
        self.sub_value = Some(sub_value.into());
        self
    }
}

impl Display for StepValueAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sub_value {
            Some(sub) => write!(f, "{}.{}.{}", self.step_id, self.field_name, sub),
            None => write!(f, "{}.{}", self.step_id, self.field_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_sub_value_when_present() {
        let step = StepId::new("double").unwrap();
        let addr = StepValueAddress::new(step, "y");
        assert_eq!(addr.to_string(), "double.y");
        let addr = addr.with_sub_value("key");
        assert_eq!(addr.to_string(), "double.y.key");
    }
}
