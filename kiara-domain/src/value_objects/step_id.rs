// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Step identifier value object
//!
//! Unlike `ValueId`/`JobId`, a step id is not generated — it is the author's
//! own label for a `PipelineStep` (`"add"`, `"dbl"`, ...), required to be
//! unique within a pipeline and never contain `.`, since ref paths use `.`
//! as a separator (`steps.<step_id>.inputs.<field>`, §4.5).

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

use crate::KiaraError;

#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct StepId(String);

impl StepId {
    pub fn new(raw: impl Into<String>) -> Result<Self, KiaraError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(KiaraError::InvalidPipelineStepConfig("step_id must not be empty".into()));
        }
        if raw.contains('.') {
            return Err(KiaraError::InvalidPipelineStepConfig(format!(
                "step_id '{}' must not contain '.'",
                raw
            )));
        }
        Ok(Self(raw))
    }

    /// Auto-generates a step id from a module type when the pipeline config
    /// omits `step_id` (§6), disambiguated with a numeric suffix by the
    /// caller when the bare name collides.
    pub fn from_module_type(module_type: &str, disambiguator: Option<usize>) -> Result<Self, KiaraError> {
        let sanitized: String = module_type
            .chars()
            .map(|c| if c == '.' { '_' } else { c })
            .collect();
        match disambiguator {
            Some(n) => Self::new(format!("{sanitized}_{n}")),
            None => Self::new(sanitized),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for StepId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_dotted_step_ids() {
        assert!(StepId::new("a.b").is_err());
    }

    #[test]
    fn rejects_empty_step_ids() {
        assert!(StepId::new("").is_err());
    }

    #[test]
    fn accepts_plain_names() {
        assert_eq!(StepId::new("add").unwrap().as_str(), "add");
    }

    #[test]
    fn auto_generated_ids_sanitize_dots_and_disambiguate() {
        let a = StepId::from_module_type("pkg.module", None).unwrap();
        assert_eq!(a.as_str(), "pkg_module");
        let b = StepId::from_module_type("pkg.module", Some(2)).unwrap();
        assert_eq!(b.as_str(), "pkg_module_2");
    }
}
