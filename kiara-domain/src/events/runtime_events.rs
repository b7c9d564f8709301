// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Runtime change-propagation events
//!
//! A pipeline run is driven by a fixed causal chain (Design Notes, §5):
//! `PipelineInputChanged` -> `StepInputChanged` -> `StepOutputChanged` ->
//! `PipelineOutputChanged`. The runtime engine (outside this crate) wires
//! these together over channels; this module defines the payload shapes and
//! the envelope they travel in.

use serde::{Deserialize, Serialize};

use crate::value_objects::{StepId, ValueId};

use super::domain_event::DomainEvent;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineInputChanged {
    pub field: String,
    pub value_id: ValueId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepInputChanged {
    pub step_id: StepId,
    pub field: String,
    pub value_id: ValueId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepOutputChanged {
    pub step_id: StepId,
    pub field: String,
    pub value_id: ValueId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutputChanged {
    pub alias: String,
    pub value_id: ValueId,
}

/// A runtime event, tagged by which stage of the causal chain produced it.
/// The job registry and pipeline runtime both consume this enum: the former
/// to know when a step's inputs are complete enough to schedule a job, the
/// latter to know when a pipeline output is ready to report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RuntimeEvent {
    PipelineInputChanged(DomainEvent<PipelineInputChanged>),
    StepInputChanged(DomainEvent<StepInputChanged>),
    StepOutputChanged(DomainEvent<StepOutputChanged>),
    PipelineOutputChanged(DomainEvent<PipelineOutputChanged>),
}

impl RuntimeEvent {
    pub fn event_id(&self) -> uuid::Uuid {
        match self {
            RuntimeEvent::PipelineInputChanged(e) => e.event_id,
            RuntimeEvent::StepInputChanged(e) => e.event_id,
            RuntimeEvent::StepOutputChanged(e) => e.event_id,
            RuntimeEvent::PipelineOutputChanged(e) => e.event_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_step_input_event_can_cause_a_step_output_event() {
        let input_changed = DomainEvent::new(StepInputChanged {
            step_id: StepId::new("double").unwrap(),
            field: "x".into(),
            value_id: ValueId::new(),
        });
        let output_changed = DomainEvent::new(StepOutputChanged {
            step_id: StepId::new("double").unwrap(),
            field: "y".into(),
            value_id: ValueId::new(),
        })
        .caused_by(input_changed.event_id);

        let chain = RuntimeEvent::StepOutputChanged(output_changed);
        assert!(matches!(chain, RuntimeEvent::StepOutputChanged(_)));
    }
}
