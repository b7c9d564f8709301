// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain events

pub mod domain_event;
pub mod runtime_events;

pub use domain_event::DomainEvent;
pub use runtime_events::{
    PipelineInputChanged, PipelineOutputChanged, RuntimeEvent, StepInputChanged, StepOutputChanged,
};
