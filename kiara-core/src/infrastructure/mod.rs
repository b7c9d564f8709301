// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Infrastructure layer
//!
//! Concrete, `tokio`-backed adapters for every port the domain layer
//! declares as a trait: archives, data types, the worker pool, config
//! loading, logging, and metrics. [`context`] is the composition root that
//! wires all of it together into one `KiaraContext`.

pub mod adapters;
pub mod archives;
pub mod config;
pub mod context;
pub mod logging;
pub mod metrics;
pub mod runtime;

pub use config::{ArchiveBackend, KiaraConfig};
pub use context::KiaraContext;
pub use metrics::MetricsService;
pub use runtime::WorkerPool;
