// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Worker count value object
//!
//! Bounds the size of a job registry's CPU and IO worker pools (§6). Kiara
//! runs two independent semaphore-backed pools rather than file-size-tuned
//! concurrency: one for CPU-bound module execution, one for IO-bound module
//! execution, each sized from the host's available parallelism unless the
//! caller overrides it.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkerCount {
    count: usize,
}

impl WorkerCount {
    pub const MIN_WORKERS: usize = 1;
    pub const MAX_WORKERS: usize = 256;
    pub const DEFAULT_WORKERS: usize = 4;

    /// Clamps `count` into `[MIN_WORKERS, MAX_WORKERS]`.
    pub fn new(count: usize) -> Self {
        Self { count: count.clamp(Self::MIN_WORKERS, Self::MAX_WORKERS) }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Default CPU pool size: one worker per available core.
    pub fn default_cpu_pool() -> Self {
        let cores = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(Self::DEFAULT_WORKERS);
        Self::new(cores)
    }

    /// Default IO pool size: oversubscribed relative to cores, since IO-bound
    /// module execution spends most of its time blocked rather than
    /// scheduled (§6).
    pub fn default_io_pool() -> Self {
        let cores = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(Self::DEFAULT_WORKERS);
        Self::new(cores.saturating_mul(4))
    }
}

impl Default for WorkerCount {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WORKERS)
    }
}

impl fmt::Display for WorkerCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} workers", self.count)
    }
}

impl From<usize> for WorkerCount {
    fn from(count: usize) -> Self {
        Self::new(count)
    }
}

impl From<WorkerCount> for usize {
    fn from(worker_count: WorkerCount) -> Self {
        worker_count.count
    }
}
