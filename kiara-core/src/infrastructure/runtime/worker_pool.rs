// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Worker pool
//!
//! Two independent semaphore-backed pools govern concurrent module
//! execution system-wide: a CPU pool for `is_cpu_intensive` modules and an
//! IO pool for everything else. A module executor acquires a permit before
//! running and releases it (via RAII drop) once the module returns,
//! preventing a burst of concurrent job requests from oversubscribing the
//! host regardless of how many are in flight at the registry level.

use std::sync::Arc;

use kiara_domain::{KiaraError, WorkerCount};
use tokio::sync::{Semaphore, SemaphorePermit};

pub struct WorkerPool {
    cpu: Arc<Semaphore>,
    io: Arc<Semaphore>,
    cpu_count: WorkerCount,
    io_count: WorkerCount,
}

pub enum WorkerPermit<'a> {
    Cpu(SemaphorePermit<'a>),
    Io(SemaphorePermit<'a>),
}

impl WorkerPool {
    pub fn new(cpu_count: WorkerCount, io_count: WorkerCount) -> Self {
        Self {
            cpu: Arc::new(Semaphore::new(cpu_count.count())),
            io: Arc::new(Semaphore::new(io_count.count())),
            cpu_count,
            io_count,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(WorkerCount::default_cpu_pool(), WorkerCount::default_io_pool())
    }

    /// Acquires a permit from the pool matching `is_cpu_intensive`. Waits if
    /// the pool is saturated, which is the backpressure mechanism: a burst
    /// of job requests queues here rather than spawning unbounded tasks.
    pub async fn acquire(&self, is_cpu_intensive: bool) -> Result<WorkerPermit<'_>, KiaraError> {
        if is_cpu_intensive {
            self.cpu
                .acquire()
                .await
                .map(WorkerPermit::Cpu)
                .map_err(|_| KiaraError::internal_error("cpu worker pool closed"))
        } else {
            self.io
                .acquire()
                .await
                .map(WorkerPermit::Io)
                .map_err(|_| KiaraError::internal_error("io worker pool closed"))
        }
    }

    pub fn cpu_available(&self) -> usize {
        self.cpu.available_permits()
    }

    pub fn io_available(&self) -> usize {
        self.io.available_permits()
    }

    pub fn cpu_capacity(&self) -> WorkerCount {
        self.cpu_count
    }

    pub fn io_capacity(&self) -> WorkerCount {
        self.io_count
    }
}
