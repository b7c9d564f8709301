// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Job archive port
//!
//! Storage contract for `JobRecord`s, keyed by the `inputs_hash` the job
//! registry uses for memoization (§5). Persisting job records across
//! restarts lets a context skip recomputation even after a process
//! restart, not just within one process's in-flight singleflight group.

use async_trait::async_trait;

use crate::entities::JobRecord;
use crate::error::KiaraError;
use crate::value_objects::{Digest, JobId};

#[async_trait]
pub trait JobArchive: Send + Sync {
    async fn store_job(&self, record: JobRecord) -> Result<(), KiaraError>;

    async fn load_job(&self, job_id: JobId) -> Result<JobRecord, KiaraError>;

    /// Looks up a prior successful job by its cache key, for memoization.
    async fn find_by_inputs_hash(&self, inputs_hash: Digest) -> Result<Option<JobRecord>, KiaraError>;
}
