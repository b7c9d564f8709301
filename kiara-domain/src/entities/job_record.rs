// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Job record entity
//!
//! One memoized invocation of a module (§5): the `JobConfig` that was run,
//! its status, timing, and -- on success -- the `ValueId`s it produced. The
//! job registry keys job records by `JobConfig::inputs_hash` so identical
//! requests made while a job is in flight attach to the same record instead
//! of re-running the module (singleflight, §5).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::value_objects::{JobId, JobConfig, ValueId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed | JobStatus::Cancelled)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    job_id: JobId,
    config: JobConfig,
    status: JobStatus,
    created_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
    outputs: BTreeMap<String, ValueId>,
    error_message: Option<String>,
}

impl JobRecord {
    pub fn new(config: JobConfig) -> Self {
        Self {
            job_id: JobId::new(),
            config,
            status: JobStatus::Pending,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
            outputs: BTreeMap::new(),
            error_message: None,
        }
    }

    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn outputs(&self) -> &BTreeMap<String, ValueId> {
        &self.outputs
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn start(&mut self) {
        self.status = JobStatus::Running;
        self.started_at = Some(Utc::now());
    }

    pub fn succeed(&mut self, outputs: BTreeMap<String, ValueId>) {
        self.status = JobStatus::Succeeded;
        self.outputs = outputs;
        self.finished_at = Some(Utc::now());
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = JobStatus::Failed;
        self.error_message = Some(message.into());
        self.finished_at = Some(Utc::now());
    }

    pub fn cancel(&mut self) {
        self.status = JobStatus::Cancelled;
        self.finished_at = Some(Utc::now());
    }

    pub fn duration(&self) -> Option<chrono::Duration> {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }
}
