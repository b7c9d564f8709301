// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Error System
//!
//! A single, hierarchical error type for the kiara domain, covering the
//! error kinds a module/value/pipeline engine can raise: unknown
//! modules/operations/data types, invalid manifests or pipeline steps,
//! invalid or missing input values, failed jobs, and archive-backend
//! failures. Errors are cloneable and categorized so infrastructure code can
//! decide retry policy without matching every variant.

use thiserror::Error;

/// Domain-specific errors for the kiara module/value/pipeline engine.
#[derive(Error, Debug, Clone)]
pub enum KiaraError {
    #[error("context is already locked by another process: {0}")]
    ContextLocked(String),

    #[error("unknown module type: {0}")]
    UnknownModuleType(String),

    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    #[error("unknown data type: {0}")]
    UnknownDataType(String),

    #[error("invalid manifest config: {0}")]
    InvalidManifestConfig(String),

    #[error("invalid pipeline step config: {0}")]
    InvalidPipelineStepConfig(String),

    #[error("input values invalid: {0}")]
    InputValuesInvalid(String),

    #[error("job failed: {0}")]
    JobFailed(String),

    #[error("job not finished yet: {0}")]
    JobNotReady(String),

    #[error("no such job: {0}")]
    UnknownJob(String),

    #[error("no such workflow: {0}")]
    NoSuchWorkflow(String),

    #[error("no such execution target: {0}")]
    NoSuchExecutionTarget(String),

    #[error("archive error: {0}")]
    ArchiveError(String),

    #[error("value not found: {0}")]
    ValueNotFound(String),

    #[error("alias not found: {0}")]
    AliasNotFound(String),

    #[error("alias already exists: {0}")]
    AliasConflict(String),

    #[error("cycle detected in pipeline step graph: {0}")]
    CyclicPipeline(String),

    #[error("serialization error: {0}")]
    SerializationError(String),

    #[error("io error: {0}")]
    IoError(String),

    #[error("cancelled: {0}")]
    Cancelled(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

impl KiaraError {
    pub fn invalid_manifest_config(msg: impl Into<String>) -> Self {
        Self::InvalidManifestConfig(msg.into())
    }

    pub fn input_values_invalid(msg: impl Into<String>) -> Self {
        Self::InputValuesInvalid(msg.into())
    }

    pub fn job_failed(msg: impl Into<String>) -> Self {
        Self::JobFailed(msg.into())
    }

    pub fn job_not_ready(msg: impl Into<String>) -> Self {
        Self::JobNotReady(msg.into())
    }

    pub fn archive_error(msg: impl Into<String>) -> Self {
        Self::ArchiveError(msg.into())
    }

    pub fn internal_error(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }

    /// Whether a transient retry (bounded exponential backoff, §7) is
    /// appropriate. Logical errors (schema/hash/cycle) are never retried.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, KiaraError::ArchiveError(_) | KiaraError::IoError(_))
    }

    pub fn category(&self) -> &'static str {
        match self {
            KiaraError::ContextLocked(_) => "context",
            KiaraError::UnknownModuleType(_) => "lookup",
            KiaraError::UnknownOperation(_) => "lookup",
            KiaraError::UnknownDataType(_) => "lookup",
            KiaraError::InvalidManifestConfig(_) => "configuration",
            KiaraError::InvalidPipelineStepConfig(_) => "configuration",
            KiaraError::InputValuesInvalid(_) => "validation",
            KiaraError::JobFailed(_) => "processing",
            KiaraError::JobNotReady(_) => "processing",
            KiaraError::UnknownJob(_) => "lookup",
            KiaraError::NoSuchWorkflow(_) => "lookup",
            KiaraError::NoSuchExecutionTarget(_) => "lookup",
            KiaraError::ArchiveError(_) => "archive",
            KiaraError::ValueNotFound(_) => "data",
            KiaraError::AliasNotFound(_) => "alias",
            KiaraError::AliasConflict(_) => "alias",
            KiaraError::CyclicPipeline(_) => "configuration",
            KiaraError::SerializationError(_) => "serialization",
            KiaraError::IoError(_) => "io",
            KiaraError::Cancelled(_) => "cancellation",
            KiaraError::InternalError(_) => "internal",
        }
    }
}

impl From<std::io::Error> for KiaraError {
    fn from(err: std::io::Error) -> Self {
        KiaraError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for KiaraError {
    fn from(err: serde_json::Error) -> Self {
        KiaraError::SerializationError(err.to_string())
    }
}
