// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Runtime resource governance
//!
//! The worker pool that every `ModuleExecutor` call acquires a permit from
//! before running a module's `process` body.

pub mod worker_pool;

pub use worker_pool::WorkerPool;
