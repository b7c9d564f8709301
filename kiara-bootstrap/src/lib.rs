// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Bootstrap
//!
//! The composition root that sits outside the domain/application/
//! infrastructure layers in `kiara-core`: command-line argument parsing, a
//! thin host-platform abstraction for worker pool sizing, and signal-driven
//! graceful shutdown. The `kiara` binary wires these together with
//! `kiara_core::KiaraContext` to load and run one pipeline config file.
//!
//! This is deliberately not a general CLI tool -- no sub-commands, no job
//! inspection, no archive management. Those stay out of scope; what's here
//! is the minimum a process needs to start up, run a pipeline, and shut
//! down cleanly on a signal.

pub mod cli;
pub mod demo_modules;
pub mod platform;
pub mod shutdown;

pub use cli::{parse_args, Cli};
pub use platform::{create_platform, HostPlatform, Platform};
pub use shutdown::{CancellationToken, ShutdownCoordinator};
