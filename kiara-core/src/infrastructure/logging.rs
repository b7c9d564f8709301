// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Logging initialization
//!
//! Wires up `tracing-subscriber` with an env-filter driven by
//! `KIARA_LOG`/`RUST_LOG` (falling back to [`KiaraConfig::log_level`]), and
//! a structured operation tracker used by the job registry and pipeline
//! runtime to log start/completion of long-running work with consistent
//! fields.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use tracing_subscriber::{fmt, EnvFilter};

static LOGGING_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initializes the global tracing subscriber. Safe to call more than once;
/// only the first call takes effect, which matters for test binaries that
/// each construct a context.
pub fn init_logging(default_level: &str) {
    if LOGGING_INITIALIZED.swap(true, Ordering::SeqCst) {
        return;
    }

    let filter = EnvFilter::try_from_env("KIARA_LOG")
        .or_else(|_| EnvFilter::try_from_env("RUST_LOG"))
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt().with_env_filter(filter).with_target(true).init();
}

/// Tracks one in-flight operation (a job execution, a pipeline run) for
/// structured start/complete logging with a consistent duration field.
pub struct OperationTracker {
    name: String,
    started_at: Instant,
}

impl OperationTracker {
    pub fn start(name: impl Into<String>) -> Self {
        let name = name.into();
        tracing::debug!(operation = %name, "operation started");
        Self { name, started_at: Instant::now() }
    }

    pub fn complete(self, success: bool) {
        let elapsed = self.started_at.elapsed();
        if success {
            tracing::info!(operation = %self.name, duration_ms = elapsed.as_millis(), "operation completed");
        } else {
            tracing::warn!(operation = %self.name, duration_ms = elapsed.as_millis(), "operation failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_tracker_measures_elapsed_time() {
        let tracker = OperationTracker::start("test-op");
        std::thread::sleep(std::time::Duration::from_millis(1));
        tracker.complete(true);
    }
}
