// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Metrics service
//!
//! Prometheus-based counters and gauges for job registry and archive
//! observability: jobs run vs. served from cache, job duration, active
//! worker pool saturation, and archive errors. Thread-safe, low overhead,
//! exported via [`MetricsService::registry`] for a `/metrics` endpoint
//! wired up by the bootstrap crate.

use std::sync::Arc;

use prometheus::{Histogram, HistogramOpts, IntCounter, IntGauge, Opts, Registry};
use tracing::debug;

use kiara_domain::KiaraError;

#[derive(Clone)]
pub struct MetricsService {
    registry: Arc<Registry>,

    jobs_submitted_total: IntCounter,
    jobs_cache_hit_total: IntCounter,
    jobs_executed_total: IntCounter,
    jobs_failed_total: IntCounter,
    job_duration_seconds: Histogram,

    values_registered_total: IntCounter,
    archive_errors_total: IntCounter,

    cpu_workers_busy: IntGauge,
    io_workers_busy: IntGauge,
}

impl MetricsService {
    pub fn new() -> Result<Self, KiaraError> {
        let registry = Registry::new();

        let jobs_submitted_total = IntCounter::with_opts(
            Opts::new("jobs_submitted_total", "Total job requests submitted to the registry").namespace("kiara"),
        )
        .map_err(registration_error)?;

        let jobs_cache_hit_total = IntCounter::with_opts(
            Opts::new("jobs_cache_hit_total", "Job requests served from a prior job record").namespace("kiara"),
        )
        .map_err(registration_error)?;

        let jobs_executed_total = IntCounter::with_opts(
            Opts::new("jobs_executed_total", "Job requests that ran a module to completion").namespace("kiara"),
        )
        .map_err(registration_error)?;

        let jobs_failed_total = IntCounter::with_opts(
            Opts::new("jobs_failed_total", "Job requests that finished in a Failed status").namespace("kiara"),
        )
        .map_err(registration_error)?;

        let job_duration_seconds = Histogram::with_opts(
            HistogramOpts::new("job_duration_seconds", "Wall-clock duration of executed jobs")
                .namespace("kiara")
                .buckets(vec![0.001, 0.01, 0.1, 0.5, 1.0, 5.0, 30.0, 120.0]),
        )
        .map_err(registration_error)?;

        let values_registered_total = IntCounter::with_opts(
            Opts::new("values_registered_total", "Values registered into the data archive").namespace("kiara"),
        )
        .map_err(registration_error)?;

        let archive_errors_total = IntCounter::with_opts(
            Opts::new("archive_errors_total", "Archive operations that returned an error").namespace("kiara"),
        )
        .map_err(registration_error)?;

        let cpu_workers_busy = IntGauge::with_opts(
            Opts::new("cpu_workers_busy", "CPU worker pool permits currently held").namespace("kiara"),
        )
        .map_err(registration_error)?;

        let io_workers_busy =
            IntGauge::with_opts(Opts::new("io_workers_busy", "IO worker pool permits currently held").namespace("kiara"))
                .map_err(registration_error)?;

        for metric in [
            Box::new(jobs_submitted_total.clone()) as Box<dyn prometheus::core::Collector>,
            Box::new(jobs_cache_hit_total.clone()),
            Box::new(jobs_executed_total.clone()),
            Box::new(jobs_failed_total.clone()),
            Box::new(job_duration_seconds.clone()),
            Box::new(values_registered_total.clone()),
            Box::new(archive_errors_total.clone()),
            Box::new(cpu_workers_busy.clone()),
            Box::new(io_workers_busy.clone()),
        ] {
            registry.register(metric).map_err(registration_error)?;
        }

        debug!("metrics service initialized");

        Ok(Self {
            registry: Arc::new(registry),
            jobs_submitted_total,
            jobs_cache_hit_total,
            jobs_executed_total,
            jobs_failed_total,
            job_duration_seconds,
            values_registered_total,
            archive_errors_total,
            cpu_workers_busy,
            io_workers_busy,
        })
    }

    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    pub fn record_job_submitted(&self) {
        self.jobs_submitted_total.inc();
    }

    pub fn record_cache_hit(&self) {
        self.jobs_cache_hit_total.inc();
    }

    pub fn record_job_executed(&self, duration: std::time::Duration) {
        self.jobs_executed_total.inc();
        self.job_duration_seconds.observe(duration.as_secs_f64());
    }

    pub fn record_job_failed(&self) {
        self.jobs_failed_total.inc();
    }

    pub fn record_value_registered(&self) {
        self.values_registered_total.inc();
    }

    pub fn record_archive_error(&self) {
        self.archive_errors_total.inc();
    }

    pub fn set_worker_saturation(&self, cpu_busy: i64, io_busy: i64) {
        self.cpu_workers_busy.set(cpu_busy);
        self.io_workers_busy.set(io_busy);
    }
}

fn registration_error(err: prometheus::Error) -> KiaraError {
    KiaraError::internal_error(format!("failed to register metric: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero_and_increment() {
        let metrics = MetricsService::new().unwrap();
        metrics.record_job_submitted();
        metrics.record_cache_hit();
        let families = metrics.registry().gather();
        assert!(!families.is_empty());
    }
}
