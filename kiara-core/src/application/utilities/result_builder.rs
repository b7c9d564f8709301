// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Generic job outcome builder
//!
//! Fluent construction of a registry-level operation outcome: input,
//! output, timing, warnings and an optional error, collected into one
//! immutable record instead of threading those fields through every
//! registry method by hand.

use std::collections::HashMap;
use std::fmt::Debug;
use std::time::Instant;

use kiara_domain::KiaraError;

/// An operation result a registry can build fluently. `JobRegistry`,
/// `PipelineRuntime` and friends each define a concrete `Metrics` type and
/// implement this trait on their own outcome struct.
pub trait OperationOutcome: Clone + Debug + Send + Sync + 'static {
    type Input: Clone + Debug + Send + Sync;
    type Output: Clone + Debug + Send + Sync;
    type Metrics: Clone + Debug + Default + Send + Sync;

    fn new(input: Self::Input, output: Self::Output) -> Self;
    fn input(&self) -> &Self::Input;
    fn output(&self) -> &Self::Output;
    fn metrics(&self) -> &Self::Metrics;
    fn with_metrics(self, metrics: Self::Metrics) -> Self;
    fn is_success(&self) -> bool;
    fn error(&self) -> Option<&KiaraError>;
}

#[derive(Debug, Clone)]
pub struct OutcomeBuilder<T>
where
    T: OperationOutcome,
{
    input: Option<T::Input>,
    output: Option<T::Output>,
    metrics: T::Metrics,
    error: Option<KiaraError>,
    started_at: Option<Instant>,
    finished_at: Option<Instant>,
    metadata: HashMap<String, String>,
    warnings: Vec<String>,
}

impl<T> Default for OutcomeBuilder<T>
where
    T: OperationOutcome,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> OutcomeBuilder<T>
where
    T: OperationOutcome,
{
    pub fn new() -> Self {
        Self {
            input: None,
            output: None,
            metrics: T::Metrics::default(),
            error: None,
            started_at: None,
            finished_at: None,
            metadata: HashMap::new(),
            warnings: Vec::new(),
        }
    }

    pub fn with_input(mut self, input: T::Input) -> Self {
        self.input = Some(input);
        self
    }

    pub fn with_output(mut self, output: T::Output) -> Self {
        self.output = Some(output);
        self
    }

    pub fn with_metrics(mut self, metrics: T::Metrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_error(mut self, error: KiaraError) -> Self {
        self.error = Some(error);
        self
    }

    pub fn started(mut self) -> Self {
        self.started_at = Some(Instant::now());
        self
    }

    pub fn finished(mut self) -> Self {
        self.finished_at = Some(Instant::now());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn elapsed(&self) -> Option<std::time::Duration> {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }

    pub fn metadata(&self) -> &HashMap<String, String> {
        &self.metadata
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Finalizes the builder into `T`, failing if input/output were never
    /// set for a successful outcome.
    pub fn build(self) -> Result<T, KiaraError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        let input = self
            .input
            .ok_or_else(|| KiaraError::internal_error("outcome builder missing input"))?;
        let output = self
            .output
            .ok_or_else(|| KiaraError::internal_error("outcome builder missing output"))?;
        Ok(T::new(input, output).with_metrics(self.metrics))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default)]
    struct DummyMetrics {
        duration_ms: u64,
    }

    #[derive(Debug, Clone)]
    struct DummyOutcome {
        input: String,
        output: String,
        metrics: DummyMetrics,
    }

    impl OperationOutcome for DummyOutcome {
        type Input = String;
        type Output = String;
        type Metrics = DummyMetrics;

        fn new(input: Self::Input, output: Self::Output) -> Self {
            Self { input, output, metrics: DummyMetrics::default() }
        }
        fn input(&self) -> &Self::Input {
            &self.input
        }
        fn output(&self) -> &Self::Output {
            &self.output
        }
        fn metrics(&self) -> &Self::Metrics {
            &self.metrics
        }
        fn with_metrics(mut self, metrics: Self::Metrics) -> Self {
            self.metrics = metrics;
            self
        }
        fn is_success(&self) -> bool {
            true
        }
        fn error(&self) -> Option<&KiaraError> {
            None
        }
    }

    #[test]
    fn builds_a_successful_outcome() {
        let outcome: DummyOutcome = OutcomeBuilder::new()
            .with_input("in".to_string())
            .with_output("out".to_string())
            .with_metrics(DummyMetrics { duration_ms: 10 })
            .build()
            .unwrap();
        assert_eq!(outcome.input(), "in");
        assert_eq!(outcome.metrics().duration_ms, 10);
    }

    #[test]
    fn propagates_the_error_instead_of_building() {
        let result: Result<DummyOutcome, _> =
            OutcomeBuilder::new().with_error(KiaraError::job_failed("boom")).build();
        assert!(result.is_err());
    }

    #[test]
    fn missing_output_is_an_internal_error() {
        let result: Result<DummyOutcome, _> = OutcomeBuilder::new().with_input("in".to_string()).build();
        assert!(result.is_err());
    }
}
