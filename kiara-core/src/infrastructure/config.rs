// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Runtime configuration
//!
//! Layered configuration for a `KiaraContext`: built-in defaults, an
//! optional `kiara.toml`/`kiara.yaml` file, then `KIARA_*` environment
//! variables, in increasing priority. Only the ambient knobs a running
//! context needs live here -- worker pool sizing, archive backend
//! selection, and the log level -- not pipeline or module configuration,
//! which flows through `Manifest`/`ModuleConfig` instead.

use serde::{Deserialize, Serialize};

use kiara_domain::KiaraError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveBackend {
    Memory,
    Sqlite { path: String },
}

impl Default for ArchiveBackend {
    fn default() -> Self {
        ArchiveBackend::Memory
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KiaraConfig {
    #[serde(default)]
    pub archive: ArchiveBackend,
    #[serde(default)]
    pub cpu_workers: Option<usize>,
    #[serde(default)]
    pub io_workers: Option<usize>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for KiaraConfig {
    fn default() -> Self {
        Self { archive: ArchiveBackend::default(), cpu_workers: None, io_workers: None, log_level: default_log_level() }
    }
}

impl KiaraConfig {
    /// Loads defaults, then an optional config file at `path`, then
    /// `KIARA_*` environment variable overrides (`KIARA_LOG_LEVEL`,
    /// `KIARA_CPU_WORKERS`, ...).
    pub fn load(path: Option<&str>) -> Result<Self, KiaraError> {
        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default()).map_err(config_error)?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(config::Environment::with_prefix("KIARA").separator("_"));

        let built = builder.build().map_err(config_error)?;
        built.try_deserialize().map_err(config_error)
    }
}

fn config_error(err: config::ConfigError) -> KiaraError {
    KiaraError::invalid_manifest_config(format!("failed to load configuration: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_load_without_a_config_file() {
        let config = KiaraConfig::load(None).unwrap();
        assert_eq!(config.log_level, "info");
        assert!(matches!(config.archive, ArchiveBackend::Memory));
    }
}
