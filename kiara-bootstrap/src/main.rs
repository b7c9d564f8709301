// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Entry point: parses the CLI, builds a `KiaraContext` over the demo
//! modules, loads a pipeline config file, runs it, and prints the
//! resolved output aliases. A Ctrl-C during the run initiates graceful
//! shutdown through `ShutdownCoordinator`, though with no long-running
//! background tasks of its own this binary's only use for it is to log
//! that a signal arrived before the run's own result is reported.

use std::collections::BTreeMap;
use std::process::ExitCode;
use std::sync::Arc;

use serde_json::Value as Json;

use kiara_bootstrap::demo_modules::{AddConstant, Identity};
use kiara_bootstrap::{cli, create_platform, ShutdownCoordinator};
use kiara_core::infrastructure::logging::init_logging;
use kiara_core::{load_pipeline_file, KiaraConfig, KiaraContext, KiaraError, ModuleRegistry};
use kiara_domain::value_objects::{ValueId, ValueSchema};

fn infer_schema(value: &Json) -> ValueSchema {
    match value {
        Json::Number(n) if n.is_i64() || n.is_u64() => ValueSchema::new("integer"),
        Json::Number(_) => ValueSchema::new("float"),
        Json::String(_) => ValueSchema::new("string"),
        Json::Bool(_) => ValueSchema::new("boolean"),
        Json::Array(_) => ValueSchema::new("list"),
        Json::Null | Json::Object(_) => ValueSchema::new("any"),
    }
}

fn demo_modules() -> ModuleRegistry {
    let mut modules = ModuleRegistry::new();
    modules.register(Arc::new(Identity));
    modules.register(Arc::new(AddConstant));
    modules
}

async fn run(args: &cli::Cli, config: &KiaraConfig) -> Result<BTreeMap<String, ValueId>, KiaraError> {
    let context = KiaraContext::build_with_modules(config, demo_modules()).await?;

    let loaded = load_pipeline_file(&args.pipeline_file, &context.modules)?;
    tracing::info!(pipeline = %loaded.pipeline_name, "loaded pipeline");

    let mut pipeline_inputs: BTreeMap<String, ValueId> = BTreeMap::new();
    for (name, value) in loaded.default_inputs.iter().chain(args.inputs.iter().map(|(n, v)| (n, v))) {
        let id = context.data.register_orphan("cli", infer_schema(value), value, false).await?;
        pipeline_inputs.insert(name.clone(), id);
    }

    context.pipelines.run(&loaded.structure, pipeline_inputs).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse_args();

    let mut config = match KiaraConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("failed to load configuration: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(level) = &args.log_level {
        config.log_level = level.clone();
    }

    init_logging(&config.log_level);

    let platform = create_platform();
    tracing::info!(platform = platform.platform_name(), cpu_count = platform.cpu_count(), "starting kiara");

    let shutdown = ShutdownCoordinator::default();
    let token = shutdown.token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown.initiate_shutdown();
            shutdown.complete_shutdown();
        }
    });

    match run(&args, &config).await {
        Ok(outputs) => {
            if token.is_cancelled() {
                tracing::warn!("shutdown signal received while the pipeline was running");
            }
            for (alias, value_id) in outputs {
                println!("{alias} = {value_id}");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "pipeline run failed");
            ExitCode::FAILURE
        }
    }
}
