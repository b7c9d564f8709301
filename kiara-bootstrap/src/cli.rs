// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Command-line arguments
//!
//! Just enough surface to run one pipeline config file to completion: the
//! file itself, an optional `KiaraConfig` file, `name=json` pairs for
//! pipeline inputs the config file doesn't default, and a log level
//! override. This is deliberately not the full CLI tool the rest of the
//! workspace stays out of scope of -- no sub-commands, no job inspection,
//! no benchmarking.

use std::path::PathBuf;

use clap::Parser;
use serde_json::Value as Json;

#[derive(Debug, Parser)]
#[command(name = "kiara", about = "Loads a pipeline config file and runs it to completion")]
pub struct Cli {
    /// Path to a pipeline config file (JSON or YAML, detected by extension).
    pub pipeline_file: PathBuf,

    /// Path to a KiaraConfig file; built-in defaults apply when omitted.
    #[arg(long)]
    pub config: Option<String>,

    /// A pipeline input as `name=json_value`, repeatable. Only needed for
    /// inputs the pipeline file doesn't cover with `defaults`.
    #[arg(long = "input", value_parser = parse_input)]
    pub inputs: Vec<(String, Json)>,

    /// Overrides the configured log level for this run.
    #[arg(long)]
    pub log_level: Option<String>,
}

fn parse_input(raw: &str) -> Result<(String, Json), String> {
    let (name, value) = raw.split_once('=').ok_or_else(|| format!("expected name=value, got '{raw}'"))?;
    let value: Json = serde_json::from_str(value).map_err(|err| err.to_string())?;
    Ok((name.to_string(), value))
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
