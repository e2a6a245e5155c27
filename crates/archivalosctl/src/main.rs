// Copyright [2026] [Joseph Verdicchio]
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// Copyright (c) 2026 Joseph Verdicchio and ArchivalOS Contributors
// SPDX-License-Identifier: Apache-2.0

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

use archivalos_core::canonical::{canonical_json_bytes, sha256_hex};
use archivalos_core::config::{AnalysisConfig, WhitenSettings};
use archivalos_core::environment::{EnvironmentManifest, EnvironmentSnapshot};
use archivalos_core::forensics::ArchivalHarness;
use archivalos_core::prereg::PreregistrationCommitment;
use archivalos_core::record::RunInputs;
use archivalos_core::state::RuntimeState;
use archivalos_core::versions::PinnedVersions;
use archivalos_core::whiten;

#[derive(Debug, Parser)]
#[command(name = "archivalosctl")]
#[command(about = "ArchivalOS strict-archival harness CLI")]
struct Cli {
    #[arg(long, default_value = "info")]
    log: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Full orchestrated archival run.
    Run {
        /// Environment manifest emitted by the analysis environment.
        #[arg(long)]
        env_manifest: PathBuf,
        /// Analysis configuration; defaults to the preregistered values.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Run inputs (results, qc_stats, rng_meta, ...); example
        /// placeholders when omitted.
        #[arg(long)]
        inputs: Option<PathBuf>,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
        /// Downgrade enforcement to advisory behavior.
        #[arg(long)]
        advisory: bool,
    },
    /// Verify the preregistration commitment against a configuration.
    Verify {
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Exercise the whitening-enforcement path against the built-in stub.
    Selfcheck {
        #[arg(long)]
        advisory: bool,
    },
    /// Print the frozen preregistration commitment.
    Commitment,
}

#[derive(Debug, Default, Deserialize)]
struct RunInputsFile {
    #[serde(default)]
    fingerprint_short: Option<String>,
    #[serde(default)]
    fingerprint_sha256: Option<String>,
    #[serde(default)]
    results: Option<Value>,
    #[serde(default)]
    qc_stats: Option<Value>,
    #[serde(default)]
    rng_meta: Option<Value>,
    #[serde(default)]
    configuration: Option<Value>,
}

fn main() {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(cli.log))
        .init();

    let out = match cli.cmd {
        Command::Run {
            env_manifest,
            config,
            inputs,
            out_dir,
            advisory,
        } => run(&env_manifest, config.as_deref(), inputs.as_deref(), &out_dir, advisory),
        Command::Verify { config } => verify(config.as_deref()),
        Command::Selfcheck { advisory } => selfcheck(advisory),
        Command::Commitment => commitment(),
    };

    match out {
        Ok(v) => println!("{v}"),
        Err(msg) => {
            println!("{}", json!({ "error": msg }));
            std::process::exit(1);
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig, String> {
    match path {
        Some(p) => AnalysisConfig::load(p).map_err(|e| e.to_string()),
        None => Ok(AnalysisConfig::default()),
    }
}

fn run(
    env_manifest: &Path,
    config_path: Option<&Path>,
    inputs_path: Option<&Path>,
    out_dir: &Path,
    advisory: bool,
) -> Result<Value, String> {
    let manifest = EnvironmentManifest::load(env_manifest).map_err(|e| e.to_string())?;
    let config = load_config(config_path)?;
    let pins = PinnedVersions::reference();
    let environment =
        EnvironmentSnapshot::from_manifest(&pins.runtime_name, &manifest).map_err(|e| e.to_string())?;
    let inputs = load_inputs(inputs_path, &config)?;

    fs::create_dir_all(out_dir).map_err(|e| e.to_string())?;

    let strict = !advisory;
    let mut harness = ArchivalHarness::new(strict, config, pins, environment, out_dir);
    let written = harness.run(&inputs).map_err(|e| e.to_string())?;

    Ok(json!({
        "status": "ok",
        "strict_archival": strict,
        "audit": written.audit_path.display().to_string(),
        "stable": written.stable_path.display().to_string(),
        "whitening_modes_seen": harness.state().sorted_mode_tags(),
    }))
}

fn load_inputs(path: Option<&Path>, config: &AnalysisConfig) -> Result<RunInputs, String> {
    let file: RunInputsFile = match path {
        Some(p) => serde_json::from_slice(&fs::read(p).map_err(|e| e.to_string())?)
            .map_err(|e| e.to_string())?,
        None => RunInputsFile::default(),
    };

    let results = file.results.unwrap_or_else(|| json!({ "example": true }));
    let qc_stats = file.qc_stats.unwrap_or_else(|| json!({ "example": true }));
    let rng_meta = file.rng_meta.unwrap_or_else(|| json!({ "seed": 42 }));
    let configuration = match file.configuration {
        Some(v) => v,
        None => serde_json::to_value(config).map_err(|e| e.to_string())?,
    };

    let fingerprint_sha256 = match file.fingerprint_sha256 {
        Some(h) => h,
        None => sha256_hex(&canonical_json_bytes(&results).map_err(|e| e.to_string())?),
    };
    let fingerprint_short = file
        .fingerprint_short
        .unwrap_or_else(|| fingerprint_sha256.chars().take(12).collect());

    Ok(RunInputs {
        fingerprint_short,
        fingerprint_sha256,
        configuration,
        results,
        qc_stats,
        rng_meta,
    })
}

fn verify(config_path: Option<&Path>) -> Result<Value, String> {
    let config = load_config(config_path)?;
    let commitment = PreregistrationCommitment::baked();
    let hash16 = commitment.verify(&config, true).map_err(|e| e.to_string())?;
    Ok(json!({
        "status": "ok",
        "date": commitment.date,
        "hash16": hash16,
    }))
}

fn selfcheck(advisory: bool) -> Result<Value, String> {
    let mut state = RuntimeState::new();
    whiten::self_check(&WhitenSettings::default(), &mut state, !advisory)
        .map_err(|e| e.to_string())?;
    Ok(json!({
        "status": "ok",
        "whitening_modes_seen": state.sorted_mode_tags(),
    }))
}

fn commitment() -> Result<Value, String> {
    let commitment = PreregistrationCommitment::baked();
    Ok(json!({
        "date": commitment.date,
        "payload_literal": commitment.payload_literal,
        "hash16": commitment.hash16(),
    }))
}
