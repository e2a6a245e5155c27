// Copyright (c) 2026 Joseph Verdicchio and ArchivalOS Contributors
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::canonical::canonical_json_bytes;
use crate::config::AnalysisConfig;
use crate::environment::EnvironmentSnapshot;
use crate::error::{ArchivalOSError, ArchivalOSResult};
use crate::identity::SourceMode;
use crate::prereg::PreregistrationCommitment;
use crate::state::RuntimeState;

pub const STABLE_ARTIFACT_NAME: &str = "run_record_LATEST.json";

/// Logical inputs of one archival run, supplied by the embedding analysis.
#[derive(Debug, Clone)]
pub struct RunInputs {
    pub fingerprint_short: String,
    pub fingerprint_sha256: String,
    pub configuration: Value,
    pub results: Value,
    pub qc_stats: Value,
    pub rng_meta: Value,
}

#[derive(Debug, Serialize)]
struct ExecutionFlags {
    strict_archival: bool,
    whitening_modes_seen: Vec<&'static str>,
    whiten_fallback_reason: Option<String>,
}

#[derive(Debug, Serialize)]
struct PreregistrationBlock {
    date: &'static str,
    payload_literal: &'static str,
    hash16: String,
}

/// The stable projection of a run record. No field here may vary between
/// two runs with identical logical inputs.
#[derive(Debug, Serialize)]
struct StableRecord {
    run_fingerprint_short: String,
    run_fingerprint_sha256: String,
    code_sha256: String,
    code_source_mode: SourceMode,
    environment: BTreeMap<String, Option<String>>,
    execution_flags: ExecutionFlags,
    preregistration: PreregistrationBlock,
    rng_meta: Value,
    qc_stats: Value,
    results: Value,
    configuration: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenArtifacts {
    pub audit_path: PathBuf,
    pub stable_path: PathBuf,
}

/// Writes the dual-artifact run record: a timestamped audit copy and the
/// overwritten stable copy, both in canonical bytes.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    out_dir: PathBuf,
}

impl ArtifactWriter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    pub fn write(
        &self,
        state: &RuntimeState,
        strict: bool,
        commitment: &PreregistrationCommitment,
        config: &AnalysisConfig,
        environment: &EnvironmentSnapshot,
        inputs: &RunInputs,
    ) -> ArchivalOSResult<WrittenArtifacts> {
        // Duplicate defense: the startup gate already verified the
        // commitment, but a record must never be written against a
        // configuration that drifted in between.
        let hash16 = commitment.verify(config, strict)?;

        let stable = StableRecord {
            run_fingerprint_short: inputs.fingerprint_short.clone(),
            run_fingerprint_sha256: inputs.fingerprint_sha256.clone(),
            code_sha256: state.code.sha256.clone(),
            code_source_mode: state.code.mode,
            environment: environment.record_block(),
            execution_flags: ExecutionFlags {
                strict_archival: strict,
                whitening_modes_seen: state.sorted_mode_tags(),
                whiten_fallback_reason: state.whiten_fallback_reason.clone(),
            },
            preregistration: PreregistrationBlock {
                date: commitment.date,
                payload_literal: commitment.payload_literal,
                hash16,
            },
            rng_meta: inputs.rng_meta.clone(),
            qc_stats: inputs.qc_stats.clone(),
            results: inputs.results.clone(),
            configuration: inputs.configuration.clone(),
        };

        let stable_value =
            serde_json::to_value(&stable).map_err(|e| ArchivalOSError::Artifact(e.to_string()))?;
        let now = Utc::now();
        let audit_value = audit_record(&stable_value, environment, now)?;

        let audit_name = format!(
            "run_record_{}_{}.json",
            inputs.fingerprint_short,
            now.format("%Y%m%dT%H%M%SZ")
        );
        let audit_path = self.out_dir.join(&audit_name);
        let stable_path = self.out_dir.join(STABLE_ARTIFACT_NAME);

        write_atomic(&audit_path, &canonical_json_bytes(&audit_value)?)?;
        write_atomic(&stable_path, &canonical_json_bytes(&stable_value)?)?;

        println!("[ARCHIVAL] Run Record (Audit): {audit_name}");
        println!("[ARCHIVAL] Stable Artifact: {STABLE_ARTIFACT_NAME}");

        Ok(WrittenArtifacts {
            audit_path,
            stable_path,
        })
    }
}

/// Audit projection: deep copy of the stable record plus the wall-clock
/// timestamp, with the platform descriptor inserted into a copied
/// environment object. The stable record itself is never touched.
fn audit_record(
    stable: &Value,
    environment: &EnvironmentSnapshot,
    now: DateTime<Utc>,
) -> ArchivalOSResult<Value> {
    let mut audit = stable.clone();
    let Value::Object(map) = &mut audit else {
        return Err(ArchivalOSError::Artifact(
            "stable record is not a JSON object".to_string(),
        ));
    };
    map.insert(
        "utc_timestamp".to_string(),
        Value::String(now.to_rfc3339_opts(SecondsFormat::Secs, true)),
    );
    match map.get_mut("environment") {
        Some(Value::Object(env)) => {
            env.insert(
                "platform_detail".to_string(),
                Value::String(environment.platform_detail.clone()),
            );
        }
        _ => {
            return Err(ArchivalOSError::Artifact(
                "environment block missing from record".to_string(),
            ))
        }
    }
    Ok(audit)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> ArchivalOSResult<()> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, bytes)
        .map_err(|e| ArchivalOSError::Artifact(format!("write {}: {e}", tmp.display())))?;
    fs::rename(&tmp, path)
        .map_err(|e| ArchivalOSError::Artifact(format!("rename {}: {e}", path.display())))?;
    Ok(())
}
