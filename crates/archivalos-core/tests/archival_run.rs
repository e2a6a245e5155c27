// Copyright (c) 2026 Joseph Verdicchio and ArchivalOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! End-to-end archival guarantees:
//! - no enforcement at construction time
//! - strict dependency enforcement with aggregated reporting
//! - whitening path determinism
//! - stable artifact generation, bit-for-bit reproducible

use std::fs;

use proptest::prelude::*;
use serde_json::{json, Value};
use tempfile::TempDir;

use archivalos_core::config::AnalysisConfig;
use archivalos_core::environment::{EnvironmentManifest, EnvironmentSnapshot};
use archivalos_core::error::ArchivalOSError;
use archivalos_core::forensics::ArchivalHarness;
use archivalos_core::prereg::PreregistrationCommitment;
use archivalos_core::record::RunInputs;
use archivalos_core::versions::{
    enforce_dependency_versions, PinnedVersions, RuntimeVersion, VersionReporter,
};

const EXPECTED_HASH16: &str = "65cca958fbcf662c";

fn manifest(gwpy: &str, numpy: &str, scipy: &str) -> EnvironmentManifest {
    EnvironmentManifest::from_json_bytes(
        format!(
            r#"{{
                "runtime": "3.11.9",
                "platform_detail": "Linux-5.15.0-x86_64-with-glibc2.35",
                "libraries": {{"gwpy":"{gwpy}","numpy":"{numpy}","scipy":"{scipy}","lal":null}}
            }}"#
        )
        .as_bytes(),
    )
    .expect("manifest")
}

fn matching_harness(dir: &TempDir) -> ArchivalHarness {
    let snapshot = EnvironmentSnapshot::from_manifest(
        "python",
        &manifest("3.0.8", "1.26.4", "1.13.1"),
    )
    .expect("snapshot");
    ArchivalHarness::new(
        true,
        AnalysisConfig::default(),
        PinnedVersions::reference(),
        snapshot,
        dir.path(),
    )
}

fn example_inputs() -> RunInputs {
    RunInputs {
        fingerprint_short: "example_fp".to_string(),
        fingerprint_sha256: "example_sha256".to_string(),
        configuration: json!({"example": true}),
        results: json!({"example": true}),
        qc_stats: json!({"example": true}),
        rng_meta: json!({"seed": 42}),
    }
}

#[test]
fn construction_is_enforcement_free() {
    // A harness over a hopelessly drifted environment still constructs;
    // nothing fires until the gate runs.
    let dir = TempDir::new().expect("tempdir");
    let snapshot =
        EnvironmentSnapshot::from_manifest("python", &manifest("0.0.0", "0.0.0", "0.0.0"))
            .expect("snapshot");
    let _ = ArchivalHarness::new(
        true,
        AnalysisConfig::default(),
        PinnedVersions::reference(),
        snapshot,
        dir.path(),
    );
}

#[test]
fn full_run_produces_both_artifacts_with_pinned_mode_only() {
    let dir = TempDir::new().expect("tempdir");
    let mut harness = matching_harness(&dir);
    let written = harness.run(&example_inputs()).expect("run");

    let stable: Value =
        serde_json::from_slice(&fs::read(&written.stable_path).expect("read")).expect("json");
    assert_eq!(
        stable["execution_flags"]["whitening_modes_seen"],
        json!(["pinned"])
    );
    assert_eq!(
        stable["execution_flags"]["whiten_fallback_reason"],
        Value::Null
    );
    assert_eq!(stable["execution_flags"]["strict_archival"], json!(true));
    assert_eq!(stable["preregistration"]["hash16"], json!(EXPECTED_HASH16));
    assert_eq!(
        stable["preregistration"]["payload_literal"],
        json!(r#"{"ctrl":[1.5,1.6],"echo":[0.95,1.05]}"#)
    );
    assert_eq!(stable["code_source_mode"], json!("file"));
    assert_eq!(stable["environment"]["python"], json!("3.11.9"));
    assert_eq!(stable["environment"]["lal"], Value::Null);
    assert!(stable.get("utc_timestamp").is_none());

    let audit: Value =
        serde_json::from_slice(&fs::read(&written.audit_path).expect("read")).expect("json");
    assert!(audit["utc_timestamp"].as_str().is_some());
    assert_eq!(
        audit["environment"]["platform_detail"],
        json!("Linux-5.15.0-x86_64-with-glibc2.35")
    );
}

#[test]
fn stable_artifact_is_bit_identical_across_runs() {
    let dir = TempDir::new().expect("tempdir");
    let mut harness = matching_harness(&dir);

    harness.run(&example_inputs()).expect("first run");
    let first = fs::read(dir.path().join("run_record_LATEST.json")).expect("first bytes");

    harness.run(&example_inputs()).expect("second run");
    let second = fs::read(dir.path().join("run_record_LATEST.json")).expect("second bytes");

    assert_eq!(first, second);
}

#[test]
fn stable_artifact_bytes_are_ascii() {
    let dir = TempDir::new().expect("tempdir");
    let mut harness = matching_harness(&dir);
    let inputs = RunInputs {
        results: json!({"note": "χ² residual"}),
        ..example_inputs()
    };
    let written = harness.run(&inputs).expect("run");
    let bytes = fs::read(&written.stable_path).expect("read");
    assert!(bytes.is_ascii());
}

#[test]
fn mutated_control_window_fails_with_preregistration_violation() {
    let dir = TempDir::new().expect("tempdir");
    let snapshot = EnvironmentSnapshot::from_manifest(
        "python",
        &manifest("3.0.8", "1.26.4", "1.13.1"),
    )
    .expect("snapshot");
    let mut harness = ArchivalHarness::new(
        true,
        AnalysisConfig {
            control_window: [1.5, 1.61],
            ..AnalysisConfig::default()
        },
        PinnedVersions::reference(),
        snapshot,
        dir.path(),
    );
    let err = harness.run(&example_inputs()).expect_err("must fail");
    assert!(matches!(err, ArchivalOSError::Preregistration(_)));
    assert!(fs::read_dir(dir.path()).expect("dir").next().is_none());
}

#[test]
fn commitment_hash_matches_the_frozen_literal() {
    let commitment = PreregistrationCommitment::baked();
    assert_eq!(commitment.hash16(), EXPECTED_HASH16);
    assert_eq!(
        commitment
            .verify(&AnalysisConfig::default(), true)
            .expect("verify"),
        EXPECTED_HASH16
    );
}

struct TupleReporter {
    name: String,
    version: Option<String>,
}

impl VersionReporter for TupleReporter {
    fn name(&self) -> &str {
        &self.name
    }
    fn reported_version(&self) -> Option<String> {
        self.version.clone()
    }
}

fn version_string() -> impl Strategy<Value = String> {
    (0u8..20, 0u8..30, 0u8..30).prop_map(|(a, b, c)| format!("{a}.{b}.{c}"))
}

proptest! {
    /// Whenever at least one live library version diverges from its pin,
    /// the gate fails and the failure message names every divergent entry.
    #[test]
    fn every_divergent_library_is_named(
        gwpy in version_string(),
        numpy in version_string(),
        scipy in version_string(),
    ) {
        let pins = PinnedVersions::reference();
        let live = [("gwpy", &gwpy), ("numpy", &numpy), ("scipy", &scipy)];
        let reporters: Vec<TupleReporter> = live
            .iter()
            .map(|(name, version)| TupleReporter {
                name: (*name).to_string(),
                version: Some((*version).to_string()),
            })
            .collect();
        let refs: Vec<&dyn VersionReporter> =
            reporters.iter().map(|r| r as &dyn VersionReporter).collect();
        let runtime = RuntimeVersion::parse("3.11.9").expect("runtime");

        let divergent: Vec<&str> = live
            .iter()
            .filter(|(name, version)| pins.libraries.get(*name) != Some(*version))
            .map(|(name, _)| *name)
            .collect();

        let outcome = enforce_dependency_versions(true, &pins, &runtime, &refs);
        if divergent.is_empty() {
            prop_assert!(outcome.is_ok());
        } else {
            let msg = outcome.expect_err("must fail").to_string();
            for name in divergent {
                prop_assert!(msg.contains(name));
            }
        }
    }
}
