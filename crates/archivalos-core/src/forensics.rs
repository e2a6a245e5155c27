// Copyright (c) 2026 Joseph Verdicchio and ArchivalOS Contributors
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use crate::config::AnalysisConfig;
use crate::environment::EnvironmentSnapshot;
use crate::error::{ArchivalOSError, ArchivalOSResult};
use crate::identity::SourceMode;
use crate::prereg::PreregistrationCommitment;
use crate::record::{ArtifactWriter, RunInputs, WrittenArtifacts};
use crate::state::RuntimeState;
use crate::versions::{enforce_dependency_versions, PinnedVersions, VersionReporter};
use crate::whiten::{self, WhitenCapability};

/// Owns one archival run end to end: strict policy, frozen commitment,
/// version pins, environment snapshot, and the per-run runtime state.
///
/// Constructing a harness performs no enforcement; every check runs inside
/// `run`. The harness is single-threaded and meant to be driven repeatedly
/// within one process; each `run` resets the runtime state first.
#[derive(Debug)]
pub struct ArchivalHarness {
    strict: bool,
    config: AnalysisConfig,
    commitment: PreregistrationCommitment,
    pins: PinnedVersions,
    environment: EnvironmentSnapshot,
    out_dir: PathBuf,
    state: RuntimeState,
}

impl ArchivalHarness {
    pub fn new(
        strict: bool,
        config: AnalysisConfig,
        pins: PinnedVersions,
        environment: EnvironmentSnapshot,
        out_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            strict,
            config,
            commitment: PreregistrationCommitment::baked(),
            pins,
            environment,
            out_dir: out_dir.into(),
            state: RuntimeState::new(),
        }
    }

    pub fn strict(&self) -> bool {
        self.strict
    }

    pub fn state(&self) -> &RuntimeState {
        &self.state
    }

    pub fn commitment(&self) -> &PreregistrationCommitment {
        &self.commitment
    }

    /// Fails unless the running code's provenance is a hashable file;
    /// interactive execution cannot guarantee the code hash reflects what
    /// actually ran.
    pub fn enforce_file_execution(&self) -> ArchivalOSResult<()> {
        if self.strict && self.state.code.mode != SourceMode::File {
            return Err(ArchivalOSError::Configuration(format!(
                "archival runs require file-based execution, got source mode {:?}",
                self.state.code.mode.as_str()
            )));
        }
        Ok(())
    }

    fn enforce_dependency_versions(&self) -> ArchivalOSResult<()> {
        let reporters = self.environment.library_reporters();
        let refs: Vec<&dyn VersionReporter> = reporters
            .iter()
            .map(|r| r as &dyn VersionReporter)
            .collect();
        enforce_dependency_versions(self.strict, &self.pins, &self.environment.runtime, &refs)
    }

    /// Startup gate: identity refresh, then the three strict checks in
    /// order. The first failure aborts; no artifact is written.
    pub fn initialize_or_fail(&mut self) -> ArchivalOSResult<()> {
        self.state.refresh_code_identity();
        self.enforce_file_execution()?;
        self.enforce_dependency_versions()?;
        self.commitment.verify(&self.config, self.strict)?;
        Ok(())
    }

    /// Deterministic-path enforcement around the embedding application's
    /// whitening capability.
    pub fn whiten_pinned<C: WhitenCapability>(
        &mut self,
        series: &C,
        asd: &C::Spectrum,
    ) -> ArchivalOSResult<C::Output> {
        whiten::whiten_pinned(series, asd, &self.config.whiten, &mut self.state, self.strict)
    }

    /// Full orchestrated run: reset, gate, whitening self-check, artifact
    /// write.
    pub fn run(&mut self, inputs: &RunInputs) -> ArchivalOSResult<WrittenArtifacts> {
        self.state.reset();
        self.initialize_or_fail()?;
        whiten::self_check(&self.config.whiten, &mut self.state, self.strict)?;
        let writer = ArtifactWriter::new(&self.out_dir);
        writer.write(
            &self.state,
            self.strict,
            &self.commitment,
            &self.config,
            &self.environment,
            inputs,
        )
    }
}
