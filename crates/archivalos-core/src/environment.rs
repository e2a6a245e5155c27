// Copyright (c) 2026 Joseph Verdicchio and ArchivalOS Contributors
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ArchivalOSError, ArchivalOSResult};
use crate::versions::{RuntimeVersion, VersionReporter};

/// Environment manifest emitted by the embedding analysis environment:
/// its runtime version triple, an optional free-form platform descriptor,
/// and the reported version of each library (null for an absent optional
/// dependency).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentManifest {
    pub runtime: String,
    #[serde(default)]
    pub platform_detail: Option<String>,
    #[serde(default)]
    pub libraries: BTreeMap<String, Option<String>>,
}

impl EnvironmentManifest {
    pub fn from_json_bytes(bytes: &[u8]) -> ArchivalOSResult<Self> {
        serde_json::from_slice(bytes).map_err(|e| {
            ArchivalOSError::Configuration(format!("invalid environment manifest: {e}"))
        })
    }

    pub fn load(path: &Path) -> ArchivalOSResult<Self> {
        let bytes = fs::read(path).map_err(|e| {
            ArchivalOSError::Configuration(format!("read {}: {e}", path.display()))
        })?;
        Self::from_json_bytes(&bytes)
    }
}

/// Snapshot of the execution environment for one run. The deterministic
/// fields feed the stable record; `platform_detail` is audit-only.
#[derive(Debug, Clone)]
pub struct EnvironmentSnapshot {
    pub runtime_name: String,
    pub runtime: RuntimeVersion,
    pub os: String,
    pub arch: String,
    pub platform_detail: String,
    pub libraries: BTreeMap<String, Option<String>>,
}

impl EnvironmentSnapshot {
    pub fn from_manifest(
        runtime_name: &str,
        manifest: &EnvironmentManifest,
    ) -> ArchivalOSResult<Self> {
        let runtime = RuntimeVersion::parse(&manifest.runtime)?;
        let platform_detail = manifest
            .platform_detail
            .clone()
            .filter(|detail| !detail.is_empty())
            .unwrap_or_else(|| {
                format!(
                    "{}-{}-unspecified",
                    std::env::consts::OS,
                    std::env::consts::ARCH
                )
            });
        Ok(Self {
            runtime_name: runtime_name.to_string(),
            runtime,
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            platform_detail,
            libraries: manifest.libraries.clone(),
        })
    }

    /// One reporter per library entry, for the dependency gate.
    pub fn library_reporters(&self) -> Vec<SnapshotReporter<'_>> {
        self.libraries
            .iter()
            .map(|(name, version)| SnapshotReporter {
                name,
                version: version.as_deref(),
            })
            .collect()
    }

    /// Deterministic environment block of the stable record: runtime triple
    /// under its own name, OS family, CPU architecture, and every reported
    /// library version.
    pub fn record_block(&self) -> BTreeMap<String, Option<String>> {
        let mut block = self.libraries.clone();
        block.insert(self.runtime_name.clone(), Some(self.runtime.to_string()));
        block.insert("os".to_string(), Some(self.os.clone()));
        block.insert("arch".to_string(), Some(self.arch.clone()));
        block
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SnapshotReporter<'a> {
    name: &'a str,
    version: Option<&'a str>,
}

impl VersionReporter for SnapshotReporter<'_> {
    fn name(&self) -> &str {
        self.name
    }

    fn reported_version(&self) -> Option<String> {
        self.version.map(str::to_string)
    }
}
