// Copyright (c) 2026 Joseph Verdicchio and ArchivalOS Contributors
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{ArchivalOSError, ArchivalOSResult};

/// Version adapter supplied by the embedding application for each audited
/// dependency. The harness itself has no coupling to specific libraries.
pub trait VersionReporter {
    fn name(&self) -> &str;
    fn reported_version(&self) -> Option<String>;
}

/// Runtime version triple. Enforcement compares major.minor only; patch is
/// recorded but not pinned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl RuntimeVersion {
    pub fn parse(s: &str) -> ArchivalOSResult<Self> {
        let parts: Vec<&str> = s.trim().split('.').collect();
        if parts.len() != 3 {
            return Err(ArchivalOSError::Configuration(format!(
                "runtime version must be major.minor.patch, got {s:?}"
            )));
        }
        let field = |raw: &str| {
            raw.parse::<u32>().map_err(|_| {
                ArchivalOSError::Configuration(format!(
                    "runtime version component {raw:?} is not numeric in {s:?}"
                ))
            })
        };
        Ok(Self {
            major: field(parts[0])?,
            minor: field(parts[1])?,
            patch: field(parts[2])?,
        })
    }

    pub fn major_minor(&self) -> String {
        format!("{}.{}", self.major, self.minor)
    }
}

impl fmt::Display for RuntimeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Exact expected version per dependency name. Static configuration,
/// read-only at runtime.
#[derive(Debug, Clone)]
pub struct PinnedVersions {
    pub runtime_name: String,
    /// Full reference version; only major.minor is enforced.
    pub runtime_reference: String,
    pub libraries: BTreeMap<String, String>,
}

impl PinnedVersions {
    /// The reference pin set of the archived analysis environment.
    pub fn reference() -> Self {
        let mut libraries = BTreeMap::new();
        libraries.insert("gwpy".to_string(), "3.0.8".to_string());
        libraries.insert("numpy".to_string(), "1.26.4".to_string());
        libraries.insert("scipy".to_string(), "1.13.1".to_string());
        Self {
            runtime_name: "python".to_string(),
            runtime_reference: "3.11.9".to_string(),
            libraries,
        }
    }

    fn runtime_major_minor(&self) -> String {
        let mut parts = self.runtime_reference.split('.');
        match (parts.next(), parts.next()) {
            (Some(major), Some(minor)) => format!("{major}.{minor}"),
            _ => self.runtime_reference.clone(),
        }
    }
}

/// Strict dependency gate. Collects ALL mismatches before failing so a
/// drifted environment surfaces in one report instead of a
/// fix-one-rerun-find-another loop.
pub fn enforce_dependency_versions(
    strict: bool,
    pins: &PinnedVersions,
    runtime: &RuntimeVersion,
    reporters: &[&dyn VersionReporter],
) -> ArchivalOSResult<()> {
    if !strict {
        return Ok(());
    }

    let mut mismatches = Vec::new();

    let expected_mm = pins.runtime_major_minor();
    if runtime.major_minor() != expected_mm {
        mismatches.push(format!(
            "{}: expected {expected_mm}.* (reference {}), got {runtime}",
            pins.runtime_name, pins.runtime_reference
        ));
    }

    for (name, pinned) in &pins.libraries {
        let reported = reporters
            .iter()
            .find(|r| r.name() == name)
            .and_then(|r| r.reported_version());
        match reported {
            Some(live) if live == *pinned => {}
            Some(live) => mismatches.push(format!("{name}: expected {pinned}, got {live}")),
            None => mismatches.push(format!("{name}: expected {pinned}, got (unreported)")),
        }
    }

    if mismatches.is_empty() {
        return Ok(());
    }
    let listing = mismatches
        .iter()
        .map(|m| format!("  - {m}"))
        .collect::<Vec<_>>()
        .join("\n");
    Err(ArchivalOSError::VersionMismatch(listing))
}
