// Copyright (c) 2026 Joseph Verdicchio and ArchivalOS Contributors
// SPDX-License-Identifier: Apache-2.0

use std::fs;

use serde::{Deserialize, Serialize};

use crate::canonical::sha256_hex;

/// Provenance of the running code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    Unknown,
    File,
    Interactive,
    Error,
}

impl SourceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceMode::Unknown => "unknown",
            SourceMode::File => "file",
            SourceMode::Interactive => "interactive",
            SourceMode::Error => "error",
        }
    }
}

/// Content hash and provenance mode of the running source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeIdentity {
    pub sha256: String,
    pub mode: SourceMode,
}

impl CodeIdentity {
    pub fn unknown() -> Self {
        Self {
            sha256: "unknown".to_string(),
            mode: SourceMode::Unknown,
        }
    }

    /// Best-effort identity probe. Never fails: every path returns a value,
    /// degrading to an `error:<reason>` sentinel, so identity computation
    /// cannot mask or pre-empt a real enforcement failure.
    pub fn probe() -> Self {
        match std::env::current_exe() {
            Ok(path) => match fs::read(&path) {
                Ok(bytes) => Self {
                    sha256: sha256_hex(&bytes),
                    mode: SourceMode::File,
                },
                Err(e) => Self {
                    sha256: format!("error:{e}"),
                    mode: SourceMode::Error,
                },
            },
            // No resolvable executable path: the process has no file context
            // to tie the identity to.
            Err(_) => Self {
                sha256: "interactive".to_string(),
                mode: SourceMode::Interactive,
            },
        }
    }
}
