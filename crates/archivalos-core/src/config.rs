// Copyright (c) 2026 Joseph Verdicchio and ArchivalOS Contributors
// SPDX-License-Identifier: Apache-2.0

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ArchivalOSError, ArchivalOSResult};

/// Parameters of the single mandated whitening invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhitenSettings {
    /// FFT window length, seconds.
    pub fftlength: f64,
    /// Window overlap, seconds.
    pub overlap: f64,
    /// Window function name.
    pub window: String,
}

impl Default for WhitenSettings {
    fn default() -> Self {
        Self {
            fftlength: 4.0,
            overlap: 2.0,
            window: "hann".to_string(),
        }
    }
}

/// Live analysis configuration. The window bounds participate in the
/// preregistration check; the defaults are the preregistered values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub control_window: [f64; 2],
    pub echo_window: [f64; 2],
    #[serde(default)]
    pub whiten: WhitenSettings,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            control_window: [1.50, 1.60],
            echo_window: [0.95, 1.05],
            whiten: WhitenSettings::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn from_json_bytes(bytes: &[u8]) -> ArchivalOSResult<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| ArchivalOSError::Configuration(format!("invalid analysis config: {e}")))
    }

    pub fn load(path: &Path) -> ArchivalOSResult<Self> {
        let bytes = fs::read(path).map_err(|e| {
            ArchivalOSError::Configuration(format!("read {}: {e}", path.display()))
        })?;
        Self::from_json_bytes(&bytes)
    }
}
