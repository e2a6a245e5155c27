// Copyright (c) 2026 Joseph Verdicchio and ArchivalOS Contributors
// SPDX-License-Identifier: Apache-2.0

use serde_json::json;

use crate::canonical::{canonical_json_bytes, hash16};
use crate::config::AnalysisConfig;
use crate::error::{ArchivalOSError, ArchivalOSResult};

pub const PREREG_DATE: &str = "2025-12-18";

/// The preregistered commitment. Immutable literal, compared byte-for-byte
/// against the payload recomputed from the live configuration.
pub const PREREG_PAYLOAD_LITERAL: &str = r#"{"ctrl":[1.5,1.6],"echo":[0.95,1.05]}"#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreregistrationCommitment {
    pub date: &'static str,
    pub payload_literal: &'static str,
}

impl PreregistrationCommitment {
    pub fn baked() -> Self {
        Self {
            date: PREREG_DATE,
            payload_literal: PREREG_PAYLOAD_LITERAL,
        }
    }

    /// Truncated content hash of the frozen literal.
    pub fn hash16(&self) -> String {
        hash16(self.payload_literal.as_bytes())
    }

    /// Binding verification against the live window bounds.
    ///
    /// Recomputes the canonical payload from `config`, requires exact byte
    /// equality with the frozen literal, and requires the recomputed
    /// truncated hash to equal the commitment hash. Pure and idempotent:
    /// the gate calls it at startup and the artifact writer calls it again
    /// before building the record. Returns the verified hash16.
    pub fn verify(&self, config: &AnalysisConfig, strict: bool) -> ArchivalOSResult<String> {
        let payload = live_payload(config)?;

        if strict && payload != self.payload_literal {
            return Err(ArchivalOSError::Preregistration(format!(
                "window payload diverges from commitment\nexpected literal: {}\ncomputed payload: {payload}",
                self.payload_literal
            )));
        }

        let computed = hash16(payload.as_bytes());
        let expected = self.hash16();
        if strict && computed != expected {
            return Err(ArchivalOSError::Preregistration(format!(
                "hash16 diverges from commitment ({}): expected {expected}, computed {computed}",
                self.date
            )));
        }

        Ok(computed)
    }
}

fn live_payload(config: &AnalysisConfig) -> ArchivalOSResult<String> {
    let value = json!({
        "ctrl": [config.control_window[0], config.control_window[1]],
        "echo": [config.echo_window[0], config.echo_window[1]],
    });
    let bytes = canonical_json_bytes(&value)?;
    String::from_utf8(bytes)
        .map_err(|e| ArchivalOSError::Preregistration(format!("non-ascii payload: {e}")))
}
