// Copyright (c) 2026 Joseph Verdicchio and ArchivalOS Contributors
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

use crate::config::WhitenSettings;
use crate::error::{ArchivalOSError, ArchivalOSResult};
use crate::state::{RuntimeState, WhitenMode};

/// Call shapes the harness may use against a whitening capability.
#[derive(Debug)]
pub enum WhitenCall<'a, S> {
    /// The single mandated convention.
    Pinned {
        asd: &'a S,
        fftlength: f64,
        overlap: f64,
        window: &'a str,
    },
    /// Reduced-parameter degradation; permitted only outside strict mode.
    AsdOnly { asd: &'a S },
}

#[derive(Debug, Error)]
pub enum WhitenCallError {
    /// The capability rejected the requested call shape. This is the only
    /// failure kind the harness intercepts.
    #[error("unsupported whiten signature: {0}")]
    UnsupportedSignature(String),

    /// Any other failure of the step.
    #[error("{0}")]
    Failed(String),
}

/// A series-like object exposing a whitening operation. Implemented by the
/// embedding application's data types; the harness only sees this seam.
pub trait WhitenCapability {
    type Spectrum;
    type Output;

    fn whiten(&self, call: WhitenCall<'_, Self::Spectrum>) -> Result<Self::Output, WhitenCallError>;
}

/// Deterministic-path enforcement.
///
/// Either the pinned call shape runs, or (in strict mode) the run aborts; a
/// silently degraded computation is never produced. In advisory mode a
/// rejected pinned call downgrades to a one-time warning followed by the
/// reduced call.
pub fn whiten_pinned<C: WhitenCapability>(
    series: &C,
    asd: &C::Spectrum,
    settings: &WhitenSettings,
    state: &mut RuntimeState,
    strict: bool,
) -> ArchivalOSResult<C::Output> {
    let pinned = WhitenCall::Pinned {
        asd,
        fftlength: settings.fftlength,
        overlap: settings.overlap,
        window: &settings.window,
    };
    match series.whiten(pinned) {
        Ok(out) => {
            state.whiten_modes_seen.insert(WhitenMode::Pinned);
            Ok(out)
        }
        Err(WhitenCallError::UnsupportedSignature(reason)) => {
            state.whiten_modes_seen.insert(WhitenMode::FallbackUsed);
            if state.whiten_fallback_reason.is_none() {
                state.whiten_fallback_reason = Some(reason.clone());
            }
            if strict {
                return Err(ArchivalOSError::Determinism(format!(
                    "whitening fallback not allowed: {reason}"
                )));
            }
            if !state.fallback_warned {
                tracing::warn!(%reason, "whitening fallback active");
                state.fallback_warned = true;
            }
            series
                .whiten(WhitenCall::AsdOnly { asd })
                .map_err(ArchivalOSError::from)
        }
        Err(other) => Err(ArchivalOSError::Whiten(other)),
    }
}

/// Stub accepting only the pinned call shape. Rejecting everything else
/// makes the self-check meaningful: a harness that quietly degraded would
/// trip the signature-mismatch path.
struct PinnedOnlyStub;

impl WhitenCapability for PinnedOnlyStub {
    type Spectrum = ();
    type Output = ();

    fn whiten(&self, call: WhitenCall<'_, ()>) -> Result<(), WhitenCallError> {
        match call {
            WhitenCall::Pinned { .. } => Ok(()),
            WhitenCall::AsdOnly { .. } => Err(WhitenCallError::UnsupportedSignature(
                "pinned whitening parameters are required".to_string(),
            )),
        }
    }
}

/// Mechanical runtime proof that the pinned whitening path is reachable and
/// recorded, without real data or a real processing library.
pub fn self_check(
    settings: &WhitenSettings,
    state: &mut RuntimeState,
    strict: bool,
) -> ArchivalOSResult<()> {
    whiten_pinned(&PinnedOnlyStub, &(), settings, state, strict)?;
    if !state.whiten_modes_seen.contains(&WhitenMode::Pinned) {
        return Err(ArchivalOSError::Determinism(
            "self-check did not record the pinned whitening mode".to_string(),
        ));
    }
    Ok(())
}
