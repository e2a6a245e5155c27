// Copyright (c) 2026 Joseph Verdicchio and ArchivalOS Contributors
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::identity::CodeIdentity;

/// Mode tag recorded for each observed whitening invocation path.
///
/// Variant order matches the lexicographic order of the serialized tags, so
/// `BTreeSet` iteration yields the sorted list the stable record requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WhitenMode {
    FallbackUsed,
    Pinned,
}

impl WhitenMode {
    pub fn tag(&self) -> &'static str {
        match self {
            WhitenMode::FallbackUsed => "fallback_used",
            WhitenMode::Pinned => "pinned",
        }
    }
}

/// Per-run mutable state: code identity plus whitening-path telemetry.
///
/// `reset` must run at the start of every orchestrated run; without it,
/// observed modes accumulate across in-process runs and corrupt the stable
/// artifact's determinism guarantee.
#[derive(Debug, Clone)]
pub struct RuntimeState {
    pub code: CodeIdentity,
    pub whiten_modes_seen: BTreeSet<WhitenMode>,
    pub whiten_fallback_reason: Option<String>,
    pub(crate) fallback_warned: bool,
}

impl RuntimeState {
    pub fn new() -> Self {
        Self {
            code: CodeIdentity::unknown(),
            whiten_modes_seen: BTreeSet::new(),
            whiten_fallback_reason: None,
            fallback_warned: false,
        }
    }

    /// Clears the whitening telemetry. Code identity is left as-is; it is
    /// refreshed explicitly by the startup gate.
    pub fn reset(&mut self) {
        self.whiten_modes_seen.clear();
        self.whiten_fallback_reason = None;
        self.fallback_warned = false;
    }

    pub fn refresh_code_identity(&mut self) {
        self.code = CodeIdentity::probe();
    }

    /// Sorted, deduplicated mode tags for the run record.
    pub fn sorted_mode_tags(&self) -> Vec<&'static str> {
        self.whiten_modes_seen.iter().map(WhitenMode::tag).collect()
    }
}

impl Default for RuntimeState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::SourceMode;

    #[test]
    fn reset_clears_whitening_telemetry_only() {
        let mut state = RuntimeState::new();
        state.refresh_code_identity();
        state.whiten_modes_seen.insert(WhitenMode::Pinned);
        state.whiten_modes_seen.insert(WhitenMode::FallbackUsed);
        state.whiten_fallback_reason = Some("bad call".to_string());
        state.fallback_warned = true;

        state.reset();

        assert!(state.whiten_modes_seen.is_empty());
        assert!(state.whiten_fallback_reason.is_none());
        assert!(!state.fallback_warned);
        assert_eq!(state.code.mode, SourceMode::File);
    }

    #[test]
    fn mode_tags_come_out_sorted_and_deduplicated() {
        let mut state = RuntimeState::new();
        state.whiten_modes_seen.insert(WhitenMode::Pinned);
        state.whiten_modes_seen.insert(WhitenMode::Pinned);
        state.whiten_modes_seen.insert(WhitenMode::FallbackUsed);
        assert_eq!(state.sorted_mode_tags(), vec!["fallback_used", "pinned"]);
    }
}
