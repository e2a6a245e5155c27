// Copyright [2026] [Joseph Verdicchio]
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// Copyright (c) 2026 Joseph Verdicchio and ArchivalOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! archivalos-core
//!
//! A Rust implementation of the *ArchivalOS* commitment-and-verification
//! harness for archival-grade analysis runs.
//!
//! This crate implements the core archival invariants:
//! - Preregistration commitment (frozen literal payload + truncated hash,
//!   verified byte-for-byte against the live configuration on every run)
//! - Strict enforcement gate (file-based execution, pinned dependency
//!   versions with aggregated mismatch reporting)
//! - Deterministic-path enforcement for a pluggable whitening step
//! - Dual-artifact run records: a bit-reproducible stable record and an
//!   audit record carrying wall-clock and platform provenance

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod canonical;
pub mod config;
pub mod environment;
pub mod error;
pub mod forensics;
pub mod identity;
pub mod prereg;
pub mod record;
pub mod state;
pub mod versions;
pub mod whiten;

pub use crate::error::{ArchivalOSError, ArchivalOSResult};
pub use crate::forensics::ArchivalHarness;
