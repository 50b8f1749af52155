// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core types, configuration, and error definitions shared across the Orbit crates.

pub mod config;
pub mod error;
pub mod types;

pub use config::{EngineConfig, ReportConfig};
pub use error::{EngineError, ErrorClass, PageError, PageErrorKind, Result};
pub use types::*;
