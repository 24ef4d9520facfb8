//! Error types and diagnostics for the compiler.
//!
//! This module defines:
//!
//! - `DiagnosticKind`, the taxonomy of user-facing problems (lexical, syntax,
//!   resolution, type, cancellation and warnings)
//! - `Diagnostic` and the per-compilation `Diagnostics` collector
//! - `InternalError`, raised when the pipeline itself breaks an invariant

pub mod diagnostics;
pub mod errors;
