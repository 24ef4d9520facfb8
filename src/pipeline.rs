//! Drives the stages for one compilation unit and runs independent units in
//! parallel.
//!
//! Each unit gets its own [`Session`]: a fresh diagnostics collector plus the
//! cancellation flag shared with whoever started the compile. Stages check
//! [`Session::checkpoint`] at top-level statements, and the resolver and type
//! checker also at loop bodies, and stop early once cancellation is requested.

use std::{
    cell::Cell,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use tracing::{debug, info, info_span};

use crate::{
    ast::statements::Program,
    compiler::{
        compiler::{generate, CodegenOptions},
        ir::IrProgram,
    },
    errors::{
        diagnostics::{Diagnostic, Diagnostics},
        errors::{DiagnosticKind, InternalError},
    },
    lexer::lexer::tokenize,
    parser::parser::parse,
    resolver::resolver::resolve,
    type_checker::type_checker::type_check,
    Span,
};

/// Cooperative cancellation flag, cheap to clone and share across threads.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Per-unit compilation state shared by reference across all stages.
#[derive(Debug, Default)]
pub struct Session {
    pub diagnostics: Diagnostics,
    cancel: CancellationToken,
    cancelled: Cell<bool>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancellation(cancel: CancellationToken) -> Self {
        Session {
            diagnostics: Diagnostics::new(),
            cancel,
            cancelled: Cell::new(false),
        }
    }

    /// Returns false once cancellation was requested. The first call that
    /// observes it records a single `Cancelled` diagnostic at `span`.
    pub fn checkpoint(&self, span: Span) -> bool {
        if self.cancelled.get() {
            return false;
        }
        if self.cancel.is_cancelled() {
            info!(line = span.line, "compilation cancelled");
            self.cancelled.set(true);
            self.diagnostics.report(DiagnosticKind::Cancelled, span);
            return false;
        }
        true
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

/// One in-memory source buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    pub name: String,
    pub text: String,
}

impl SourceUnit {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        SourceUnit {
            name: name.into(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    pub fold_constants: bool,
    /// Upper bound on units compiled at the same time.
    pub jobs: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            fold_constants: true,
            jobs: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompileOutput {
    /// Name of the unit this output belongs to.
    pub unit: String,
    /// The parsed tree, also when parsing failed.
    pub ast: Program,
    /// Present only when no error was recorded.
    pub ir: Option<IrProgram>,
    /// Everything recorded, in emission order.
    pub diagnostics: Vec<Diagnostic>,
}

impl CompileOutput {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Runs the whole pipeline over one unit.
///
/// Later stages are skipped after an invalid parse or a cancellation; code
/// is generated only when no error was recorded. `Err` is reserved for
/// broken invariants inside the compiler.
pub fn compile(
    unit: &SourceUnit,
    options: &CompileOptions,
    cancel: &CancellationToken,
) -> Result<CompileOutput, InternalError> {
    let _span = info_span!("compile", unit = %unit.name).entered();
    let session = Session::with_cancellation(cancel.clone());

    let (program, valid) = parse(tokenize(&unit.text, &session), &session);

    let mut ir = None;
    if valid && !session.is_cancelled() {
        let resolution = resolve(&program, &session);

        if !session.is_cancelled() {
            let typed = type_check(&program, &resolution, &session);

            if !session.diagnostics.has_errors() {
                let codegen_options = CodegenOptions {
                    fold_constants: options.fold_constants,
                };
                ir = Some(generate(&typed, &codegen_options)?);
            }
        }
    }

    debug!(
        errors = session.diagnostics.error_count(),
        warnings = session.diagnostics.warning_count(),
        generated = ir.is_some(),
        "compiled unit"
    );

    Ok(CompileOutput {
        unit: unit.name.clone(),
        ast: program,
        ir,
        diagnostics: session.diagnostics.into_vec(),
    })
}

/// Compiles independent units on scoped worker threads, at most
/// `options.jobs` at a time. Results come back in input order.
pub fn compile_units(
    units: &[SourceUnit],
    options: &CompileOptions,
    cancel: &CancellationToken,
) -> Vec<Result<CompileOutput, InternalError>> {
    let jobs = options.jobs.max(1);
    let mut results = Vec::with_capacity(units.len());

    for chunk in units.chunks(jobs) {
        std::thread::scope(|s| {
            let handles: Vec<_> = chunk
                .iter()
                .map(|unit| s.spawn(move || compile(unit, options, cancel)))
                .collect();

            for (handle, unit) in handles.into_iter().zip(chunk) {
                // A panicking worker is a compiler defect; surface it the same way.
                let result = handle.join().unwrap_or_else(|_| {
                    Err(InternalError::WorkerPanicked {
                        unit: unit.name.clone(),
                    })
                });
                results.push(result);
            }
        });
    }

    results
}
