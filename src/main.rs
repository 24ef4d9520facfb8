use std::{fs::read_to_string, path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use compiler::{
    ast::printer::to_source,
    compiler::vm,
    errors::diagnostics::Diagnostic,
    lexer::lexer::tokenize,
    pipeline::{compile_units, CancellationToken, CompileOptions, Session, SourceUnit},
    render_snippet,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Emit {
    /// One `token: KIND value: LEXEME` line per token
    Tokens,
    /// Canonical, fully parenthesised source
    Ast,
    /// The generated IR
    Ir,
}

/// Compiles source files of a small expression language into a linear IR.
#[derive(Parser, Debug)]
#[command(name = "compiler", version, about, long_about = None)]
struct Config {
    /// Source files to compile
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// What to print to stdout
    #[arg(long, value_enum, default_value_t = Emit::Ir)]
    emit: Emit,

    /// Execute the generated IR and print what the program prints
    #[arg(long)]
    run: bool,

    /// Number of files compiled in parallel
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Disable constant folding
    #[arg(long)]
    no_fold: bool,

    /// Show the source line and a caret under each diagnostic
    #[arg(long)]
    snippets: bool,

    /// Raise log verbosity (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Disable logging
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Config {
    fn compile_options(&self) -> CompileOptions {
        let defaults = CompileOptions::default();
        CompileOptions {
            fold_constants: !self.no_fold,
            jobs: self.jobs.unwrap_or(defaults.jobs),
        }
    }

    fn log_filter(&self) -> EnvFilter {
        let level = match (self.quiet, self.verbose) {
            (true, _) => "off",
            (false, 0) => "warn",
            (false, 1) => "info",
            (false, 2) => "debug",
            _ => "trace",
        };

        if self.quiet || self.verbose > 0 {
            EnvFilter::new(level)
        } else {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
        }
    }
}

fn main() -> Result<ExitCode> {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(config.log_filter())
        .with_writer(std::io::stderr)
        .init();

    let units = config
        .files
        .iter()
        .map(|path| {
            let text = read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Ok(SourceUnit::new(path.display().to_string(), text))
        })
        .collect::<Result<Vec<_>>>()?;

    let failed = if config.emit == Emit::Tokens {
        dump_tokens(&config, &units)
    } else {
        compile_all(&config, &units)?
    };

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn report(config: &Config, unit: &SourceUnit, diagnostic: &Diagnostic) {
    eprintln!("{}", diagnostic.format_with_file(&unit.name));
    if config.snippets {
        let snippet = render_snippet(&unit.text, diagnostic.span);
        if !snippet.is_empty() {
            eprintln!("{}", snippet);
        }
    }
}

fn header(units: &[SourceUnit], unit: &SourceUnit) {
    if units.len() > 1 {
        println!("==> {} <==", unit.name);
    }
}

/// Lexer-only mode. Returns whether any unit had an error.
fn dump_tokens(config: &Config, units: &[SourceUnit]) -> bool {
    let mut failed = false;

    for unit in units {
        let session = Session::new();
        header(units, unit);
        for token in tokenize(&unit.text, &session) {
            println!("{}", token.debug_line());
        }

        for diagnostic in session.diagnostics.all() {
            report(config, unit, &diagnostic);
        }
        failed |= session.diagnostics.has_errors();
    }

    failed
}

/// Runs the full pipeline over every unit. Returns whether any unit had an
/// error, or failed at run time.
fn compile_all(config: &Config, units: &[SourceUnit]) -> Result<bool> {
    let options = config.compile_options();
    info!(units = units.len(), jobs = options.jobs, "compiling");

    let cancel = CancellationToken::new();
    let mut failed = false;

    for (unit, result) in units.iter().zip(compile_units(units, &options, &cancel)) {
        let output = result.with_context(|| format!("internal compiler error in {}", unit.name))?;

        for diagnostic in &output.diagnostics {
            report(config, unit, diagnostic);
        }
        failed |= output.has_errors();

        header(units, unit);
        if config.emit == Emit::Ast {
            print!("{}", to_source(&output.ast));
            continue;
        }

        let Some(ir) = output.ir else {
            debug!(unit = %unit.name, "no IR generated");
            continue;
        };

        if config.run {
            match vm::run(&ir) {
                Ok(printed) => printed.iter().for_each(|value| println!("{}", value)),
                Err(error) => {
                    eprintln!("{}: runtime error: {}", unit.name, error);
                    failed = true;
                }
            }
        } else {
            print!("{}", ir);
        }
    }

    Ok(failed)
}
