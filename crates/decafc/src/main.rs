//! Decaf compiler - semantic checker for Decaf programs
//!
//! Usage: decafc [OPTIONS] <input>

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use decaf_compiler::common::DiagnosticReporter;
use decaf_compiler::frontend::sema::SemanticPolicy;
use decaf_compiler::frontend::{AnalysisConfig, CompileContext, DecafFrontend};
use std::fs;
use std::path::PathBuf;
use std::process;

#[derive(ClapParser, Debug)]
#[command(name = "decafc")]
#[command(author = "Decaf Toolchain Team")]
#[command(version)]
#[command(about = "Semantic checker for the Decaf teaching language", long_about = None)]
struct Args {
    /// Input source file (.decaf)
    #[arg(required = true)]
    input: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Dump tokens (for debugging)
    #[arg(long)]
    dump_tokens: bool,

    /// Dump AST (for debugging)
    #[arg(long)]
    dump_ast: bool,

    /// Dump symbol tables (for debugging)
    #[arg(long)]
    dump_symbols: bool,

    /// Reject arrays declared inside functions
    #[arg(long)]
    global_arrays_only: bool,
}

fn main() {
    let args = Args::parse();

    match run(&args) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("error: {:#}", e);
            process::exit(1);
        }
    }
}

/// Returns whether the program passed every check
fn run(args: &Args) -> Result<bool> {
    let source = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let filename = args.input.display().to_string();

    let mut reporter = DiagnosticReporter::new();
    let file_id = reporter.add_file(&filename, &source);

    if args.verbose {
        eprintln!("Checking {}", args.input.display());
    }

    let config = AnalysisConfig {
        dump_tokens: args.dump_tokens,
        dump_ast: args.dump_ast,
        dump_symbols: args.dump_symbols,
        verbose: args.verbose,
        policy: SemanticPolicy {
            arrays_global_only: args.global_arrays_only,
        },
    };

    let ctx = CompileContext::new(filename.clone(), file_id, &reporter);
    let analysis = match DecafFrontend::new().check(&source, &ctx, &config) {
        Ok(analysis) => analysis,
        // Already rendered through the reporter
        Err(_) => return Ok(false),
    };

    if analysis.is_ok() {
        if args.verbose {
            eprintln!("{}: no errors", filename);
        }
        Ok(true)
    } else {
        eprintln!("{}: {} error(s)", filename, analysis.diagnostics.len());
        Ok(false)
    }
}
