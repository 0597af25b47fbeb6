//! Decaf frontend
//!
//! The frontend is responsible for:
//! 1. Lexing source code into tokens
//! 2. Parsing tokens into an AST
//! 3. Building symbol tables for every scope
//! 4. Type checking and validating every construct

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod sema;

use crate::common::{CompileResult, DiagnosticReporter};

use ast::Ast;
use lexer::Lexer;
use parser::Parser;
use sema::{DiagnosticSink, ScopeBuilder, SemanticDiagnostic, SemanticPolicy, TypeChecker};

/// Configuration options for an analysis run
#[derive(Debug, Clone, Default)]
pub struct AnalysisConfig {
    pub dump_tokens: bool,
    pub dump_ast: bool,
    pub dump_symbols: bool,
    pub verbose: bool,
    pub policy: SemanticPolicy,
}

/// Compilation context providing access to diagnostics and file info
pub struct CompileContext<'a> {
    pub filename: String,
    pub file_id: usize,
    pub reporter: &'a DiagnosticReporter,
}

impl<'a> CompileContext<'a> {
    pub fn new(filename: String, file_id: usize, reporter: &'a DiagnosticReporter) -> Self {
        Self { filename, file_id, reporter }
    }
}

/// Result of analyzing one program
#[derive(Debug)]
pub struct Analysis {
    /// The tree, annotated with symbol tables
    pub ast: Ast,
    /// Every semantic diagnostic, in the order it was reported
    pub diagnostics: Vec<SemanticDiagnostic>,
}

impl Analysis {
    /// True when the program passed every semantic check
    pub fn is_ok(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Run scope building then type checking over a parsed tree
pub fn analyze(ast: &mut Ast, policy: SemanticPolicy, sink: &mut DiagnosticSink) -> CompileResult<()> {
    ScopeBuilder::with_policy(policy).build(ast, sink)?;
    TypeChecker::new().check(ast, sink)
}

/// Parse and analyze `source` without printing anything
pub fn check_source(source: &str, config: &AnalysisConfig) -> CompileResult<Analysis> {
    let mut ast = Parser::new(source)?.parse()?;
    let mut sink = DiagnosticSink::new();
    analyze(&mut ast, config.policy, &mut sink)?;
    Ok(Analysis { ast, diagnostics: sink.into_vec() })
}

/// Decaf frontend with progress logging, debug dumps and rendered reports
pub struct DecafFrontend;

impl DecafFrontend {
    pub fn new() -> Self {
        Self
    }

    /// Run every phase on `source`, reporting problems through `ctx.reporter`
    pub fn check(
        &self,
        source: &str,
        ctx: &CompileContext,
        config: &AnalysisConfig,
    ) -> CompileResult<Analysis> {
        // Phase 1: Lexing (optional token dump)
        if config.dump_tokens {
            match self.dump_tokens(source) {
                Ok(tokens) => {
                    eprintln!("=== Decaf Tokens ===");
                    eprint!("{}", tokens);
                    eprintln!("=== End Tokens ===\n");
                }
                Err(e) => {
                    ctx.reporter.report_error(ctx.file_id, &e);
                    return Err(e);
                }
            }
        }

        // Phase 2: Parsing
        if config.verbose {
            eprintln!("Parsing {}...", ctx.filename);
        }

        let mut ast = match Parser::new(source).and_then(|mut p| p.parse()) {
            Ok(ast) => ast,
            Err(e) => {
                ctx.reporter.report_error(ctx.file_id, &e);
                return Err(e);
            }
        };

        if config.dump_ast {
            eprintln!("=== Decaf AST ===");
            eprintln!("{:#?}", ast);
            eprintln!("=== End AST ===\n");
        }

        // Phase 3: Symbol tables
        if config.verbose {
            eprintln!("Building scopes...");
        }

        let mut sink = DiagnosticSink::new();
        if let Err(e) = ScopeBuilder::with_policy(config.policy).build(&mut ast, &mut sink) {
            ctx.reporter.report_error(ctx.file_id, &e);
            return Err(e);
        }
        let scope_errors = sink.len();
        if config.verbose {
            eprintln!("  {} scope diagnostic(s)", scope_errors);
        }

        if config.dump_symbols {
            eprintln!("=== Symbol Tables ===");
            eprint!("{}", ast.dump_symbols());
            eprintln!("=== End Symbol Tables ===\n");
        }

        // Phase 4: Type checking
        if config.verbose {
            eprintln!("Type checking...");
        }

        if let Err(e) = TypeChecker::new().check(&ast, &mut sink) {
            ctx.reporter.report_error(ctx.file_id, &e);
            return Err(e);
        }
        if config.verbose {
            eprintln!("  {} type diagnostic(s)", sink.len() - scope_errors);
        }

        for diag in &sink {
            ctx.reporter.report_semantic(ctx.file_id, diag);
        }

        Ok(Analysis { ast, diagnostics: sink.into_vec() })
    }

    /// Render the token stream, one token per line
    pub fn dump_tokens(&self, source: &str) -> CompileResult<String> {
        let tokens = Lexer::new(source).tokenize_all()?;
        let mut output = String::new();
        for token in &tokens {
            output.push_str(&format!("{:?}\n", token));
        }
        Ok(output)
    }
}

impl Default for DecafFrontend {
    fn default() -> Self {
        Self::new()
    }
}
