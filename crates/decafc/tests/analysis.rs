//! End-to-end semantic analysis tests through `check_source`

use decaf_compiler::frontend::ast::{DataType, NodeKind};
use decaf_compiler::frontend::sema::{DiagnosticSink, SemanticPolicy, StorageClass, SymbolKind};
use decaf_compiler::{analyze, check_source, Analysis, AnalysisConfig, DiagnosticReporter, SemanticErrorCode};
use pretty_assertions::assert_eq;

fn check(source: &str) -> Analysis {
    check_source(source, &AnalysisConfig::default()).expect("source should parse")
}

fn assert_valid(source: &str) -> Analysis {
    let analysis = check(source);
    assert!(
        analysis.is_ok(),
        "expected no diagnostics for {:?}, got {:#?}",
        source,
        analysis.diagnostics
    );
    analysis
}

fn assert_reports(source: &str, code: SemanticErrorCode) {
    let analysis = check(source);
    assert!(
        analysis.diagnostics.iter().any(|d| d.code == code),
        "expected {:?} for {:?}, got {:#?}",
        code,
        source,
        analysis.diagnostics
    );
}

fn codes(source: &str) -> Vec<SemanticErrorCode> {
    check(source).diagnostics.iter().map(|d| d.code).collect()
}

// =============================================================================
// Core programs
// =============================================================================

#[test]
fn empty_main_declares_main_in_root_table() {
    let analysis = assert_valid("def int main() { return 0; }");
    let ast = &analysis.ast;

    let root = ast.symbol_table(ast.root().unwrap()).expect("program carries a table");
    let main = root.lookup("main").unwrap();
    assert!(main.is_function());
    assert_eq!(main.return_type(), Some(DataType::Int));
    assert!(main.parameter_types().is_empty());
}

#[test]
fn duplicate_global_variable() {
    assert_reports("int a; int a;", SemanticErrorCode::DuplicateDeclaration);
}

#[test]
fn correct_types() {
    assert_valid("def int main() { int i; i = 3+4; return 0; }");
}

#[test]
fn expression_type_mismatch() {
    assert_reports("def int main() { int i; i = true+4; return 0; }", SemanticErrorCode::TypeMismatch);
}

#[test]
fn variable_type_mismatch() {
    assert_reports("int x; def int main() { x=false; return 0; }", SemanticErrorCode::TypeMismatch);
}

#[test]
fn non_boolean_conditional() {
    assert_reports("def int main() { if (6) { return 0; } }", SemanticErrorCode::TypeMismatch);
}

#[test]
fn non_boolean_while_guard() {
    assert_reports("def int main() { while (1) { } return 0; }", SemanticErrorCode::TypeMismatch);
}

// =============================================================================
// Loop control
// =============================================================================

#[test]
fn break_outside_loop() {
    assert_eq!(
        codes("def int main() { break; return 0; } "),
        vec![SemanticErrorCode::InvalidLoopControl]
    );
}

#[test]
fn continue_outside_loop() {
    assert_eq!(
        codes("def int main() { continue; return 0; } "),
        vec![SemanticErrorCode::InvalidLoopControl]
    );
}

#[test]
fn break_and_continue_directly_in_loop_body() {
    assert_valid("def int main() { int i; i = 3; while(i < 10){break;} return 0; }");
    assert_valid("def int main() { int i; i = 3; while(i < 10){continue;} return 0; }");
}

#[test]
fn break_inside_if_within_loop_is_rejected() {
    // the loop must be the grandparent, not a more distant ancestor
    assert_eq!(
        codes("def int main() { while (true) { if (true) { break; } } return 0; }"),
        vec![SemanticErrorCode::InvalidLoopControl]
    );
}

// =============================================================================
// Calls
// =============================================================================

#[test]
fn mismatched_arguments_in_statement_call() {
    assert_reports(
        "def int main() { foo(true, true); return 0; } def void foo(int i, bool b) { return ; } ",
        SemanticErrorCode::TypeMismatch,
    );
}

#[test]
fn mismatched_arguments_in_value_call() {
    assert_reports(
        "int a; def int main() { a = foo(true, true); return 0; } def int foo(int c, bool b) { return 3; } ",
        SemanticErrorCode::TypeMismatch,
    );
}

#[test]
fn call_to_undeclared_function() {
    assert_reports("def int main() { bar(); return 0; }", SemanticErrorCode::UnresolvedSymbol);
}

#[test]
fn call_with_wrong_arity_reports_once() {
    assert_eq!(
        codes("def void f(int a) { } def int main() { f(1, 2); return 0; }"),
        vec![SemanticErrorCode::TypeMismatch]
    );
}

// =============================================================================
// Program-level rules
// =============================================================================

#[test]
fn missing_main() {
    assert_eq!(codes("int x;"), vec![SemanticErrorCode::MissingMain]);
}

#[test]
fn main_signature_rules_are_independent() {
    assert_eq!(
        codes("def bool main(int argc) { return true; }"),
        vec![SemanticErrorCode::MalformedMain, SemanticErrorCode::MalformedMain]
    );
}

#[test]
fn only_top_level_returns_are_checked() {
    // from the original suite: neither a missing return nor a nested one is flagged
    assert_valid("def int main() { bool b; int i; b = true; if (b) { i = 6; } }");
    assert_valid("def int main() { if (3 < 4) { return true;} }");
}

#[test]
fn multiple_top_level_returns() {
    assert_eq!(
        codes("def int main() { return 0; return 1; }"),
        vec![SemanticErrorCode::MultipleReturns]
    );
}

#[test]
fn void_function_returning_value() {
    assert_eq!(
        codes("def void f() { return 1; } def int main() { return 0; }"),
        vec![SemanticErrorCode::InvalidReturnUsage]
    );
}

// =============================================================================
// Scoping
// =============================================================================

#[test]
fn enclosing_variables_visible_from_nested_blocks() {
    let analysis = assert_valid(
        "int g; def int main() { int x; if (true) { while (x < g) { x = x + g; } } return x; }",
    );
    let ast = &analysis.ast;
    let inner = ast
        .ids()
        .find(|&id| matches!(ast.kind(id), NodeKind::Assignment { .. }))
        .unwrap();

    let x = ast.resolve(inner, "x").unwrap();
    assert_eq!(x.ty, DataType::Int);
    assert_eq!(x.storage(), Some(StorageClass::Local));
    let g = ast.resolve(inner, "g").unwrap();
    assert_eq!(g.storage(), Some(StorageClass::Global));
}

#[test]
fn nested_redeclaration_shadows_only_inside() {
    let source = "def int main() { int x; if (true) { bool x; x = true; } x = 1; return 0; }";
    let analysis = assert_valid(source);
    let ast = &analysis.ast;

    let assignments: Vec<_> = ast
        .ids()
        .filter(|&id| matches!(ast.kind(id), NodeKind::Assignment { .. }))
        .collect();
    let types: Vec<DataType> = assignments
        .iter()
        .map(|&id| ast.resolve(id, "x").unwrap().ty)
        .collect();
    assert_eq!(types, vec![DataType::Bool, DataType::Int]);
}

#[test]
fn parameters_are_visible_in_body() {
    let analysis = assert_valid("def int add(int a, int b) { return a + b; } def int main() { return add(1, 2); }");
    let ast = &analysis.ast;
    let ret = ast
        .ids()
        .find(|&id| matches!(ast.kind(id), NodeKind::Return { value: Some(_) }))
        .unwrap();
    assert_eq!(ast.resolve(ret, "a").unwrap().kind, SymbolKind::Parameter);
}

#[test]
fn undeclared_variable() {
    // the unknown type never matches, so the assignment is flagged as well
    assert_eq!(
        codes("def int main() { y = 1; return 0; }"),
        vec![SemanticErrorCode::UnresolvedSymbol, SemanticErrorCode::TypeMismatch]
    );
}

#[test]
fn global_arrays_only_policy() {
    let source = "int buf[8]; def int main() { int local[2]; local[0] = buf[1]; return 0; }";
    assert_valid(source);

    let config = AnalysisConfig {
        policy: SemanticPolicy { arrays_global_only: true },
        ..Default::default()
    };
    let analysis = check_source(source, &config).unwrap();
    assert!(analysis.diagnostics.iter().any(|d| d.code == SemanticErrorCode::InvalidDeclaration));
}

// =============================================================================
// Runs and reporting
// =============================================================================

#[test]
fn sink_reset_between_runs() {
    let mut sink = DiagnosticSink::new();

    let mut bad = decaf_compiler::frontend::parser::Parser::new("int a; int a;").unwrap().parse().unwrap();
    analyze(&mut bad, SemanticPolicy::default(), &mut sink).unwrap();
    assert!(!sink.is_empty());

    sink.reset();
    let mut good = decaf_compiler::frontend::parser::Parser::new("def int main() { return 0; }")
        .unwrap()
        .parse()
        .unwrap();
    analyze(&mut good, SemanticPolicy::default(), &mut sink).unwrap();
    assert!(sink.is_empty());
}

#[test]
fn separate_runs_share_nothing() {
    let first = check("int a; int a;");
    let second = check("def int main() { return 0; }");
    assert!(!first.is_ok());
    assert!(second.is_ok());
}

#[test]
fn rendered_report_names_the_problem() {
    let source = "def int main() { if (6) { return 0; } }";
    let analysis = check(source);

    let mut reporter = DiagnosticReporter::new();
    let file_id = reporter.add_file("cond.decaf", source);
    let rendered = reporter.render_semantic(file_id, &analysis.diagnostics[0]);

    assert!(rendered.contains("cond.decaf"));
    assert!(rendered.contains(SemanticErrorCode::TypeMismatch.as_str()));
}
