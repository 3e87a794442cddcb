//! End-to-end tests: source text through the compiler and the VM.

use crate::bytecode::{compile, disassemble_instruction, Chunk, OpCode, Value, Vm};
use crate::error::RuntimeError;
use pretty_assertions::assert_eq;

fn chunk_for(source: &str) -> Chunk {
    let mut chunk = Chunk::new();
    compile(source, &mut chunk).unwrap();
    chunk
}

fn eval(source: &str) -> f64 {
    let chunk = chunk_for(source);
    Vm::new().interpret(&chunk).unwrap().as_f64()
}

fn diagnostics(source: &str) -> Vec<String> {
    let mut chunk = Chunk::new();
    let err = compile(source, &mut chunk).unwrap_err();
    err.diagnostics.iter().map(|d| d.to_string()).collect()
}

#[test]
fn test_scenario_addition() {
    let chunk = chunk_for("1 + 2");
    assert_eq!(
        chunk.code(),
        &[
            OpCode::Constant as u8,
            0,
            OpCode::Constant as u8,
            1,
            OpCode::Add as u8,
            OpCode::Return as u8,
        ]
    );
    assert_eq!(chunk.constants(), &[Value(1.0), Value(2.0)]);
    assert_eq!(Vm::new().interpret(&chunk).unwrap().to_string(), "3");
}

#[test]
fn test_scenario_grouping_then_factor() {
    assert_eq!(eval("(4 - 2) * 3"), 6.0);
}

#[test]
fn test_scenario_negated_group() {
    assert_eq!(eval("-(1+2)"), -3.0);
}

#[test]
fn test_scenario_truncated() {
    assert_eq!(
        diagnostics("1 +"),
        vec!["[line 1] Error at end: Expect expression."]
    );
}

#[test]
fn test_scenario_too_many_constants() {
    let source = (1..=257)
        .map(|i| format!("{}.5", i))
        .collect::<Vec<_>>()
        .join(" + ");
    assert_eq!(
        diagnostics(&source),
        vec!["[line 1] Error at '257.5': Too many constants in one chunk."]
    );
}

#[test]
fn test_scenario_unclosed_group() {
    let found = diagnostics("(1 + 2");
    assert_eq!(found.len(), 1);
    assert!(found[0].contains("Expect ')' after expression."));
}

#[test]
fn test_operand_order() {
    assert_eq!(eval("5 - 2"), 3.0);
    assert_eq!(eval("8 / 2"), 4.0);
    assert_eq!(eval("10 - 4 - 3"), 3.0);
    assert_eq!(eval("64 / 4 / 2"), 8.0);
}

#[test]
fn test_matches_native_arithmetic() {
    let cases: &[(&str, f64)] = &[
        ("1 + 2 * 3", 1.0 + 2.0 * 3.0),
        ("(1 + 2) * 3", (1.0 + 2.0) * 3.0),
        ("1 - 2 - 3", 1.0 - 2.0 - 3.0),
        ("2 * 3 / 4", 2.0 * 3.0 / 4.0),
        ("--5", 5.0),
        ("-2 * -3", -2.0 * -3.0),
        ("1.5 + 0.25", 1.75),
        ("0.1 + 0.2", 0.1 + 0.2),
        ("((7))", 7.0),
        ("3 - -3", 6.0),
        ("1 / 3", 1.0 / 3.0),
        ("100 - 2 * (3 + 4) / 7", 100.0 - 2.0 * (3.0 + 4.0) / 7.0),
    ];
    for (source, expected) in cases {
        assert_eq!(eval(source), *expected, "{}", source);
    }
}

#[test]
fn test_listing_covers_every_instruction() {
    let chunk = chunk_for("-(1 + 2) * 3 / (4 - 5)");
    let mut output = String::new();
    let mut offset = 0;
    let mut count = 0;
    while offset < chunk.len() {
        offset = disassemble_instruction(&chunk, offset, &mut output);
        count += 1;
    }
    assert_eq!(offset, chunk.len());
    assert_eq!(output.lines().count(), count);

    // Five constants take two bytes each; the remaining instructions take one.
    assert_eq!(chunk.len(), count + 5);
}

#[test]
fn test_compiling_twice_is_identical() {
    let source = "(1.25 - 3) * -4 / 2 + 8";
    let first = chunk_for(source);
    let second = chunk_for(source);
    assert_eq!(first, second);
}

#[test]
fn test_one_defect_one_diagnostic() {
    for source in ["1 + ", "(1", "1 )", "@", "1 + #", "* 2", "\"text", "1 2 3"] {
        assert_eq!(diagnostics(source).len(), 1, "{}", source);
    }
}

#[test]
fn test_diagnostic_lines() {
    assert_eq!(
        diagnostics("1 +\n\n(2"),
        vec!["[line 3] Error at end: Expect ')' after expression."]
    );
    assert_eq!(
        diagnostics("// comment\n1 + or"),
        vec!["[line 2] Error at 'or': Expect expression."]
    );
}

#[test]
fn test_runtime_error_carries_line() {
    let chunk = chunk_for("1 +\n2 /\n0");
    let err = Vm::new().interpret(&chunk).unwrap_err();
    assert!(matches!(err, RuntimeError::DivisionByZero(_)));
    assert_eq!(err.line(), 3);
}

#[test]
fn test_deep_nesting_stays_within_stack() {
    // Right-nested additions keep one value per level on the stack.
    let depth = 200;
    let source = format!("{}1{}", "1 + (".repeat(depth), ")".repeat(depth));
    assert_eq!(eval(&source), (depth + 1) as f64);
}
