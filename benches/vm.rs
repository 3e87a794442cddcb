//! Benchmarks for compiling and executing arithmetic expressions.

use cloxvm::bytecode::{compile, Chunk, Vm};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// A chain of `terms` additions and multiplications, nested in groups of four.
fn expression(terms: usize) -> String {
    let mut source = String::from("1");
    for i in 1..terms {
        let op = if i % 2 == 0 { "+" } else { "*" };
        if i % 4 == 0 {
            source = format!("({}) {} {}.5", source, op, i);
        } else {
            source = format!("{} {} {}", source, op, i);
        }
    }
    source
}

fn compiled(source: &str) -> Chunk {
    let mut chunk = Chunk::new();
    compile(source, &mut chunk).expect("compile error");
    chunk
}

fn compile_only(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");
    for terms in [8, 64, 200] {
        let source = expression(terms);
        group.bench_with_input(BenchmarkId::from_parameter(terms), &source, |b, source| {
            b.iter(|| compiled(black_box(source)))
        });
    }
    group.finish();
}

fn execute_only(c: &mut Criterion) {
    let mut group = c.benchmark_group("execute");
    for terms in [8, 64, 200] {
        let chunk = compiled(&expression(terms));
        let mut vm = Vm::new();
        group.bench_with_input(BenchmarkId::from_parameter(terms), &chunk, |b, chunk| {
            b.iter(|| vm.interpret(black_box(chunk)).expect("vm runtime error"))
        });
    }
    group.finish();
}

fn end_to_end(c: &mut Criterion) {
    let source = expression(64);
    c.bench_function("compile_and_execute", |b| {
        b.iter(|| {
            let chunk = compiled(black_box(&source));
            Vm::new().interpret(&chunk).expect("vm runtime error")
        })
    });
}

criterion_group!(benches, compile_only, execute_only, end_to_end);
criterion_main!(benches);
