//! Lexer benchmarks.
//!
//! Run with: `cargo bench --package nutmeg-lex`

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use nutmeg_lex::tokenize;

fn token_count(source: &str) -> usize {
    tokenize(source).len()
}

fn bench_lexer_keywords(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_keywords");

    let source = "let x =>> 42 def main() if x then y end end";
    group.throughput(Throughput::Bytes(source.len() as u64));

    group.bench_function("simple_let", |b| b.iter(|| token_count(black_box("let x =>> 42"))));

    group.bench_function("block_with_body", |b| b.iter(|| token_count(black_box(source))));

    group.finish();
}

fn bench_lexer_complex(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_complex");

    let source = r#"
        def fibonacci(n) =>>
            if n then
                return n
            end
            return fibonacci(n - 1) + fibonacci(n - 2)
        end

        class Point
            let x =>> 0
            let y =>> 0
        end

        for item do
            print(item)
        end
    "#;

    group.throughput(Throughput::Bytes(source.len() as u64));

    group.bench_function("complex_source", |b| b.iter(|| token_count(black_box(source))));

    group.finish();
}

fn bench_lexer_strings(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_strings");

    group.bench_function("short_string", |b| b.iter(|| token_count(black_box("let s =>> \"hello\""))));

    group.bench_function("interpolated_string", |b| {
        b.iter(|| token_count(black_box("let s =>> \"Hello, \\(name)! You are \\(age) years old.\"")))
    });

    group.bench_function("triple_quoted", |b| {
        let source = "let s =>> \"\"\"\n    first line\n    second line\n    \"\"\"";
        b.iter(|| token_count(black_box(source)))
    });

    group.finish();
}

fn bench_lexer_numbers(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_numbers");

    group.bench_function("decimal", |b| b.iter(|| token_count(black_box("let x =>> 123456"))));

    group.bench_function("fraction_and_exponent", |b| b.iter(|| token_count(black_box("let x =>> 3.14159e2"))));

    group.bench_function("hex_radix", |b| b.iter(|| token_count(black_box("let x =>> 16rDEADBEEF"))));

    group.bench_function("balanced_ternary", |b| b.iter(|| token_count(black_box("let x =>> 0t1T0.01e-4"))));

    group.finish();
}

fn bench_lexer_identifiers(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_identifiers");

    group.bench_function("short_ident", |b| b.iter(|| token_count(black_box("let x =>> 42"))));

    group.bench_function("long_ident", |b| {
        b.iter(|| token_count(black_box("let very_long_variable_name =>> 42")))
    });

    group.bench_function("many_ident", |b| {
        b.iter(|| {
            token_count(black_box(
                "let a =>> 1 let b =>> 2 let c =>> 3 let d =>> 4 let e =>> 5",
            ))
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_lexer_keywords,
    bench_lexer_complex,
    bench_lexer_strings,
    bench_lexer_numbers,
    bench_lexer_identifiers
);
criterion_main!(benches);
