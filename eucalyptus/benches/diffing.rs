use divan::{Bencher, black_box};
use eucalyptus::{DiffConfig, FeatureConfig, SimpleTypes, Term, diff_all, diff_terms, featurize};

type Types = SimpleTypes<&'static str, String>;

fn main() {
    divan::main();
}

fn ident(name: String) -> Term<Types> {
    Term::leaf("identifier", name)
}

/// A program with `functions` functions of a handful of statements each.
fn program(functions: usize, salt: usize) -> Term<Types> {
    Term::sequence(
        "program",
        (0..functions).map(|f| {
            Term::container(
                "function",
                Some(ident(format!("f{f}"))),
                (0..6).map(|s| {
                    if s % 2 == 0 {
                        Term::branch(
                            "call",
                            [ident(format!("g{s}")), Term::leaf("number", format!("{}", f + s))],
                        )
                    } else {
                        Term::branch(
                            "assign",
                            [ident(format!("x{s}")), Term::leaf("number", format!("{}", (f * salt + s) % 7))],
                        )
                    }
                }),
            )
        }),
    )
}

/// Helper to make a small change: swap two functions and rename one.
fn modify(functions: usize) -> Term<Types> {
    let (_, syntax) = program(functions, 3).into_parts();
    let mut children: Vec<Term<Types>> = syntax.children().to_vec();
    if children.len() > 2 {
        children.swap(0, 2);
        children[1] = Term::container("function", Some(ident("renamed".to_string())), []);
    }
    Term::sequence("program", children)
}

#[divan::bench(args = [10, 100, 1000])]
fn diff_identical(bencher: Bencher, functions: usize) {
    let old = program(functions, 1);
    let new = program(functions, 1);
    bencher.bench_local(|| {
        let diff = diff_terms(black_box(&old), black_box(&new));
        black_box(diff);
    });
}

#[divan::bench(args = [10, 100, 1000])]
fn diff_modified(bencher: Bencher, functions: usize) {
    let old = program(functions, 1);
    let new = modify(functions);
    bencher.bench_local(|| {
        let diff = diff_terms(black_box(&old), black_box(&new));
        black_box(diff);
    });
}

#[divan::bench(args = [10, 100, 1000])]
fn diff_featurized(bencher: Bencher, functions: usize) {
    let config = FeatureConfig::default();
    let old = featurize(program(functions, 1), &config);
    let new = featurize(modify(functions), &config);
    bencher.bench_local(|| {
        let diff = diff_terms(black_box(&old), black_box(&new));
        black_box(diff);
    });
}

#[divan::bench(args = [100])]
fn featurize_program(bencher: Bencher, functions: usize) {
    let config = FeatureConfig::default();
    bencher
        .with_inputs(|| program(functions, 1))
        .bench_local_values(|term| black_box(featurize(term, &config)));
}

#[divan::bench]
fn diff_batch(bencher: Bencher) {
    let olds: Vec<_> = (0..64).map(|i| program(20, i)).collect();
    let news: Vec<_> = (0..64).map(|i| program(20, i + 1)).collect();
    let config = DiffConfig::default();
    bencher.bench_local(|| {
        let pairs: Vec<_> = olds.iter().zip(&news).collect();
        let diffs = diff_all(black_box(&pairs), &config);
        black_box(diffs);
    });
}
