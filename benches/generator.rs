use compoundtree::{Limits, analyze, generate, parse_compound};
use divan::{Bencher, black_box};

fn main() {
    divan::main();
}

/// Compound with `n` boundary-separated stems
fn compound(n: usize) -> String {
    (0..n)
        .map(|i| format!("Stamm{}", char::from(b'a' + i as u8)))
        .collect::<Vec<_>>()
        .join("#")
}

/// Grammar only, on a word with typed stems, suffixes and links
#[divan::bench]
fn parse_annotated(bencher: Bencher) {
    let word = "Lauf<V>~en<Part>#Arbeit<N>\\s#Kind~er#Garten";
    bencher.bench_local(|| parse_compound(black_box(word)).unwrap());
}

/// Full pipeline; trees grow with the Catalan numbers
#[divan::bench(args = [2, 4, 6, 8, 10])]
fn analyze_stems(bencher: Bencher, n: usize) {
    let word = compound(n);
    let limits = Limits {
        max_segments: 10,
        max_trees: 100_000,
    };
    bencher.bench_local(|| analyze(black_box(&word), &limits).unwrap());
}

/// Generator only, fragments parsed up front
#[divan::bench(args = [4, 8])]
fn generate_stems(bencher: Bencher, n: usize) {
    let fragments = parse_compound(&compound(n)).unwrap();
    let limits = Limits::default();
    bencher
        .with_inputs(|| fragments.clone())
        .bench_local_values(|fragments| generate(fragments, &limits).unwrap());
}
