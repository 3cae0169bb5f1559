//! Benchmarks for query projection over a large loaded feed.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use photofeed::feed::Item;
use photofeed::view::{project, projected_len};

fn feed(n: u32) -> Vec<Item> {
    const WORDS: [&str; 6] = ["Cat", "Harbour", "Sunset", "Mountain", "Dog", "Street"];
    (0..n)
        .map(|i| {
            let word = WORDS[i as usize % WORDS.len()];
            Item::new(i.to_string(), format!("{word} photo {i}"), format!("/t/{i}.jpg"))
        })
        .collect()
}

fn bench_project_empty_query(c: &mut Criterion) {
    let items = feed(5_000);
    c.bench_function("project_empty_query", |b| {
        b.iter(|| project(black_box(&items), black_box("")))
    });
}

fn bench_project_filtered(c: &mut Criterion) {
    let items = feed(5_000);
    c.bench_function("project_filtered", |b| {
        b.iter(|| project(black_box(&items), black_box("sunset")))
    });
}

fn bench_projected_len(c: &mut Criterion) {
    let items = feed(5_000);
    c.bench_function("projected_len", |b| {
        b.iter(|| projected_len(black_box(&items), black_box("sunset")))
    });
}

criterion_group!(
    benches,
    bench_project_empty_query,
    bench_project_filtered,
    bench_projected_len
);
criterion_main!(benches);
