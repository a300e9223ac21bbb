//! Performance benchmarks for transcript extraction.
//!
//! Run with: `cargo bench`
//!
//! Benchmarks include:
//! - The small fixture page used by the integration tests
//! - Synthetic calls with many speaker turns, scaled by turn count

use capedge_client::{extract_transcript, mapper};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

const FIXTURE_HTML: &str = include_str!("../tests/fixtures/transcript_page.html");

/// Build a transcript page with `turns` speaker turns of three paragraphs each.
fn synthetic_call(turns: usize) -> String {
    let mut grid = String::new();
    for i in 0..turns {
        grid.push_str(&format!("<h3>Speaker {} -- Analyst</h3><div class=\"prose\">", i % 7));
        for p in 0..3 {
            grid.push_str(&format!(
                "<p>Turn {i}, paragraph {p}: revenue grew &amp; margins expanded year over year.</p>"
            ));
        }
        grid.push_str("</div>");
    }
    format!(
        "<!DOCTYPE html><html><body><main><div class=\"r6o-annotatable\"><div class=\"grid\">{grid}</div></div></main></body></html>"
    )
}

fn bench_extract_fixture(c: &mut Criterion) {
    c.bench_function("extract_fixture", |b| {
        b.iter(|| extract_transcript(black_box(FIXTURE_HTML)));
    });
}

fn bench_extract_long_calls(c: &mut Criterion) {
    let mut group = c.benchmark_group("long_calls");

    for turns in [50, 200, 800] {
        let html = synthetic_call(turns);
        group.throughput(Throughput::Bytes(html.len() as u64));
        group.bench_with_input(BenchmarkId::new("extract", turns), &html, |b, html| {
            b.iter(|| extract_transcript(black_box(html)));
        });
    }

    group.finish();
}

fn bench_check_body(c: &mut Criterion) {
    let body = r#"{"total": 1, "data": [{"value": "320193", "label": "Apple Inc.", "tradingSymbol": "AAPL"}]}"#;
    c.bench_function("check_body_json", |b| {
        b.iter(|| mapper::check_body(black_box(body)));
    });
}

criterion_group!(
    benches,
    bench_extract_fixture,
    bench_extract_long_calls,
    bench_check_body
);
criterion_main!(benches);
