use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use transcript_layout_engine::{FixedMetrics, RenderOptions, render_transcript};
mod common;

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    group.sample_size(10);

    let options = RenderOptions::default();
    let metrics = FixedMetrics::default();
    for lines in [10, 100] {
        let json = common::generate_transcript(lines, 8);
        group.bench_function(format!("page_{lines}_lines"), |b| {
            b.iter(|| {
                let rendering = render_transcript(black_box(&json), &options, &metrics).unwrap();
                black_box(rendering.report);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_render);
criterion_main!(benches);
