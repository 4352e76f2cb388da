use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use editor_analysis::{Buffer, Coordinate, MirroredDocument, PositionTranslator};

fn large_lines(line_count: usize) -> Vec<String> {
    (0..line_count)
        .map(|i| format!("{i:06} let value = compute(alpha, beta, gamma); // analysis benchmark"))
        .collect()
}

fn bench_to_offset_end_of_buffer(c: &mut Criterion) {
    let buffer = Buffer::from_lines(large_lines(10_000));
    let target = Coordinate::new(9_999, 10);
    c.bench_function("to_offset/10k_lines_last_row", |b| {
        b.iter(|| black_box(buffer.to_offset(black_box(target))))
    });
}

fn bench_to_coordinate_rope(c: &mut Criterion) {
    let buffer = Buffer::from_lines(large_lines(10_000));
    let mirror = MirroredDocument::from_text(&buffer.text());
    let offset = buffer.len_chars() - 5;
    c.bench_function("to_coordinate/rope_10k_lines", |b| {
        b.iter(|| black_box(mirror.to_coordinate(black_box(offset))))
    });
}

fn bench_typing_sync(c: &mut Criterion) {
    let lines = large_lines(10_000);
    c.bench_function("typing_sync/100_inserts_mid_file", |b| {
        b.iter_batched(
            || {
                let buffer = Buffer::from_lines(lines.clone());
                let mirror = MirroredDocument::from_text(&buffer.text());
                (buffer, mirror)
            },
            |(mut buffer, mut mirror)| {
                let mut at = Coordinate::new(5_000, 3);
                for _ in 0..100 {
                    let event = buffer.insert_text(at, "x");
                    mirror.edit(&event.to_text_edit(&buffer)).unwrap();
                    at.column += 1;
                }
                black_box(mirror.version());
            },
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(
    benches,
    bench_to_offset_end_of_buffer,
    bench_to_coordinate_rope,
    bench_typing_sync
);
criterion_main!(benches);
