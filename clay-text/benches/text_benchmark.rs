use std::hint::black_box;

use clay_core::{BoundingBox, TextConfig};
use clay_text::{Atlas, FontTable, SyntheticFace};
use criterion::{criterion_group, criterion_main, Criterion};

const PARAGRAPH: &str = "The quick brown fox jumps over the lazy dog. \
    Lorem ipsum dolor sit amet, consectetur adipiscing elit.\n\
    Sed do eiusmod tempor incididunt ut labore et dolore magna aliqua.";

fn table() -> FontTable {
    let mut table = FontTable::default();
    let face = SyntheticFace::new(16.0)
        .with_default_advance(8.0)
        .with_advance('i', 4.0)
        .with_advance('m', 12.0);
    table
        .load_face(face, 16.0)
        .expect("synthetic face always loads");
    table
}

fn bench_load_font(c: &mut Criterion) {
    c.bench_function("bake_ascii_atlas", |b| {
        b.iter(|| {
            let mut table = FontTable::default();
            table
                .load_face(SyntheticFace::new(16.0), black_box(16.0))
                .expect("synthetic face always loads")
        });
    });
}

fn bench_measure(c: &mut Criterion) {
    let mut table = table();

    c.bench_function("measure_short_text", |b| {
        b.iter(|| table.measure(black_box("Hello, Clay!"), 0, 16.0));
    });

    c.bench_function("measure_paragraph", |b| {
        b.iter(|| table.measure(black_box(PARAGRAPH), 0, 14.0));
    });
}

fn bench_layout(c: &mut Criterion) {
    let mut table = table();
    let config = TextConfig {
        font_size: 14.0,
        ..Default::default()
    };
    let bounds = BoundingBox::new(10.0, 10.0, 400.0, 200.0);

    c.bench_function("layout_paragraph", |b| {
        b.iter(|| {
            let font = table.get_mut(0).expect("font 0 loaded");
            font.layout_glyphs(black_box(PARAGRAPH), &config, bounds).count()
        });
    });
}

fn bench_atlas_insert(c: &mut Criterion) {
    let bitmap = vec![200u8; 16 * 16];

    c.bench_function("atlas_insert_16x16", |b| {
        b.iter(|| {
            let mut atlas = Atlas::new(512, 512, 1);
            while atlas.insert(16, 16, black_box(&bitmap)).is_some() {}
            atlas.glyph_count()
        });
    });
}

criterion_group!(
    benches,
    bench_load_font,
    bench_measure,
    bench_layout,
    bench_atlas_insert,
);
criterion_main!(benches);
