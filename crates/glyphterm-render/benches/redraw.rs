use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glyphterm_core::Dimensions;
use glyphterm_emulator::{Grid, NullHost, Parser};
use glyphterm_render::testing::{numbered_atlas, RecordingPresenter};
use glyphterm_render::{Padding, Renderer};

/// Grid filled with a directory-listing-like screen
fn create_listing_parser(rows: u16, cols: u16) -> Parser {
    let mut parser = Parser::new(Grid::new(Dimensions::new(rows, cols)));
    let mut listing = String::new();
    for i in 0..rows {
        listing.push_str(&format!(
            "\x1b[1mdrwxr-xr-x\x1b[0m  2 user user 4096 Oct 19 12:{:02} dir-{}\r\n",
            i % 60,
            i
        ));
    }
    parser.feed(listing.as_bytes(), &mut NullHost);
    parser
}

fn bench_redraw(c: &mut Criterion) {
    let mut group = c.benchmark_group("redraw");

    for size in [(25, 80), (40, 120), (60, 160)].iter() {
        let (rows, cols) = *size;
        let parser = create_listing_parser(rows, cols);
        let mut renderer = Renderer::new(
            Dimensions::new(rows, cols),
            numbered_atlas(8, 16, 32),
            Padding::new(8, 8),
        );
        let mut presenter = RecordingPresenter::default();

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", rows, cols)),
            &(),
            |b, _| {
                b.iter(|| {
                    renderer.mark_dirty();
                    black_box(
                        renderer
                            .redraw_if_dirty(parser.grid(), &mut presenter)
                            .unwrap(),
                    )
                })
            },
        );
    }

    group.finish();
}

fn bench_feed_and_redraw(c: &mut Criterion) {
    let dims = Dimensions::new(25, 80);
    let chunk = b"$ ls -la\r\ntotal 42\r\n\x1b[32mREADME.md\x1b[0m  Cargo.toml  src\r\n";
    let mut parser = Parser::init(dims);
    let mut renderer = Renderer::new(dims, numbered_atlas(8, 16, 32), Padding::new(8, 8));
    let mut presenter = RecordingPresenter::default();

    c.bench_function("feed_and_redraw_80x25", |b| {
        b.iter(|| {
            if parser.feed(black_box(chunk), &mut NullHost) > 0 {
                renderer.mark_dirty();
            }
            renderer.redraw_if_dirty(parser.grid(), &mut presenter).unwrap()
        })
    });
}

criterion_group!(benches, bench_redraw, bench_feed_and_redraw);
criterion_main!(benches);
