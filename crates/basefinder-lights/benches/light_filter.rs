use basefinder_core::ColorImageView;
use basefinder_lights::{detect_light_blobs, pair_lights, LightParams, PairParams};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const WIDTH: usize = 640;
const HEIGHT: usize = 480;

/// VGA frame with a dim blue gradient and four plates worth of light bars.
fn synthetic_frame() -> Vec<u8> {
    let mut data = Vec::with_capacity(WIDTH * HEIGHT * 3);
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            let shade = ((x + y) % 32) as u8;
            data.extend_from_slice(&[shade, shade, 30 + shade]);
        }
    }
    let bars = [
        (100, 100),
        (140, 100),
        (400, 120),
        (440, 120),
        (200, 300),
        (240, 302),
        (500, 350),
        (540, 350),
    ];
    for (x0, y0) in bars {
        for y in y0..y0 + 12 {
            for x in x0..x0 + 4 {
                let idx = (y * WIDTH + x) * 3;
                data[idx..idx + 3].copy_from_slice(&[180, 230, 250]);
            }
        }
    }
    data
}

fn bench_light_filter(c: &mut Criterion) {
    let data = synthetic_frame();
    let frame = ColorImageView::new(WIDTH, HEIGHT, 3, &data).expect("frame");
    let light = LightParams::default();
    let pair = PairParams::default();

    c.bench_function("detect_light_blobs_vga", |b| {
        b.iter(|| black_box(detect_light_blobs(black_box(&frame), &light)))
    });

    let blobs = detect_light_blobs(&frame, &light);
    c.bench_function("pair_lights_vga", |b| {
        b.iter(|| black_box(pair_lights(black_box(&blobs), &pair)))
    });
}

criterion_group!(benches, bench_light_filter);
criterion_main!(benches);
