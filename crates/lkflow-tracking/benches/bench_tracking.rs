use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{Rng, SeedableRng};

use lkflow_image::Image;
use lkflow_tracking::{optical_flow_lk, LucasKanadeConfig, Point};

fn bench_tracking(c: &mut Criterion) {
    let mut group = c.benchmark_group("Lucas-Kanade");
    let mut rng = rand::rngs::StdRng::seed_from_u64(0);

    let (width, height) = (320usize, 240usize);

    // the new frame is the old one moved one pixel to the right
    let old_data: Vec<u8> = (0..width * height)
        .map(|_| rng.random_range(0..=255u8))
        .collect();
    let new_data = (0..width * height)
        .map(|i| if i % width == 0 { old_data[i] } else { old_data[i - 1] })
        .collect();

    let old_img = Image::<u8>::new([width, height].into(), old_data).unwrap();
    let new_img = Image::<u8>::new([width, height].into(), new_data).unwrap();

    let points: Vec<Point> = (0..100)
        .map(|_| Point::new(rng.random_range(20..300), rng.random_range(20..220)))
        .collect();

    for pyramid_level in [0u8, 2, 3].iter() {
        let config = LucasKanadeConfig::default()
            .with_max_points(100)
            .with_pyramid_level(*pyramid_level);

        group.bench_with_input(
            BenchmarkId::new("optical_flow_lk", format!("level{}", pyramid_level)),
            &config,
            |b, config| {
                b.iter(|| {
                    black_box(optical_flow_lk(&new_img, &old_img, &points, config)).unwrap();
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_tracking);
criterion_main!(benches);
