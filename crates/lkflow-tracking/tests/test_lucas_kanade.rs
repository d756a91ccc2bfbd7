use lkflow_image::{Image, ImageError};
use lkflow_tracking::{
    optical_flow_lk,
    solver::{track_point_at_level, PatchWorkspace},
    FlowVector, LucasKanadeConfig, LucasKanadeTracker, Point, PointStatus, SubpixelPoint,
    TrackingError,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn random_texture(width: usize, height: usize, seed: u64) -> Result<Image<u8>, ImageError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let data = (0..width * height)
        .map(|_| rng.random_range(0..=255u8))
        .collect();
    Image::new([width, height].into(), data)
}

/// Smooth periodic texture, moved by `(shift_x, shift_y)` pixels.
fn shifted_texture(
    width: usize,
    height: usize,
    shift_x: f32,
    shift_y: f32,
) -> Result<Image<u8>, ImageError> {
    let tau = std::f32::consts::TAU;
    let data = (0..height)
        .flat_map(|y| {
            (0..width).map(move |x| {
                let u = x as f32 - shift_x;
                let v = y as f32 - shift_y;
                let val = 128.0 + 50.0 * (tau * u / 16.0).sin() + 50.0 * (tau * v / 20.0).cos();
                val.round().clamp(0.0, 255.0) as u8
            })
        })
        .collect();
    Image::new([width, height].into(), data)
}

#[test]
fn identical_frames_have_zero_flow() -> Result<(), TrackingError> {
    let frame = random_texture(96, 96, 7)?;
    let config = LucasKanadeConfig::default();

    let points: Vec<Point> = [24u32, 36, 48, 60, 72]
        .iter()
        .flat_map(|&y| [24u32, 36, 48, 60, 72].map(|x| Point::new(x, y)))
        .collect();

    let vectors = optical_flow_lk(&frame, &frame, &points, &config)?;

    assert_eq!(vectors.len(), points.len());
    for vector in &vectors {
        assert_eq!((vector.flow_x, vector.flow_y), (0, 0));
    }

    Ok(())
}

#[test]
fn points_near_the_border_are_dropped() -> Result<(), TrackingError> {
    let frame = random_texture(64, 48, 3)?;
    let config = LucasKanadeConfig::default()
        .with_half_window_size(4)
        .with_pyramid_level(0);

    let points = [
        Point::new(3, 20),
        Point::new(61, 20),
        Point::new(30, 3),
        Point::new(30, 45),
        Point::new(30, 20),
        Point::new(0, 0),
    ];

    let vectors = optical_flow_lk(&frame, &frame, &points, &config)?;

    assert_eq!(vectors, vec![FlowVector::new(SubpixelPoint::new(300, 200))]);

    Ok(())
}

#[test]
fn uniform_frames_are_untrackable() -> Result<(), TrackingError> {
    let frame = Image::<u8>::from_size_val([64, 64].into(), 90)?;
    let config = LucasKanadeConfig::default();

    let points = [Point::new(32, 32), Point::new(20, 40), Point::new(44, 24)];

    let vectors = optical_flow_lk(&frame, &frame, &points, &config)?;

    assert!(vectors.is_empty());

    Ok(())
}

#[test]
fn point_cap_keeps_the_first_points_in_order() -> Result<(), TrackingError> {
    let frame = random_texture(96, 96, 11)?;
    let config = LucasKanadeConfig::default().with_max_points(4);

    let points = [
        Point::new(60, 30),
        Point::new(30, 60),
        Point::new(2, 48),
        Point::new(48, 48),
        Point::new(40, 40),
        Point::new(50, 36),
    ];

    let vectors = optical_flow_lk(&frame, &frame, &points, &config)?;

    let positions: Vec<SubpixelPoint> = vectors.iter().map(|v| v.pos).collect();
    assert_eq!(
        positions,
        vec![
            SubpixelPoint::new(600, 300),
            SubpixelPoint::new(300, 600),
            SubpixelPoint::new(480, 480),
        ]
    );

    Ok(())
}

#[test]
fn finer_level_rejection_keeps_survivor_order() -> Result<(), TrackingError> {
    let (width, height) = (128usize, 128usize);
    let mut rng = StdRng::seed_from_u64(5);
    let old_data: Vec<u8> = (0..width * height)
        .map(|_| rng.random_range(40..=215u8))
        .collect();

    // +-40 checker noise on even aligned 2x2 blocks around the middle point,
    // averaged away by the first downsampling
    let new_data = old_data
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let (x, y) = (i % width, i / width);
            if !(40..88).contains(&x) || !(40..88).contains(&y) {
                v
            } else if (x + y) % 2 == 0 {
                v + 40
            } else {
                v - 40
            }
        })
        .collect();

    let old = Image::<u8>::new([width, height].into(), old_data)?;
    let new = Image::<u8>::new([width, height].into(), new_data)?;

    let old_pyramid = lkflow_imgproc::pyramid::Pyramid::build(&old, 1)?;
    let new_pyramid = lkflow_imgproc::pyramid::Pyramid::build(&new, 1)?;
    assert_eq!(old_pyramid.coarsest(), new_pyramid.coarsest());

    // any window error left in the last iteration is a divergence
    let config = LucasKanadeConfig::default()
        .with_pyramid_level(1)
        .with_max_iterations(4)
        .with_step_threshold(0)
        .with_error_threshold(0);

    let points = [Point::new(20, 64), Point::new(64, 64), Point::new(108, 64)];

    let vectors = optical_flow_lk(&new, &old, &points, &config)?;

    assert_eq!(
        vectors,
        vec![
            FlowVector::new(SubpixelPoint::new(200, 640)),
            FlowVector::new(SubpixelPoint::new(1080, 640)),
        ]
    );

    // all three survive the coarsest level alone
    let coarse_only = optical_flow_lk(
        new_pyramid.coarsest(),
        old_pyramid.coarsest(),
        &[Point::new(10, 32), Point::new(32, 32), Point::new(54, 32)],
        &config.clone().with_pyramid_level(0),
    )?;
    assert_eq!(coarse_only.len(), 3);

    Ok(())
}

#[test]
fn oversized_subpixel_factor_fails_the_call() -> Result<(), TrackingError> {
    let frame = random_texture(256, 256, 9)?;
    let config = LucasKanadeConfig::default()
        .with_subpixel_factor(1 << 26)
        .with_pyramid_level(2);

    let res = optical_flow_lk(&frame, &frame, &[Point::new(70, 128)], &config);

    assert_eq!(
        res,
        Err(TrackingError::SubpixelOverflow([256, 256].into(), 1 << 26))
    );

    Ok(())
}

#[test]
fn surviving_count_never_exceeds_the_cap() -> Result<(), TrackingError> {
    let mut rng = StdRng::seed_from_u64(42);
    let old = random_texture(80, 60, 1)?;
    let new = random_texture(80, 60, 2)?;

    for max_points in [0u16, 5, 30, 200] {
        let config = LucasKanadeConfig::default()
            .with_max_points(max_points)
            .with_pyramid_level(1);
        let points: Vec<Point> = (0..50)
            .map(|_| Point::new(rng.random_range(0..80), rng.random_range(0..60)))
            .collect();

        let vectors = optical_flow_lk(&new, &old, &points, &config)?;

        assert!(vectors.len() <= points.len().min(max_points as usize));
    }

    Ok(())
}

#[test]
fn known_translation_is_recovered() -> Result<(), TrackingError> {
    let old = shifted_texture(96, 96, 0.0, 0.0)?;
    let new = shifted_texture(96, 96, 1.0, 0.5)?;
    let config = LucasKanadeConfig::default()
        .with_subpixel_factor(100)
        .with_max_iterations(20)
        .with_pyramid_level(1);

    let points = [Point::new(30, 30), Point::new(48, 40), Point::new(62, 58)];

    let tracker = LucasKanadeTracker::new(config)?;
    let vectors = tracker.track(&new, &old, &points)?;

    assert_eq!(vectors.len(), points.len());
    for vector in &vectors {
        assert!((vector.flow_x - 100).abs() <= 20, "flow_x {}", vector.flow_x);
        assert!((vector.flow_y - 50).abs() <= 20, "flow_y {}", vector.flow_y);
    }

    Ok(())
}

#[test]
fn single_level_refinement_respects_the_iteration_budget() -> Result<(), TrackingError> {
    let old = shifted_texture(64, 64, 0.0, 0.0)?;
    let new = shifted_texture(64, 64, -0.6, 0.4)?;
    let config = LucasKanadeConfig::default()
        .with_subpixel_factor(100)
        .with_max_iterations(12)
        .with_pyramid_level(0);
    let mut workspace = PatchWorkspace::new(&config)?;
    let mut vector = FlowVector::new(SubpixelPoint::new(3200, 3000));

    let status = track_point_at_level(&old, &new, &mut vector, &mut workspace, &config)?;

    let PointStatus::Tracked { iterations } = status else {
        panic!("point was rejected: {:?}", status);
    };
    assert!(iterations <= config.max_iterations);
    assert!((vector.flow_x + 60).abs() <= 15, "flow_x {}", vector.flow_x);
    assert!((vector.flow_y - 40).abs() <= 15, "flow_y {}", vector.flow_y);

    Ok(())
}
