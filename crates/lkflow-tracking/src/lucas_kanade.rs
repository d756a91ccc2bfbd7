use lkflow_image::{Image, ImageSize};
use lkflow_imgproc::{pyramid::Pyramid, window::SubpixelPoint};

use crate::{
    config::LucasKanadeConfig,
    error::{RejectReason, TrackingError},
    flow::{FlowVector, Point},
    solver::{track_point_at_level, window_in_roi, PatchWorkspace, PointStatus},
};

/// Compute the optical flow of a set of points with the pyramidal Lucas-Kanade method.
///
/// Only the first `config.max_points` points are considered. Points closer
/// than `half_window_size` pixels to the image border are dropped, the others
/// are tracked from the coarsest pyramid level down to the full resolution,
/// doubling their position and flow at each level. Points that leave the
/// image, lack texture or diverge at any level are dropped as well.
///
/// # Arguments
///
/// * `new_img` - The newest grayscale frame.
/// * `old_img` - The previous grayscale frame, where the points were found.
/// * `points` - The full resolution pixel positions to track.
/// * `config` - The tracking parameters.
///
/// # Returns
///
/// The flow vectors of the points that were tracked through every level, in
/// input order, in subpixel units of the full resolution frame. The number of
/// tracked points is the length of the result.
///
/// # Errors
///
/// Fails without a partial result if the configuration is invalid, the frames
/// differ in size, the frame size times the subpixel factor exceeds `i32::MAX`
/// or the pyramids cannot be built.
///
/// # Example
///
/// ```
/// use lkflow_image::Image;
/// use lkflow_tracking::{optical_flow_lk, LucasKanadeConfig, Point};
///
/// let data = (0..64 * 64).map(|i| ((i * 7919) % 251) as u8).collect();
/// let frame = Image::<u8>::new([64, 64].into(), data).unwrap();
/// let config = LucasKanadeConfig::default();
///
/// let points = [Point::new(32, 32), Point::new(1, 1)];
/// let vectors = optical_flow_lk(&frame, &frame, &points, &config).unwrap();
///
/// assert_eq!(vectors.len(), 1);
/// assert_eq!((vectors[0].flow_x, vectors[0].flow_y), (0, 0));
/// ```
pub fn optical_flow_lk(
    new_img: &Image<u8>,
    old_img: &Image<u8>,
    points: &[Point],
    config: &LucasKanadeConfig,
) -> Result<Vec<FlowVector>, TrackingError> {
    config.validate()?;

    if new_img.size() != old_img.size() {
        return Err(TrackingError::FrameSizeMismatch(
            new_img.size(),
            old_img.size(),
        ));
    }

    check_subpixel_range(old_img.size(), config.subpixel_factor)?;

    let pyramid_old = Pyramid::build(old_img, config.pyramid_level)?;
    let pyramid_new = Pyramid::build(new_img, config.pyramid_level)?;
    let mut workspace = PatchWorkspace::new(config)?;

    let max_points = points.len().min(config.max_points as usize);
    let mut vectors = seed_vectors(&points[..max_points], old_img.size(), config);

    let coarsest = pyramid_old.num_levels() - 1;
    let levels = pyramid_old.levels().iter().zip(pyramid_new.levels());

    for (level, (old_level, new_level)) in levels.enumerate().rev() {
        let num_candidates = vectors.len();
        let mut tracked = Vec::with_capacity(num_candidates);

        for mut vector in vectors {
            if level != coarsest {
                vector = vector.to_finer_level();
            }

            match track_point_at_level(old_level, new_level, &mut vector, &mut workspace, config)? {
                PointStatus::Tracked { iterations } => {
                    log::trace!(
                        "level {}: point {:?} tracked in {} iterations",
                        level,
                        vector.pos,
                        iterations
                    );
                    tracked.push(vector);
                }
                PointStatus::Rejected(reason) => {
                    log::debug!("level {}: point {:?} dropped, {}", level, vector.pos, reason);
                }
            }
        }

        log::debug!(
            "level {}: {} of {} points tracked",
            level,
            tracked.len(),
            num_candidates
        );

        vectors = tracked;
    }

    Ok(vectors)
}

/// Check that every position and displacement inside the frame fits the fixed-point types.
///
/// Positions are `u32` and flows `i32`, so the frame extent in subpixel units
/// is bounded by `i32::MAX`. Within that bound seeding and level doubling are exact.
fn check_subpixel_range(size: ImageSize, subpixel_factor: u32) -> Result<(), TrackingError> {
    let factor = subpixel_factor as u64;
    let extent = size.width.max(size.height) as u64;

    if extent.saturating_mul(factor) > i32::MAX as u64 {
        return Err(TrackingError::SubpixelOverflow(size, subpixel_factor));
    }

    Ok(())
}

/// Convert the input points to flow vectors at the coarsest pyramid level.
fn seed_vectors(points: &[Point], size: ImageSize, config: &LucasKanadeConfig) -> Vec<FlowVector> {
    let factor = config.subpixel_factor as u64;
    let scale = 1u64 << config.pyramid_level;

    points
        .iter()
        .filter_map(|point| {
            let center = [point.x as i64, point.y as i64];
            if !window_in_roi(center, size, config.half_window_size, 1) {
                log::debug!(
                    "point ({}, {}) dropped, {}",
                    point.x,
                    point.y,
                    RejectReason::OutOfRoi
                );
                return None;
            }

            // inside the frame, so bounded by `check_subpixel_range`
            let x = (point.x as u64 * factor / scale) as u32;
            let y = (point.y as u64 * factor / scale) as u32;

            Some(FlowVector::new(SubpixelPoint::new(x, y)))
        })
        .collect()
}

/// A Lucas-Kanade tracker with a fixed configuration.
///
/// The tracker keeps no state between frames, each call builds its own
/// pyramids and scratch windows.
#[derive(Debug, Clone)]
pub struct LucasKanadeTracker {
    config: LucasKanadeConfig,
}

impl LucasKanadeTracker {
    /// Creates a new tracker after checking the configuration.
    pub fn new(config: LucasKanadeConfig) -> Result<Self, TrackingError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns a reference to the tracker configuration.
    #[inline]
    pub fn config(&self) -> &LucasKanadeConfig {
        &self.config
    }

    /// Tracks the points from the old frame to the new frame.
    ///
    /// See [`optical_flow_lk`].
    pub fn track(
        &self,
        new_img: &Image<u8>,
        old_img: &Image<u8>,
        points: &[Point],
    ) -> Result<Vec<FlowVector>, TrackingError> {
        optical_flow_lk(new_img, old_img, points, &self.config)
    }
}
