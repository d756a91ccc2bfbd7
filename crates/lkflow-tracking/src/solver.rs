use lkflow_image::{Image, ImageError, ImageSize};
use lkflow_imgproc::{
    gradient::image_gradients,
    ops::{image_difference, image_multiply},
    window::{subpixel_window, SubpixelPoint},
};

use crate::{
    config::LucasKanadeConfig,
    error::RejectReason,
    flow::FlowVector,
    tensor::{StructureTensor, INTENSITY_NORM},
};

/// The outcome of tracking one point at one pyramid level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointStatus {
    /// The point was refined and continues to the next level.
    Tracked {
        /// Number of refinement steps taken, at most the configured maximum.
        iterations: u8,
    },
    /// The point was dropped.
    Rejected(RejectReason),
}

/// Scratch windows shared by every point of a tracking call.
///
/// The windows only depend on the window size, so they are allocated once and
/// overwritten for each point and level.
pub struct PatchWorkspace {
    old_window: Image<u8>,
    new_window: Image<u8>,
    dx: Image<i16>,
    dy: Image<i16>,
    diff: Image<i16>,
}

impl PatchWorkspace {
    /// Allocate the windows for the given configuration.
    pub fn new(config: &LucasKanadeConfig) -> Result<Self, ImageError> {
        let patch_size = config.patch_size();
        let padded_patch_size = config.padded_patch_size();
        let patch = ImageSize {
            width: patch_size,
            height: patch_size,
        };

        Ok(Self {
            old_window: Image::from_size_val([padded_patch_size; 2].into(), 0)?,
            new_window: Image::from_size_val(patch, 0)?,
            dx: Image::from_size_val(patch, 0)?,
            dy: Image::from_size_val(patch, 0)?,
            diff: Image::from_size_val(patch, 0)?,
        })
    }
}

/// Check that a window centered at a subpixel position fits inside an image.
///
/// The center is truncated to whole pixels and must keep `half_window_size`
/// pixels to the left and top, and at least as many to the right and bottom
/// counting the image edge itself. With a subpixel factor of 1 this is the
/// check applied to integer input points.
///
/// # Example
///
/// ```
/// use lkflow_tracking::solver::window_in_roi;
///
/// let size = [20, 10].into();
///
/// assert!(window_in_roi([30, 30], size, 3, 10));
/// assert!(window_in_roi([170, 70], size, 3, 10));
/// assert!(!window_in_roi([29, 30], size, 3, 10));
/// assert!(!window_in_roi([180, 30], size, 3, 10));
/// assert!(!window_in_roi([-5, 30], size, 0, 10));
/// ```
pub fn window_in_roi(
    center: [i64; 2],
    size: ImageSize,
    half_window_size: u16,
    subpixel_factor: u32,
) -> bool {
    let factor = subpixel_factor.max(1) as i64;
    let half_window = half_window_size as i64;
    let x = center[0].div_euclid(factor);
    let y = center[1].div_euclid(factor);

    x >= half_window
        && size.width as i64 - x >= half_window
        && y >= half_window
        && size.height as i64 - y >= half_window
}

/// Refine the flow of one point at one pyramid level.
///
/// The old frame window around `vector.pos` gives the gradients and the
/// structure tensor once. Then, up to `max_iterations` times, the window of
/// the new frame at `pos + flow` is compared with the old one and the flow is
/// moved by the solution of the normal equations. The refinement stops early
/// once a step is smaller than the step threshold.
///
/// # Arguments
///
/// * `old_level` - The old frame at the current pyramid level.
/// * `new_level` - The new frame at the current pyramid level.
/// * `vector` - The point estimate in the units of the current level, updated in place.
/// * `workspace` - The scratch windows.
/// * `config` - The tracking parameters.
///
/// # Returns
///
/// Whether the point was tracked or why it was rejected. Errors come from
/// workspace windows that do not match the configuration and from subpixel
/// factors too large for the window interpolation.
pub fn track_point_at_level(
    old_level: &Image<u8>,
    new_level: &Image<u8>,
    vector: &mut FlowVector,
    workspace: &mut PatchWorkspace,
    config: &LucasKanadeConfig,
) -> Result<PointStatus, ImageError> {
    let factor = config.subpixel_factor;

    subpixel_window(old_level, &mut workspace.old_window, &vector.pos, factor)?;
    image_gradients(&workspace.old_window, &mut workspace.dx, &mut workspace.dy)?;

    let tensor = StructureTensor::from_gradients(&workspace.dx, &workspace.dy, factor)?;
    if tensor.is_degenerate() {
        return Ok(PointStatus::Rejected(RejectReason::DegenerateTexture));
    }

    let error_threshold = config.error_threshold();

    for it in 0..config.max_iterations {
        let candidate = vector.end_position();
        if !window_in_roi(candidate, new_level.size(), config.half_window_size, factor) {
            return Ok(PointStatus::Rejected(RejectReason::OutOfRoi));
        }

        let (Ok(x), Ok(y)) = (u32::try_from(candidate[0]), u32::try_from(candidate[1])) else {
            return Ok(PointStatus::Rejected(RejectReason::OutOfRoi));
        };

        subpixel_window(
            new_level,
            &mut workspace.new_window,
            &SubpixelPoint::new(x, y),
            factor,
        )?;

        let error = image_difference(
            &workspace.old_window,
            &workspace.new_window,
            &mut workspace.diff,
        )?;

        // early iterations may still be far off
        if error > error_threshold && it > config.max_iterations / 2 {
            return Ok(PointStatus::Rejected(RejectReason::Divergence));
        }

        let b_x = image_multiply(&workspace.diff, &workspace.dx)? / INTENSITY_NORM;
        let b_y = image_multiply(&workspace.diff, &workspace.dy)? / INTENSITY_NORM;

        let Some((step_x, step_y)) = tensor.solve(b_x, b_y) else {
            return Ok(PointStatus::Rejected(RejectReason::DegenerateTexture));
        };

        vector.flow_x = saturate_i32(vector.flow_x as i64 + step_x);
        vector.flow_y = saturate_i32(vector.flow_y as i64 + step_y);

        log::trace!(
            "iteration {}: error {}, step ({}, {}), flow ({}, {})",
            it,
            error,
            step_x,
            step_y,
            vector.flow_x,
            vector.flow_y
        );

        if step_x.abs() + step_y.abs() < config.step_threshold as i64 {
            return Ok(PointStatus::Tracked { iterations: it + 1 });
        }
    }

    Ok(PointStatus::Tracked {
        iterations: config.max_iterations,
    })
}

fn saturate_i32(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}
