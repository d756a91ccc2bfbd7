use lkflow_image::{Image, ImageError};

/// A fixed-point image coordinate.
///
/// Both components are expressed in pixels multiplied by a subpixel factor,
/// e.g. with a factor of 10 the value `(125, 40)` is the pixel position `(12.5, 4.0)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SubpixelPoint {
    /// The x coordinate in subpixel units.
    pub x: u32,
    /// The y coordinate in subpixel units.
    pub y: u32,
}

impl SubpixelPoint {
    /// Create a new subpixel point.
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Sample a window around a subpixel position with bilinear interpolation.
///
/// The size of `dst` defines the window. Sample `(i, j)` of the window reads the
/// source at `center + (i - dst.width() / 2, j - dst.height() / 2)` pixels. Samples
/// that land exactly on a pixel copy it, all others blend the four neighbours with
/// integer weights. Coordinates are bounded to the source image, so the sampler is
/// defined for every center; callers keep centers inside the region of interest to
/// avoid sampling replicated border pixels.
///
/// # Arguments
///
/// * `src` - The grayscale source image.
/// * `dst` - The window to fill.
/// * `center` - The window center in subpixel units.
/// * `subpixel_factor` - The fixed-point denominator of `center`.
///
/// # Errors
///
/// Returns [`ImageError::InvalidSubpixelFactor`] if the factor is zero or if
/// `factor² · 255` does not fit in an `i64`, the bound of the blend sums.
///
/// # Example
///
/// ```
/// use lkflow_image::Image;
/// use lkflow_imgproc::window::{subpixel_window, SubpixelPoint};
///
/// let src = Image::<u8>::new([3, 1].into(), vec![0, 100, 200]).unwrap();
/// let mut dst = Image::<u8>::from_size_val([1, 1].into(), 0).unwrap();
///
/// subpixel_window(&src, &mut dst, &SubpixelPoint::new(15, 0), 10).unwrap();
///
/// assert_eq!(dst.as_slice(), &[150]);
/// ```
pub fn subpixel_window(
    src: &Image<u8>,
    dst: &mut Image<u8>,
    center: &SubpixelPoint,
    subpixel_factor: u32,
) -> Result<(), ImageError> {
    let factor = subpixel_factor as i64;
    let norm = factor
        .checked_mul(factor)
        .filter(|&norm| norm > 0 && norm.checked_mul(u8::MAX as i64).is_some())
        .ok_or(ImageError::InvalidSubpixelFactor(subpixel_factor))?;

    let (src_width, src_height) = (src.width(), src.height());
    let (max_x, max_y) = (src_width as i64 * factor, src_height as i64 * factor);
    let half_width = (dst.width() / 2) as i64;
    let half_height = (dst.height() / 2) as i64;
    let src_data = src.as_slice();
    let dst_width = dst.width();

    dst.as_slice_mut()
        .chunks_exact_mut(dst_width)
        .enumerate()
        .for_each(|(j, dst_row)| {
            let y = (center.y as i64 + (j as i64 - half_height) * factor).clamp(0, max_y);
            let orig_y = (y / factor) as usize;
            let alpha_y = y - orig_y as i64 * factor;
            let y0 = orig_y.min(src_height - 1);
            let y1 = (orig_y + 1).min(src_height - 1);

            for (i, out) in dst_row.iter_mut().enumerate() {
                let x = (center.x as i64 + (i as i64 - half_width) * factor).clamp(0, max_x);
                let orig_x = (x / factor) as usize;
                let alpha_x = x - orig_x as i64 * factor;
                let x0 = orig_x.min(src_width - 1);

                if alpha_x == 0 && alpha_y == 0 {
                    *out = src_data[y0 * src_width + x0];
                    continue;
                }

                let x1 = (orig_x + 1).min(src_width - 1);
                let p00 = src_data[y0 * src_width + x0] as i64;
                let p01 = src_data[y0 * src_width + x1] as i64;
                let p10 = src_data[y1 * src_width + x0] as i64;
                let p11 = src_data[y1 * src_width + x1] as i64;

                let blend = (factor - alpha_x) * (factor - alpha_y) * p00
                    + alpha_x * (factor - alpha_y) * p01
                    + (factor - alpha_x) * alpha_y * p10
                    + alpha_x * alpha_y * p11;

                *out = (blend / norm) as u8;
            }
        });

    Ok(())
}
