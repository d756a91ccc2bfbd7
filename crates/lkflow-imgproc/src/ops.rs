use lkflow_image::{Image, ImageError};

/// Compute the pixel-wise difference between a padded window and a window.
///
/// `padded` carries a one pixel border around the region compared with
/// `window`, which is how the old frame window is sampled for the gradients.
/// Each difference is `padded(x + 1, y + 1) - window(x, y)`.
///
/// # Arguments
///
/// * `padded` - The padded window, two pixels larger than `window` on each axis.
/// * `window` - The window to subtract.
/// * `diff` - The signed difference, same size as `window`.
///
/// # Returns
///
/// The sum of the squared differences.
///
/// # Example
///
/// ```
/// use lkflow_image::Image;
/// use lkflow_imgproc::ops::image_difference;
///
/// let padded = Image::<u8>::new([3, 3].into(), vec![0, 0, 0, 0, 50, 0, 0, 0, 0]).unwrap();
/// let window = Image::<u8>::new([1, 1].into(), vec![47]).unwrap();
/// let mut diff = Image::<i16>::from_size_val([1, 1].into(), 0).unwrap();
///
/// let error = image_difference(&padded, &window, &mut diff).unwrap();
///
/// assert_eq!(diff.as_slice(), &[3]);
/// assert_eq!(error, 9);
/// ```
pub fn image_difference(
    padded: &Image<u8>,
    window: &Image<u8>,
    diff: &mut Image<i16>,
) -> Result<u64, ImageError> {
    if padded.width() != window.width() + 2 || padded.height() != window.height() + 2 {
        return Err(ImageError::InvalidImageSize(
            window.width() + 2,
            window.height() + 2,
            padded.width(),
            padded.height(),
        ));
    }

    if diff.size() != window.size() {
        return Err(ImageError::InvalidImageSize(
            window.width(),
            window.height(),
            diff.width(),
            diff.height(),
        ));
    }

    let width = window.width();
    let padded_width = padded.width();
    let padded_data = padded.as_slice();
    let mut sum_diff2 = 0u64;

    diff.as_slice_mut()
        .chunks_exact_mut(width)
        .zip(window.as_slice().chunks_exact(width))
        .enumerate()
        .for_each(|(y, (diff_row, window_row))| {
            let padded_row = &padded_data[(y + 1) * padded_width + 1..][..width];
            for ((out, &a), &b) in diff_row.iter_mut().zip(padded_row).zip(window_row) {
                let d = a as i16 - b as i16;
                sum_diff2 += (d as i32 * d as i32) as u64;
                *out = d;
            }
        });

    Ok(sum_diff2)
}

/// Compute the sum of the element-wise products of two signed patches.
///
/// # Example
///
/// ```
/// use lkflow_image::Image;
/// use lkflow_imgproc::ops::image_multiply;
///
/// let a = Image::<i16>::new([2, 1].into(), vec![3, -4]).unwrap();
/// let b = Image::<i16>::new([2, 1].into(), vec![10, 5]).unwrap();
///
/// assert_eq!(image_multiply(&a, &b).unwrap(), 10);
/// ```
pub fn image_multiply(a: &Image<i16>, b: &Image<i16>) -> Result<i64, ImageError> {
    if a.size() != b.size() {
        return Err(ImageError::InvalidImageSize(
            a.width(),
            a.height(),
            b.width(),
            b.height(),
        ));
    }

    Ok(a.as_slice()
        .iter()
        .zip(b.as_slice())
        .map(|(&x, &y)| x as i64 * y as i64)
        .sum())
}
