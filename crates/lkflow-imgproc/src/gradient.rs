use lkflow_image::{Image, ImageError};

/// Compute the horizontal and vertical gradients of a padded window.
///
/// Every interior pixel of `src` produces one gradient sample from the
/// difference of its two neighbours along each axis, so both outputs are two
/// pixels narrower and two pixels shorter than the input.
///
/// # Arguments
///
/// * `src` - The padded grayscale window.
/// * `dx` - The horizontal gradient, `I(x + 1, y) - I(x - 1, y)`.
/// * `dy` - The vertical gradient, `I(x, y + 1) - I(x, y - 1)`.
///
/// # Example
///
/// ```
/// use lkflow_image::Image;
/// use lkflow_imgproc::gradient::image_gradients;
///
/// let src = Image::<u8>::new([3, 3].into(), vec![0, 10, 20, 5, 15, 25, 10, 20, 30]).unwrap();
/// let mut dx = Image::<i16>::from_size_val([1, 1].into(), 0).unwrap();
/// let mut dy = Image::<i16>::from_size_val([1, 1].into(), 0).unwrap();
///
/// image_gradients(&src, &mut dx, &mut dy).unwrap();
///
/// assert_eq!(dx.as_slice(), &[20]);
/// assert_eq!(dy.as_slice(), &[10]);
/// ```
pub fn image_gradients(
    src: &Image<u8>,
    dx: &mut Image<i16>,
    dy: &mut Image<i16>,
) -> Result<(), ImageError> {
    let out_width = src.width().saturating_sub(2);
    let out_height = src.height().saturating_sub(2);

    for grad in [&*dx, &*dy] {
        if grad.width() != out_width || grad.height() != out_height {
            return Err(ImageError::InvalidImageSize(
                out_width,
                out_height,
                grad.width(),
                grad.height(),
            ));
        }
    }

    let width = src.width();
    let src_data = src.as_slice();

    dx.as_slice_mut()
        .chunks_exact_mut(out_width)
        .zip(dy.as_slice_mut().chunks_exact_mut(out_width))
        .enumerate()
        .for_each(|(y, (dx_row, dy_row))| {
            let center = (y + 1) * width;
            for (x, (gx, gy)) in dx_row.iter_mut().zip(dy_row.iter_mut()).enumerate() {
                let idx = center + x + 1;
                *gx = src_data[idx + 1] as i16 - src_data[idx - 1] as i16;
                *gy = src_data[idx + width] as i16 - src_data[idx - width] as i16;
            }
        });

    Ok(())
}
