use lkflow_image::{Image, ImageError, ImageSize};

/// Downsample an image by a factor of two.
///
/// Every destination pixel is the rounded mean of the corresponding 2x2 block
/// of the source. An odd last row or column of the source is dropped.
///
/// # Arguments
///
/// * `src` - The source image to be downsampled.
/// * `dst` - The destination image, of size `(src.width() / 2, src.height() / 2)`.
///
/// # Example
///
/// ```
/// use lkflow_image::Image;
/// use lkflow_imgproc::pyramid::pyrdown;
///
/// let image = Image::<u8>::new([4, 2].into(), vec![0, 2, 10, 10, 4, 6, 20, 21]).unwrap();
/// let mut downsampled = Image::<u8>::from_size_val([2, 1].into(), 0).unwrap();
///
/// pyrdown(&image, &mut downsampled).unwrap();
///
/// assert_eq!(downsampled.as_slice(), &[3, 15]);
/// ```
pub fn pyrdown(src: &Image<u8>, dst: &mut Image<u8>) -> Result<(), ImageError> {
    let expected_width = src.width() / 2;
    let expected_height = src.height() / 2;

    if dst.width() != expected_width || dst.height() != expected_height {
        return Err(ImageError::InvalidImageSize(
            expected_width,
            expected_height,
            dst.width(),
            dst.height(),
        ));
    }

    let src_width = src.width();
    let src_data = src.as_slice();

    dst.as_slice_mut()
        .chunks_exact_mut(expected_width)
        .enumerate()
        .for_each(|(y, dst_row)| {
            let row0 = &src_data[2 * y * src_width..(2 * y + 1) * src_width];
            let row1 = &src_data[(2 * y + 1) * src_width..(2 * y + 2) * src_width];
            for (x, out) in dst_row.iter_mut().enumerate() {
                let sum = row0[2 * x] as u16
                    + row0[2 * x + 1] as u16
                    + row1[2 * x] as u16
                    + row1[2 * x + 1] as u16;
                *out = ((sum + 2) / 4) as u8;
            }
        });

    Ok(())
}

/// An image pyramid of grayscale images.
///
/// Level 0 holds the original resolution and every following level halves
/// the width and height of the previous one.
#[derive(Clone, Debug)]
pub struct Pyramid {
    levels: Vec<Image<u8>>,
}

impl Pyramid {
    /// Build a pyramid with `level_count + 1` levels from an image.
    ///
    /// # Arguments
    ///
    /// * `src` - The full resolution image, copied into level 0.
    /// * `level_count` - The number of downsampled levels to add.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::EmptyImage`] if a level would end up with zero
    /// width or height.
    ///
    /// # Example
    ///
    /// ```
    /// use lkflow_image::Image;
    /// use lkflow_imgproc::pyramid::Pyramid;
    ///
    /// let image = Image::<u8>::from_size_val([64, 48].into(), 7).unwrap();
    /// let pyramid = Pyramid::build(&image, 2).unwrap();
    ///
    /// assert_eq!(pyramid.num_levels(), 3);
    /// assert_eq!(pyramid.coarsest().width(), 16);
    /// assert_eq!(pyramid.coarsest().height(), 12);
    /// ```
    pub fn build(src: &Image<u8>, level_count: u8) -> Result<Self, ImageError> {
        let mut levels = Vec::with_capacity(level_count as usize + 1);
        let mut current = src.clone();

        for _ in 0..level_count {
            let size = ImageSize {
                width: current.width() / 2,
                height: current.height() / 2,
            };
            let mut next = Image::from_size_val(size, 0u8)?;
            pyrdown(&current, &mut next)?;
            levels.push(std::mem::replace(&mut current, next));
        }
        levels.push(current);

        log::trace!(
            "built pyramid with {} levels from {}",
            levels.len(),
            src.size()
        );

        Ok(Self { levels })
    }

    /// Get all the levels, finest first.
    pub fn levels(&self) -> &[Image<u8>] {
        &self.levels
    }

    /// Get a level of the pyramid, or `None` if the level does not exist.
    pub fn level(&self, index: usize) -> Option<&Image<u8>> {
        self.levels.get(index)
    }

    /// Get the lowest resolution level.
    pub fn coarsest(&self) -> &Image<u8> {
        // a pyramid always holds at least the original image
        &self.levels[self.levels.len() - 1]
    }

    /// Get the number of levels, including the original resolution.
    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }
}
