use lkflow_image::{Image, ImageError};

/// Normalisation of the gradient sums for 8-bit intensities.
pub(crate) const INTENSITY_NORM: i64 = 255;

/// Determinant below which a structure tensor is not inverted.
const MIN_DETERMINANT: i64 = 1;

/// The 2x2 second moment matrix of the gradients in a window.
///
/// `G = [Σ dx², Σ dx·dy; Σ dx·dy, Σ dy²] / 255`, stored row-major, together with
/// its determinant in subpixel units, `(G00·G11 - G01·G10) / subpixel_factor`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StructureTensor {
    g: [i64; 4],
    det: i64,
}

impl StructureTensor {
    /// Accumulate the structure tensor of a window from its gradients.
    ///
    /// # Arguments
    ///
    /// * `dx` - The horizontal gradient of the window.
    /// * `dy` - The vertical gradient of the window.
    /// * `subpixel_factor` - The fixed-point denominator of the determinant.
    ///
    /// PRECONDITION: `subpixel_factor` must be greater than zero.
    ///
    /// # Example
    ///
    /// ```
    /// use lkflow_image::Image;
    /// use lkflow_tracking::StructureTensor;
    ///
    /// let flat = Image::<i16>::from_size_val([5, 5].into(), 0).unwrap();
    /// let tensor = StructureTensor::from_gradients(&flat, &flat, 10).unwrap();
    ///
    /// assert_eq!(tensor.g(), [0; 4]);
    /// assert!(tensor.is_degenerate());
    /// ```
    pub fn from_gradients(
        dx: &Image<i16>,
        dy: &Image<i16>,
        subpixel_factor: u32,
    ) -> Result<Self, ImageError> {
        if dx.size() != dy.size() {
            return Err(ImageError::InvalidImageSize(
                dx.width(),
                dx.height(),
                dy.width(),
                dy.height(),
            ));
        }

        let (sum_xx, sum_xy, sum_yy) = dx.as_slice().iter().zip(dy.as_slice()).fold(
            (0i64, 0i64, 0i64),
            |(xx, xy, yy), (&gx, &gy)| {
                let (gx, gy) = (gx as i64, gy as i64);
                (xx + gx * gx, xy + gx * gy, yy + gy * gy)
            },
        );

        let g = [
            sum_xx / INTENSITY_NORM,
            sum_xy / INTENSITY_NORM,
            sum_xy / INTENSITY_NORM,
            sum_yy / INTENSITY_NORM,
        ];
        let det = (g[0] * g[3] - g[1] * g[2]) / subpixel_factor.max(1) as i64;

        Ok(Self { g, det })
    }

    /// The matrix entries, row-major.
    pub fn g(&self) -> [i64; 4] {
        self.g
    }

    /// The determinant in subpixel units.
    pub fn det(&self) -> i64 {
        self.det
    }

    /// Whether the window lacks the texture to solve for a displacement.
    pub fn is_degenerate(&self) -> bool {
        self.det < MIN_DETERMINANT
    }

    /// Solve `G · step = b` with the closed form inverse.
    ///
    /// The step is in subpixel units. Returns `None` for a degenerate tensor.
    pub fn solve(&self, b_x: i64, b_y: i64) -> Option<(i64, i64)> {
        if self.is_degenerate() {
            return None;
        }

        let [g00, g01, g10, g11] = self.g;
        let step_x = (g11 * b_x - g01 * b_y) / self.det;
        let step_y = (g00 * b_y - g10 * b_x) / self.det;

        Some((step_x, step_y))
    }
}
