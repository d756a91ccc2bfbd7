use crate::error::TrackingError;

/// Per-pixel error, in intensity levels, above which a window is considered lost.
const DEFAULT_MAX_PIXEL_ERROR: u64 = 25;

/// Parameters of a Lucas-Kanade tracking call.
///
/// All the values stay constant for one call. The defaults match a 11x11
/// window tracked over three pyramid levels with a tenth of a pixel precision.
///
/// # Example
///
/// ```
/// use lkflow_tracking::LucasKanadeConfig;
///
/// let config = LucasKanadeConfig::default()
///     .with_half_window_size(3)
///     .with_subpixel_factor(100);
///
/// assert_eq!(config.patch_size(), 7);
/// assert_eq!(config.padded_patch_size(), 9);
/// assert_eq!(config.error_threshold(), 25 * 25 * 49);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct LucasKanadeConfig {
    /// Half the side of the tracking window, the window is `2 * half_window_size + 1` pixels wide.
    pub half_window_size: u16,
    /// Fixed-point denominator of every position and displacement.
    pub subpixel_factor: u32,
    /// Maximum number of refinement steps per pyramid level.
    pub max_iterations: u8,
    /// Refinement stops once `|step_x| + |step_y|` in subpixel units drops below this value.
    pub step_threshold: u8,
    /// Maximum number of points tracked, extra points at the end of the input are ignored.
    pub max_points: u16,
    /// Number of downsampled pyramid levels on top of the full resolution image.
    pub pyramid_level: u8,
    /// Sum of squared window differences above which a point diverges.
    ///
    /// `None` uses `25² * patch_size²`, i.e. an average error of 25 intensity levels.
    pub error_threshold: Option<u64>,
}

impl Default for LucasKanadeConfig {
    fn default() -> Self {
        Self {
            half_window_size: 5,
            subpixel_factor: 10,
            max_iterations: 10,
            step_threshold: 2,
            max_points: 25,
            pyramid_level: 2,
            error_threshold: None,
        }
    }
}

impl LucasKanadeConfig {
    /// Sets the half window size.
    pub fn with_half_window_size(mut self, half_window_size: u16) -> Self {
        self.half_window_size = half_window_size;
        self
    }

    /// Sets the subpixel factor.
    pub fn with_subpixel_factor(mut self, subpixel_factor: u32) -> Self {
        self.subpixel_factor = subpixel_factor;
        self
    }

    /// Sets the maximum number of iterations per pyramid level.
    pub fn with_max_iterations(mut self, max_iterations: u8) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the step convergence threshold.
    pub fn with_step_threshold(mut self, step_threshold: u8) -> Self {
        self.step_threshold = step_threshold;
        self
    }

    /// Sets the maximum number of points to track.
    pub fn with_max_points(mut self, max_points: u16) -> Self {
        self.max_points = max_points;
        self
    }

    /// Sets the number of downsampled pyramid levels.
    pub fn with_pyramid_level(mut self, pyramid_level: u8) -> Self {
        self.pyramid_level = pyramid_level;
        self
    }

    /// Overrides the divergence error threshold.
    pub fn with_error_threshold(mut self, error_threshold: u64) -> Self {
        self.error_threshold = Some(error_threshold);
        self
    }

    /// The side of the tracking window in pixels.
    #[inline]
    pub fn patch_size(&self) -> usize {
        2 * self.half_window_size as usize + 1
    }

    /// The side of the old frame window, padded by one pixel for the gradients.
    #[inline]
    pub fn padded_patch_size(&self) -> usize {
        self.patch_size() + 2
    }

    /// The divergence threshold on the sum of squared window differences.
    pub fn error_threshold(&self) -> u64 {
        let patch_area = (self.patch_size() * self.patch_size()) as u64;
        self.error_threshold
            .unwrap_or(DEFAULT_MAX_PIXEL_ERROR * DEFAULT_MAX_PIXEL_ERROR * patch_area)
    }

    /// Checks that the parameters can be used for tracking.
    pub fn validate(&self) -> Result<(), TrackingError> {
        if self.subpixel_factor == 0 {
            return Err(TrackingError::InvalidSubpixelFactor);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() -> Result<(), TrackingError> {
        let config = LucasKanadeConfig::default();
        config.validate()?;

        assert_eq!(config.patch_size(), 11);
        assert_eq!(config.padded_patch_size(), 13);
        assert_eq!(config.error_threshold(), 625 * 121);

        Ok(())
    }

    #[test]
    fn test_error_threshold_override() {
        let config = LucasKanadeConfig::default().with_error_threshold(1000);
        assert_eq!(config.error_threshold(), 1000);
    }

    #[test]
    fn test_invalid_subpixel_factor() {
        let config = LucasKanadeConfig::default().with_subpixel_factor(0);
        assert_eq!(config.validate(), Err(TrackingError::InvalidSubpixelFactor));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_from_json() -> Result<(), serde_json::Error> {
        let config: LucasKanadeConfig =
            serde_json::from_str(r#"{ "half_window_size": 3, "pyramid_level": 0 }"#)?;

        assert_eq!(config.half_window_size, 3);
        assert_eq!(config.pyramid_level, 0);
        assert_eq!(config.subpixel_factor, 10);
        assert_eq!(config.error_threshold, None);

        Ok(())
    }
}
