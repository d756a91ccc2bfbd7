use lkflow_image::{ImageError, ImageSize};

/// Errors that abort a whole tracking call.
///
/// Points that cannot be tracked are not errors, they are dropped from the
/// result (see [`RejectReason`]).
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TrackingError {
    /// Error related to the image buffers.
    #[error(transparent)]
    ImageError(#[from] ImageError),

    /// The two frames do not have the same size.
    #[error("The new frame ({0}) and the old frame ({1}) have different sizes")]
    FrameSizeMismatch(ImageSize, ImageSize),

    /// The subpixel factor is zero.
    #[error("The subpixel factor must be greater than zero")]
    InvalidSubpixelFactor,

    /// The frame size in subpixel units does not fit the fixed-point positions and flows.
    #[error("A frame of {0} with a subpixel factor of {1} exceeds the fixed-point range")]
    SubpixelOverflow(ImageSize, u32),
}

/// The reason a point was dropped while tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The tracking window does not fit inside the image.
    OutOfRoi,
    /// The window has too little texture for the structure tensor to be inverted.
    DegenerateTexture,
    /// The window error stayed above the error threshold in the second half of the iterations.
    Divergence,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let reason = match self {
            RejectReason::OutOfRoi => "window outside the region of interest",
            RejectReason::DegenerateTexture => "structure tensor determinant below 1",
            RejectReason::Divergence => "window error above the error threshold",
        };
        write!(f, "{}", reason)
    }
}
