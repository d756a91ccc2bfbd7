/// An error type for the image module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ImageError {
    /// Error when the data length does not match the image size.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidChannelShape(usize, usize),

    /// Error when an image does not have the expected size.
    #[error("Invalid image size, expected ({0}x{1}) but got ({2}x{3})")]
    InvalidImageSize(usize, usize, usize, usize),

    /// Error when the pixel coordinates are out of bounds.
    #[error("Pixel coordinates ({0}, {1}) are out of bounds ({2}, {3})")]
    PixelIndexOutOfBounds(usize, usize, usize, usize),

    /// Error when a subpixel factor is zero or too large for integer interpolation.
    #[error("Invalid subpixel factor {0}")]
    InvalidSubpixelFactor(u32),

    /// Error when an image is requested with zero width or height.
    #[error("Image must have a non-zero width and height")]
    EmptyImage,
}
