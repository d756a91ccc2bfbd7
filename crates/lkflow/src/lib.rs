#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use lkflow_image as image;

#[doc(inline)]
pub use lkflow_imgproc as imgproc;

#[doc(inline)]
pub use lkflow_tracking as tracking;
