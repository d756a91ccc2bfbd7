#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// image gradient module.
pub mod gradient;

/// pixel-wise patch arithmetic module.
pub mod ops;

/// Pyramid operations
pub mod pyramid;

/// sub-pixel window sampling module.
pub mod window;
