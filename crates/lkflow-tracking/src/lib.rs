#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//! The tracker follows a sparse set of points from an old frame to a new frame
//! with the pyramidal Lucas-Kanade method. Positions, displacements and all the
//! intermediate sums are integers scaled by a caller-chosen subpixel factor.

/// Tracking parameters.
pub mod config;

/// Error types for the tracking module.
pub mod error;

/// Point and flow vector types.
pub mod flow;

/// Coarse-to-fine tracking over image pyramids.
pub mod lucas_kanade;

/// Per-level iterative flow refinement of a single point.
pub mod solver;

/// Structure tensor of a gradient window.
pub mod tensor;

pub use crate::config::LucasKanadeConfig;
pub use crate::error::{RejectReason, TrackingError};
pub use crate::flow::{FlowVector, Point};
pub use crate::lucas_kanade::{optical_flow_lk, LucasKanadeTracker};
pub use crate::solver::PointStatus;
pub use crate::tensor::StructureTensor;
pub use lkflow_imgproc::window::SubpixelPoint;
