use lkflow_imgproc::window::SubpixelPoint;

/// A full resolution pixel position to track.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    /// The x coordinate in pixels.
    pub x: u32,
    /// The y coordinate in pixels.
    pub y: u32,
}

impl Point {
    /// Create a new point.
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl From<(u32, u32)> for Point {
    fn from((x, y): (u32, u32)) -> Self {
        Self { x, y }
    }
}

/// The motion of a tracked point.
///
/// `pos` is where the point started in the old frame and `flow_x`, `flow_y`
/// the displacement to its position in the new frame. All values are in
/// subpixel units of the pyramid level being processed; the vectors returned
/// by the tracker are expressed at full resolution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlowVector {
    /// Position in the old frame.
    pub pos: SubpixelPoint,
    /// Horizontal displacement.
    pub flow_x: i32,
    /// Vertical displacement.
    pub flow_y: i32,
}

impl FlowVector {
    /// Create a flow vector with zero displacement.
    pub fn new(pos: SubpixelPoint) -> Self {
        Self {
            pos,
            flow_x: 0,
            flow_y: 0,
        }
    }

    /// Re-express the vector one pyramid level finer, i.e. at twice the resolution.
    ///
    /// Vectors seeded by [`crate::optical_flow_lk`] stay within the frame
    /// extent in subpixel units, which the call bounds by `i32::MAX`, so the
    /// doubling is exact there. Values beyond that saturate.
    ///
    /// # Example
    ///
    /// ```
    /// use lkflow_tracking::{FlowVector, SubpixelPoint};
    ///
    /// let vector = FlowVector { pos: SubpixelPoint::new(105, 40), flow_x: -3, flow_y: 7 };
    /// let finer = vector.to_finer_level();
    ///
    /// assert_eq!(finer.pos, SubpixelPoint::new(210, 80));
    /// assert_eq!((finer.flow_x, finer.flow_y), (-6, 14));
    /// ```
    pub fn to_finer_level(&self) -> Self {
        Self {
            pos: SubpixelPoint::new(self.pos.x.saturating_mul(2), self.pos.y.saturating_mul(2)),
            flow_x: self.flow_x.saturating_mul(2),
            flow_y: self.flow_y.saturating_mul(2),
        }
    }

    /// The displaced position `pos + flow` in subpixel units.
    ///
    /// The result is signed since a displacement can point outside the image.
    pub fn end_position(&self) -> [i64; 2] {
        [
            self.pos.x as i64 + self.flow_x as i64,
            self.pos.y as i64 + self.flow_y as i64,
        ]
    }

    /// The start position in pixels.
    pub fn position_pixels(&self, subpixel_factor: u32) -> [f32; 2] {
        let factor = subpixel_factor as f32;
        [self.pos.x as f32 / factor, self.pos.y as f32 / factor]
    }

    /// The displacement in pixels.
    pub fn flow_pixels(&self, subpixel_factor: u32) -> [f32; 2] {
        let factor = subpixel_factor as f32;
        [self.flow_x as f32 / factor, self.flow_y as f32 / factor]
    }
}
