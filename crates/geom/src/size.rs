use super::{Axis, Point, Rect};

/// A `Size` has a width and height but no location.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    /// Horizontal extent.
    pub width: f64,
    /// Vertical extent.
    pub height: f64,
}

impl Size {
    /// The empty size.
    pub const ZERO: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    /// Construct a size.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Build a size from main/cross extents along an axis.
    pub fn from_main_cross(axis: Axis, main: f64, cross: f64) -> Self {
        match axis {
            Axis::Horizontal => Self::new(main, cross),
            Axis::Vertical => Self::new(cross, main),
        }
    }

    /// Extent along an axis.
    pub fn along(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }

    /// Extent along the main axis.
    pub fn main(&self, axis: Axis) -> f64 {
        self.along(axis)
    }

    /// Extent along the cross axis.
    pub fn cross(&self, axis: Axis) -> f64 {
        self.along(axis.cross())
    }

    /// Set the extent along an axis.
    pub fn set_along(&mut self, axis: Axis, value: f64) {
        match axis {
            Axis::Horizontal => self.width = value,
            Axis::Vertical => self.height = value,
        }
    }

    /// True if both extents are finite and non-negative.
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width >= 0.0 && self.height >= 0.0
    }

    /// Return a `Rect` with these dimensions located at `tl`.
    pub fn at(&self, tl: Point) -> Rect {
        Rect {
            tl,
            w: self.width,
            h: self.height,
        }
    }
}
