use super::{Axis, Edges, Point, Size};

/// A rectangle with a top-left corner and dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Top-left corner.
    pub tl: Point,
    /// Width.
    pub w: f64,
    /// Height.
    pub h: f64,
}

impl Rect {
    /// Construct a rectangle.
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            tl: Point::new(x, y),
            w,
            h,
        }
    }

    /// The rectangle's dimensions.
    pub fn size(&self) -> Size {
        Size::new(self.w, self.h)
    }

    /// Leading coordinate along an axis.
    pub fn start(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.tl.x,
            Axis::Vertical => self.tl.y,
        }
    }

    /// Extent along an axis.
    pub fn extent(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.w,
            Axis::Vertical => self.h,
        }
    }

    /// Build a rectangle from main/cross origin and extents along an axis.
    pub fn from_main_cross(axis: Axis, main: (f64, f64), cross: (f64, f64)) -> Self {
        match axis {
            Axis::Horizontal => Self::new(main.0, cross.0, main.1, cross.1),
            Axis::Vertical => Self::new(cross.0, main.0, cross.1, main.1),
        }
    }

    /// Shrink the rectangle by the given insets. Extents never go negative.
    pub fn inset(&self, edges: Edges) -> Self {
        Self::new(
            self.tl.x + edges.left,
            self.tl.y + edges.top,
            (self.w - edges.horizontal()).max(0.0),
            (self.h - edges.vertical()).max(0.0),
        )
    }

    /// True if every coordinate is finite and both extents are non-negative.
    pub fn is_valid(&self) -> bool {
        self.tl.x.is_finite() && self.tl.y.is_finite() && self.size().is_valid()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn inset() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(r.inset(Edges::all(1.0)), Rect::new(1.0, 1.0, 8.0, 8.0));
        assert_eq!(
            r.inset(Edges::new(2.0, 0.0, 3.0, 1.0)),
            Rect::new(2.0, 0.0, 5.0, 9.0)
        );
        assert_eq!(r.inset(Edges::all(6.0)).size(), Size::ZERO);
    }

    #[test]
    fn main_cross() {
        let r = Rect::from_main_cross(Axis::Vertical, (5.0, 10.0), (1.0, 2.0));
        assert_eq!(r, Rect::new(1.0, 5.0, 2.0, 10.0));
        assert_eq!(r.start(Axis::Vertical), 5.0);
        assert_eq!(r.extent(Axis::Horizontal), 2.0);
    }

    proptest! {
        #[test]
        fn inset_never_negative(
            w in 0.0f64..1000.0,
            h in 0.0f64..1000.0,
            pad in 0.0f64..600.0,
        ) {
            let r = Rect::new(0.0, 0.0, w, h).inset(Edges::all(pad));
            prop_assert!(r.is_valid());
            prop_assert!(r.w <= w && r.h <= h);
        }
    }
}
