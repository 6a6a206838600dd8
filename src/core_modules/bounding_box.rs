// THEORY:
// The `BoundingBox` is the unit of work for every layer above the flood fill.
// It starts life as the extent of one connected component and may grow into the
// extent of a whole cluster of components once the merger has run. Like the
// `Pixel`, it is a "dumb" data container: it knows its own geometry (edges,
// area, union, center) but nothing about tolerance or ordering policy.
//
// Edges are exclusive on the right and bottom, so a box at x=2 with width=10
// spans columns 2..12.

/// A 2D point on the pixel grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

/// An axis-aligned rectangle in pixel coordinates. Width and height are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        debug_assert!(width >= 1 && height >= 1, "empty bounding box");
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds the box spanning two inclusive corners.
    pub fn from_corners(top_left: Point, bottom_right: Point) -> Self {
        Self::new(
            top_left.x,
            top_left.y,
            bottom_right.x - top_left.x + 1,
            bottom_right.y - top_left.y + 1,
        )
    }

    /// Exclusive right edge.
    #[inline]
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    #[inline]
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Twice the horizontal center. Orders like `x + width / 2` without floats.
    #[inline]
    pub fn center_x2(&self) -> u64 {
        2 * u64::from(self.x) + u64::from(self.width)
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// The smallest box enclosing both `self` and `other`.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        BoundingBox {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }
}
