// THEORY:
// The `ComponentFinder` is the first stage of the slicer. It performs binary
// connected-component labeling: every pixel is either background (exactly equal
// to the background color) or foreground, and every maximal 8-connected group of
// foreground pixels becomes one sprite candidate.
//
// Key architectural principles & algorithm steps:
// 1.  **Row-Major Seeding**: The raster is scanned top-to-bottom, left-to-right.
//     The first unvisited foreground pixel found becomes the seed of a new
//     component. Components are therefore emitted in order of their topmost,
//     then leftmost, pixel.
// 2.  **Iterative Flood Fill**: From the seed, the fill walks all 8 neighbors
//     with an explicit, heap-allocated stack. A sheet that is one giant sprite
//     visits width x height pixels transitively, which is far beyond what the
//     call stack could hold with recursion.
// 3.  **Visit Once**: A single `VisitedMask` is shared by the scan and every
//     fill. A pixel is marked the first time it is examined and never examined
//     again, so each pixel belongs to at most one component and a run costs
//     O(width x height).
// 4.  **Extent Only**: The fill keeps nothing but the running min/max of x and
//     y. The member pixels are not retained.
// 5.  **Stateless Utility**: `find_components` owns its working memory for one
//     call and drops it on return.

use crate::core_modules::bounding_box::{BoundingBox, Point};
use crate::core_modules::pixel::pixel::{BackgroundColor, PixelSource};

pub mod component_finder {
    use super::*;
    use tracing::trace;

    /// Offsets of the 8-connected neighborhood.
    const NEIGHBORS: [(i64, i64); 8] = [
        (0, 1),
        (0, -1),
        (1, 0),
        (-1, 0),
        (1, 1),
        (1, -1),
        (-1, 1),
        (-1, -1),
    ];

    /// Run-scoped record of which pixels have already been examined.
    pub(crate) struct VisitedMask {
        width: usize,
        cells: Vec<bool>,
    }

    impl VisitedMask {
        pub(crate) fn new(width: usize, height: usize) -> Self {
            Self {
                width,
                cells: vec![false; width * height],
            }
        }

        /// Marks `point` as visited. Returns false if it already was.
        #[inline]
        pub(crate) fn visit(&mut self, point: Point) -> bool {
            let cell = &mut self.cells[point.y as usize * self.width + point.x as usize];
            !std::mem::replace(cell, true)
        }
    }

    /// Finds every 8-connected region of non-background pixels and returns the
    /// bounding box of each one, in order of discovery.
    pub fn find_components<P: PixelSource + ?Sized>(
        pixels: &P,
        background: BackgroundColor,
    ) -> Vec<BoundingBox> {
        let width = pixels.width();
        let height = pixels.height();
        if width == 0 || height == 0 {
            return Vec::new();
        }

        let mut visited = VisitedMask::new(width as usize, height as usize);
        let mut stack: Vec<Point> = Vec::new();
        let mut boxes: Vec<BoundingBox> = Vec::new();

        for y in 0..height {
            for x in 0..width {
                let seed = Point { x, y };
                if !visited.visit(seed) {
                    continue;
                }
                if background.matches(&pixels.pixel(x, y)) {
                    continue;
                }

                let component = flood_fill(pixels, background, seed, &mut visited, &mut stack);
                trace!(?component, "component found");
                boxes.push(component);
            }
        }

        boxes
    }

    /// Walks the component containing `seed` (already marked visited and known to
    /// be foreground) and returns its extent. `stack` is reused scratch space and
    /// is empty again on return.
    fn flood_fill<P: PixelSource + ?Sized>(
        pixels: &P,
        background: BackgroundColor,
        seed: Point,
        visited: &mut VisitedMask,
        stack: &mut Vec<Point>,
    ) -> BoundingBox {
        let width = i64::from(pixels.width());
        let height = i64::from(pixels.height());

        let mut min = seed;
        let mut max = seed;
        stack.push(seed);

        while let Some(current) = stack.pop() {
            min.x = min.x.min(current.x);
            min.y = min.y.min(current.y);
            max.x = max.x.max(current.x);
            max.y = max.y.max(current.y);

            for (dx, dy) in NEIGHBORS {
                let nx = i64::from(current.x) + dx;
                let ny = i64::from(current.y) + dy;
                if nx < 0 || nx >= width || ny < 0 || ny >= height {
                    continue;
                }

                let neighbor = Point {
                    x: nx as u32,
                    y: ny as u32,
                };
                // Background neighbors are marked too; the scan would skip them anyway.
                if visited.visit(neighbor) && !background.matches(&pixels.pixel(neighbor.x, neighbor.y)) {
                    stack.push(neighbor);
                }
            }
        }

        BoundingBox::from_corners(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::component_finder::find_components;
    use super::*;
    use image::{Rgba, RgbaImage};

    const BG: Rgba<u8> = Rgba([255, 0, 255, 255]);
    const INK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    fn sheet(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, BG)
    }

    fn background() -> BackgroundColor {
        BackgroundColor::rgb(255, 0, 255)
    }

    #[test]
    fn all_background_yields_nothing() {
        assert!(find_components(&sheet(16, 9), background()).is_empty());
    }

    #[test]
    fn empty_raster_yields_nothing() {
        assert!(find_components(&RgbaImage::new(0, 5), background()).is_empty());
        assert!(find_components(&RgbaImage::new(5, 0), background()).is_empty());
    }

    #[test]
    fn single_pixel_is_a_unit_box() {
        let mut image = sheet(8, 8);
        image.put_pixel(3, 4, INK);
        assert_eq!(
            find_components(&image, background()),
            vec![BoundingBox::new(3, 4, 1, 1)]
        );
    }

    #[test]
    fn diagonal_neighbors_are_connected() {
        let mut image = sheet(8, 8);
        for i in 1..5 {
            image.put_pixel(i, i, INK);
        }
        image.put_pixel(5, 3, INK);
        assert_eq!(
            find_components(&image, background()),
            vec![BoundingBox::new(1, 1, 5, 4)]
        );
    }

    #[test]
    fn separated_shapes_are_distinct_components() {
        let mut image = sheet(10, 6);
        image.put_pixel(1, 1, INK);
        image.put_pixel(3, 1, INK);
        image.put_pixel(1, 4, INK);
        let boxes = find_components(&image, background());
        assert_eq!(
            boxes,
            vec![
                BoundingBox::new(1, 1, 1, 1),
                BoundingBox::new(3, 1, 1, 1),
                BoundingBox::new(1, 4, 1, 1),
            ]
        );
    }

    #[test]
    fn concave_shape_is_found_from_its_first_row() {
        // A "U" whose arms are reached before the base during the scan.
        let mut image = sheet(7, 6);
        for y in 1..5 {
            image.put_pixel(1, y, INK);
            image.put_pixel(5, y, INK);
        }
        for x in 1..6 {
            image.put_pixel(x, 4, INK);
        }
        assert_eq!(
            find_components(&image, background()),
            vec![BoundingBox::new(1, 1, 5, 4)]
        );
    }

    #[test]
    fn alpha_distinguishes_background() {
        let mut image = sheet(4, 4);
        image.put_pixel(2, 2, Rgba([255, 0, 255, 254]));
        assert_eq!(
            find_components(&image, background()),
            vec![BoundingBox::new(2, 2, 1, 1)]
        );
    }

    #[test]
    fn full_foreground_sheet_does_not_exhaust_the_stack() {
        let image = RgbaImage::from_pixel(1024, 1024, INK);
        assert_eq!(
            find_components(&image, background()),
            vec![BoundingBox::new(0, 0, 1024, 1024)]
        );
    }

    #[test]
    fn every_foreground_pixel_is_covered() {
        let mut image = sheet(32, 32);
        let mut state = 0x2545_f491_u32;
        for y in 0..32 {
            for x in 0..32 {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                if state % 7 == 0 {
                    image.put_pixel(x, y, INK);
                }
            }
        }

        let boxes = find_components(&image, background());
        for (x, y, pixel) in image.enumerate_pixels() {
            if *pixel == INK {
                assert!(
                    boxes.iter().any(|b| b.contains(Point { x, y })),
                    "pixel ({x}, {y}) not covered"
                );
            }
        }
        for b in &boxes {
            assert!(b.right() <= 32 && b.bottom() <= 32);
        }
    }

    #[test]
    fn disjoint_components_never_cover_more_than_the_raster() {
        let mut image = sheet(40, 40);
        for row in 0..4 {
            for col in 0..4 {
                for dy in 0..(row + 2) {
                    for dx in 0..(col + 2) {
                        image.put_pixel(col * 10 + 1 + dx, row * 10 + 1 + dy, INK);
                    }
                }
            }
        }

        let boxes = find_components(&image, background());
        assert_eq!(boxes.len(), 16);
        let ink = image.pixels().filter(|p| **p == INK).count() as u64;
        let covered: u64 = boxes.iter().map(BoundingBox::area).sum();
        assert_eq!(covered, ink);
        assert!(covered <= 40 * 40);
    }
}
