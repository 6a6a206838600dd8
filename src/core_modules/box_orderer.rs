// THEORY:
// The `BoxOrderer` decides the number each sprite gets in the exported text. It
// is a reading-order heuristic, not a layout analysis: rows are fixed-height
// bands measured from the topmost box, and within a band boxes go left to right
// by their horizontal center.
//
// Banding makes the order robust to sprites on one visual row that start a few
// pixels apart vertically. Sprites taller than a band on a tightly packed sheet
// can land in the wrong band; that is accepted behavior and must stay stable,
// since existing patch files were numbered with it.

use crate::core_modules::bounding_box::BoundingBox;

/// Height of one reading row, in pixels.
pub const DEFAULT_ROW_HEIGHT: u32 = 20;

/// The band `b` falls into, counted from `global_top`.
pub fn row_index(b: &BoundingBox, global_top: u32, row_height: u32) -> u32 {
    (b.y - global_top) / row_height.max(1)
}

/// Sorts `boxes` into reading order. The sort is stable, so boxes with the same
/// band and center keep their incoming order.
pub fn order(mut boxes: Vec<BoundingBox>, row_height: u32) -> Vec<BoundingBox> {
    let Some(global_top) = boxes.iter().map(|b| b.y).min() else {
        return boxes;
    };

    boxes.sort_by_key(|b| (row_index(b, global_top, row_height), b.center_x2()));
    boxes
}
