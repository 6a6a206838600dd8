// THEORY:
// The `BoxMerger` turns raw component boxes into sprite boxes. A single sprite is
// often made of several components: an outline with a detached highlight, a
// character and its separately drawn weapon, a glyph with a dot. Those pieces
// sit close together, so boxes that touch or come within `tolerance` pixels of
// each other are fused into one.
//
// Key architectural principles:
// 1.  **Tolerant Overlap Test**: `overlaps` grows both boxes by `tolerance` on
//     every side and asks whether the grown extents still intersect. With
//     exclusive edges that means two boxes stay apart only when the gap between
//     them is at least `2 * tolerance`. The test is symmetric.
// 2.  **First-Match Pass**: One pass walks the input in order. Each box is folded
//     into the first accepted box it overlaps, or accepted as-is. A box joins at
//     most one group per pass.
// 3.  **Explicit Pass Count**: A single pass is not a transitive closure, because
//     a union can grow into a neighbor that was accepted earlier. The default is
//     exactly two passes; `MergeStrategy::Fixpoint` keeps going until a pass
//     stops shrinking the list, at which point no two boxes overlap.

use crate::core_modules::bounding_box::BoundingBox;
use tracing::debug;

/// Default tolerance, in pixels, used when a caller does not pick one.
pub const DEFAULT_TOLERANCE: u32 = 2;

/// Pass count of the default `MergeStrategy`.
pub const DEFAULT_MERGE_PASSES: u32 = 2;

/// How many merge passes to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Run exactly this many passes.
    Passes(u32),
    /// Repeat until a pass does not reduce the number of boxes.
    Fixpoint,
}

impl Default for MergeStrategy {
    fn default() -> Self {
        MergeStrategy::Passes(DEFAULT_MERGE_PASSES)
    }
}

/// True unless `a` and `b` are separated by at least `2 * tolerance` pixels along
/// either axis.
pub fn overlaps(a: &BoundingBox, b: &BoundingBox, tolerance: u32) -> bool {
    let t = i64::from(tolerance);
    let (ax, ay, ar, ab) = edges(a);
    let (bx, by, br, bb) = edges(b);

    !(ar + t <= bx - t // a is left of b
        || ax - t >= br + t // a is right of b
        || ab + t <= by - t // a is above b
        || ay - t >= bb + t) // a is below b
}

fn edges(b: &BoundingBox) -> (i64, i64, i64, i64) {
    (
        i64::from(b.x),
        i64::from(b.y),
        i64::from(b.right()),
        i64::from(b.bottom()),
    )
}

/// One first-match merge pass over `boxes`.
pub fn merge_pass(boxes: Vec<BoundingBox>, tolerance: u32) -> Vec<BoundingBox> {
    let mut merged: Vec<BoundingBox> = Vec::with_capacity(boxes.len());

    for current in boxes {
        match merged
            .iter_mut()
            .find(|existing| overlaps(&current, existing, tolerance))
        {
            Some(existing) => *existing = existing.union(&current),
            None => merged.push(current),
        }
    }

    merged
}

/// Merges overlapping boxes according to `strategy`.
pub fn merge_overlapping(
    mut boxes: Vec<BoundingBox>,
    tolerance: u32,
    strategy: MergeStrategy,
) -> Vec<BoundingBox> {
    match strategy {
        MergeStrategy::Passes(passes) => {
            for pass in 0..passes {
                let before = boxes.len();
                boxes = merge_pass(boxes, tolerance);
                debug!(pass, before, after = boxes.len(), "merge pass");
            }
        }
        MergeStrategy::Fixpoint => {
            let mut pass = 0u32;
            loop {
                let before = boxes.len();
                boxes = merge_pass(boxes, tolerance);
                debug!(pass, before, after = boxes.len(), "merge pass");
                pass += 1;
                if boxes.len() == before {
                    break;
                }
            }
        }
    }
    boxes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bx(x: u32, y: u32, width: u32, height: u32) -> BoundingBox {
        BoundingBox::new(x, y, width, height)
    }

    #[test]
    fn close_boxes_merge_within_tolerance() {
        let boxes = vec![bx(0, 0, 5, 5), bx(6, 0, 5, 5)];
        assert_eq!(
            merge_overlapping(boxes, 2, MergeStrategy::default()),
            vec![bx(0, 0, 11, 5)]
        );
    }

    #[test]
    fn close_boxes_stay_apart_without_tolerance() {
        let boxes = vec![bx(0, 0, 5, 5), bx(6, 0, 5, 5)];
        assert_eq!(
            merge_overlapping(boxes.clone(), 0, MergeStrategy::default()),
            boxes
        );
    }

    #[test]
    fn gap_of_twice_the_tolerance_separates() {
        // Gap of 4 between x=5 and x=9.
        assert!(!overlaps(&bx(0, 0, 5, 5), &bx(9, 0, 5, 5), 2));
        assert!(overlaps(&bx(0, 0, 5, 5), &bx(8, 0, 5, 5), 2));
        // Vertical separation is judged the same way.
        assert!(!overlaps(&bx(0, 0, 5, 5), &bx(0, 9, 5, 5), 2));
        assert!(overlaps(&bx(0, 0, 5, 5), &bx(0, 8, 5, 5), 2));
    }

    #[test]
    fn edge_touching_boxes_need_tolerance() {
        assert!(!overlaps(&bx(0, 0, 5, 5), &bx(5, 0, 5, 5), 0));
        assert!(overlaps(&bx(0, 0, 5, 5), &bx(4, 0, 5, 5), 0));
        assert!(overlaps(&bx(0, 0, 5, 5), &bx(5, 0, 5, 5), 1));
    }

    #[test]
    fn tolerance_near_origin_does_not_underflow() {
        assert!(overlaps(&bx(0, 0, 1, 1), &bx(0, 0, 1, 1), u32::MAX));
        assert!(overlaps(&bx(0, 0, 1, 1), &bx(3, 3, 1, 1), 2));
    }

    #[test]
    fn overlaps_is_symmetric() {
        let samples = [
            bx(0, 0, 5, 5),
            bx(6, 0, 5, 5),
            bx(3, 3, 1, 1),
            bx(10, 20, 4, 2),
            bx(0, 9, 30, 1),
            bx(14, 0, 1, 40),
        ];
        for a in &samples {
            for b in &samples {
                for t in 0..6 {
                    assert_eq!(overlaps(a, b, t), overlaps(b, a, t), "{a:?} {b:?} {t}");
                }
            }
        }
    }

    #[test]
    fn first_match_wins_within_a_pass() {
        // The third box touches both accepted boxes but only joins the first.
        let boxes = vec![bx(0, 0, 3, 3), bx(10, 0, 3, 3), bx(2, 0, 9, 3)];
        let merged = merge_pass(boxes, 0);
        assert_eq!(merged, vec![bx(0, 0, 11, 3), bx(10, 0, 3, 3)]);
    }

    #[test]
    fn second_pass_catches_unions_from_the_first() {
        let boxes = vec![bx(0, 0, 2, 2), bx(10, 0, 2, 2), bx(1, 0, 10, 2)];
        assert_eq!(
            merge_overlapping(boxes.clone(), 0, MergeStrategy::Passes(1)).len(),
            2
        );
        assert_eq!(
            merge_overlapping(boxes, 0, MergeStrategy::Passes(2)),
            vec![bx(0, 0, 12, 2)]
        );
    }

    #[test]
    fn zero_passes_returns_input_unchanged() {
        let boxes = vec![bx(0, 0, 5, 5), bx(1, 1, 5, 5)];
        assert_eq!(
            merge_overlapping(boxes.clone(), 2, MergeStrategy::Passes(0)),
            boxes
        );
    }

    #[test]
    fn chain_needs_more_than_two_passes_to_close() {
        // Each union only reaches the next link once the previous pass has run.
        let boxes = vec![
            bx(0, 0, 2, 2),
            bx(20, 0, 2, 2),
            bx(10, 0, 2, 2),
            bx(11, 0, 10, 2),
            bx(1, 0, 10, 2),
        ];
        let two = merge_overlapping(boxes.clone(), 0, MergeStrategy::Passes(2));
        assert_eq!(two, vec![bx(0, 0, 12, 2), bx(11, 0, 11, 2)]);
        let closed = merge_overlapping(boxes, 0, MergeStrategy::Fixpoint);
        assert_eq!(closed, vec![bx(0, 0, 22, 2)]);
    }

    #[test]
    fn fixpoint_leaves_no_overlapping_pair() {
        let mut state = 0x9e37_79b9_u32;
        let mut next = move |modulo: u32| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state % modulo
        };
        let boxes: Vec<BoundingBox> = (0..200)
            .map(|_| bx(next(400), next(400), next(12) + 1, next(12) + 1))
            .collect();

        for tolerance in [0, 1, 3] {
            let merged = merge_overlapping(boxes.clone(), tolerance, MergeStrategy::Fixpoint);
            for (i, a) in merged.iter().enumerate() {
                for b in &merged[i + 1..] {
                    assert!(!overlaps(a, b, tolerance), "{a:?} still overlaps {b:?}");
                }
            }
            let again = merge_overlapping(merged.clone(), tolerance, MergeStrategy::Fixpoint);
            assert_eq!(again, merged);
        }
    }
}
