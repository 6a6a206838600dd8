// THEORY:
// The `pipeline` module is the top-level API of the slicer. It runs the three
// detection stages in order and threads every input through explicitly:
//
//   PixelSource -> find_components -> merge_overlapping -> order -> Vec<BoundingBox>
//
// A run owns all of its working memory and returns a fresh list, so two runs
// never share state. Whoever triggers runs (a CLI, the async session, a GUI)
// replaces its previous result wholesale with the new one.

use crate::core_modules::box_merger::{self, DEFAULT_TOLERANCE};
use crate::core_modules::box_orderer::{self, DEFAULT_ROW_HEIGHT};
use crate::core_modules::component_finder::component_finder;
use crate::error::{Result, SlicerError};
use std::time::Instant;
use tracing::{debug, info, warn};

// Re-export key data structures for the public API.
pub use crate::core_modules::bounding_box::BoundingBox;
pub use crate::core_modules::box_merger::MergeStrategy;
pub use crate::core_modules::pixel::pixel::{BackgroundColor, Pixel, PixelSource, RgbaBuffer};

/// Configuration for a detection run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlicerConfig {
    /// Gap, in pixels, that still counts as touching when merging boxes.
    pub tolerance: u32,
    /// Number of merge passes, or run until nothing merges.
    pub merge: MergeStrategy,
    /// Height of one reading-order band, in pixels.
    pub row_height: u32,
}

impl Default for SlicerConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            merge: MergeStrategy::default(),
            row_height: DEFAULT_ROW_HEIGHT,
        }
    }
}

/// Runs find, merge and order over `pixels`.
pub fn detect_sprites<P: PixelSource + ?Sized>(
    pixels: &P,
    background: BackgroundColor,
    config: &SlicerConfig,
) -> Vec<BoundingBox> {
    let started = Instant::now();
    if config.row_height == 0 {
        warn!("row height of 0 treated as 1");
    }

    // Stage 1: Connected components
    let components = component_finder::find_components(pixels, background);
    debug!(count = components.len(), "components found");

    // Stage 2: Tolerant merge
    let merged = box_merger::merge_overlapping(components, config.tolerance, config.merge);
    debug!(count = merged.len(), "boxes after merge");

    // Stage 3: Reading order
    let ordered = box_orderer::order(merged, config.row_height);

    info!(
        width = pixels.width(),
        height = pixels.height(),
        %background,
        sprites = ordered.len(),
        elapsed_us = started.elapsed().as_micros() as u64,
        "sprite detection complete"
    );
    ordered
}

/// The main, top-level struct for the slicer.
#[derive(Debug, Clone, Default)]
pub struct SpriteSlicer {
    config: SlicerConfig,
}

impl SpriteSlicer {
    pub fn new(config: SlicerConfig) -> Self {
        Self { config }
    }

    /// Detects sprites, refusing to run without a background color.
    pub fn detect<P: PixelSource + ?Sized>(
        &self,
        pixels: &P,
        background: Option<BackgroundColor>,
    ) -> Result<Vec<BoundingBox>> {
        let background = background.ok_or(SlicerError::NoBackground)?;
        Ok(detect_sprites(pixels, background, &self.config))
    }
}
