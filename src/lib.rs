// THEORY:
// This file is the main entry point for the `sprite_slicer` library crate.
//
// The slicer takes a decoded sprite sheet and a background color and finds
// every sprite on it: connected regions of non-background pixels become boxes,
// boxes that sit within a tolerance of each other are merged, and the result is
// numbered in reading order. The boxes can then be exported as patch text or
// drawn onto a preview.
//
// The public surface is the `pipeline` (one-shot detection), `patch_text`
// (export), and `session` (an async actor for interactive use). The detection
// stages in `core_modules` are public as well so callers can run or test them
// individually.

pub mod core_modules;
pub mod error;
pub mod patch_text;
pub mod pipeline;
pub mod session;

pub use error::{Result, SlicerError};
pub use patch_text::{ExportConfig, render_patches};
pub use pipeline::{
    BackgroundColor, BoundingBox, MergeStrategy, Pixel, PixelSource, RgbaBuffer, SlicerConfig,
    SpriteSlicer, detect_sprites,
};
pub use session::{SessionEvent, SessionSnapshot, SlicerSession};
