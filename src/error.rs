// THEORY:
// Every failure the slicer can surface is structural: a missing input, a
// malformed input, or a collaborator (decoder, session task) that went away.
// The detection stages themselves cannot fail, so they return plain values and
// only the edges of the library (pipeline entry, color parsing, raster
// adapters, the session) return `SlicerError`.

use thiserror::Error;

/// Errors produced by the sprite slicer library.
#[derive(Error, Debug)]
pub enum SlicerError {
    #[error("no background selected")]
    NoBackground,

    #[error("invalid color `{0}`: expected #RRGGBB, #RRGGBBAA or r,g,b[,a]")]
    InvalidColor(String),

    #[error("pick position ({x}, {y}) is outside the {width}x{height} image")]
    PickOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    #[error("raster buffer holds {actual} bytes, expected {expected} for RGBA")]
    BufferSize { expected: usize, actual: usize },

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("slicer session is closed")]
    SessionClosed,
}

pub type Result<T> = std::result::Result<T, SlicerError>;
