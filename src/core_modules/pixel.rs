// THEORY:
// The `pixel` module is the lowest layer of the slicer. It holds the "dumb" RGBA
// color container, the `BackgroundColor` that decides which pixels are empty,
// and the `PixelSource` trait through which every other layer reads a raster.
//
// Key architectural principles:
// 1.  **Exact Equality**: A pixel is background only if all four channels match
//     the background exactly. There is no distance threshold; anti-aliased
//     edges are sprite pixels like any other.
// 2.  **Read-Only Access**: `PixelSource` only exposes dimensions and per-pixel
//     reads. Decoding, canvases and file formats live outside of it, so the
//     detection layers work the same over an `image::RgbaImage` or a borrowed
//     RGBA byte buffer handed over by a host application.
// 3.  **Contract Violations Panic**: Reading outside the raster is a bug in the
//     caller, not a recoverable condition, so the adapters index directly and
//     let the slice bounds check fire.

pub mod pixel {
    use crate::error::{Result, SlicerError};
    use std::fmt;
    use std::str::FromStr;

    pub type Byte = u8;
    pub type Channel = Byte;

    pub const CHANNELS: usize = 4;
    const OPAQUE: Channel = Channel::MAX;

    /// A "dumb" data container representing a single RGBA pixel.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct Pixel {
        /// The red channel value (0-255).
        pub red: Channel,
        /// The green channel value (0-255).
        pub green: Channel,
        /// The blue channel value (0-255).
        pub blue: Channel,
        /// The alpha (transparency) channel value (0-255).
        pub alpha: Channel,
    }

    impl Pixel {
        pub fn new(red: Channel, green: Channel, blue: Channel, alpha: Channel) -> Self {
            Pixel {
                red,
                green,
                blue,
                alpha,
            }
        }
    }

    impl From<&[Byte]> for Pixel {
        fn from(bytes: &[Byte]) -> Self {
            if bytes.len() != CHANNELS {
                panic!("Cannot convert {} bytes into pixel.", bytes.len());
            }
            Pixel::new(bytes[0], bytes[1], bytes[2], bytes[3])
        }
    }

    impl From<[Byte; CHANNELS]> for Pixel {
        fn from(bytes: [Byte; CHANNELS]) -> Self {
            Pixel::new(bytes[0], bytes[1], bytes[2], bytes[3])
        }
    }

    /// The color that separates sprites from each other.
    ///
    /// Fixed for the duration of a detection run. When built from three channels
    /// the alpha is fully opaque.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BackgroundColor(Pixel);

    impl BackgroundColor {
        pub fn rgb(red: Channel, green: Channel, blue: Channel) -> Self {
            Self::rgba(red, green, blue, OPAQUE)
        }

        pub fn rgba(red: Channel, green: Channel, blue: Channel, alpha: Channel) -> Self {
            BackgroundColor(Pixel::new(red, green, blue, alpha))
        }

        /// Samples the background from the pixel under `(x, y)`, the way a user
        /// clicks an empty spot of the sheet.
        pub fn sample<P: PixelSource + ?Sized>(pixels: &P, x: u32, y: u32) -> Result<Self> {
            let (width, height) = (pixels.width(), pixels.height());
            if x >= width || y >= height {
                return Err(SlicerError::PickOutOfBounds {
                    x,
                    y,
                    width,
                    height,
                });
            }
            Ok(pixels.pixel(x, y).into())
        }

        pub fn pixel(&self) -> Pixel {
            self.0
        }

        /// True when `pixel` is empty space.
        #[inline]
        pub fn matches(&self, pixel: &Pixel) -> bool {
            self.0 == *pixel
        }
    }

    impl From<Pixel> for BackgroundColor {
        fn from(pixel: Pixel) -> Self {
            BackgroundColor(pixel)
        }
    }

    impl fmt::Display for BackgroundColor {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let p = self.0;
            write!(
                f,
                "#{:02X}{:02X}{:02X}{:02X}",
                p.red, p.green, p.blue, p.alpha
            )
        }
    }

    impl FromStr for BackgroundColor {
        type Err = SlicerError;

        /// Accepts `#RRGGBB`, `#RRGGBBAA` (leading `#` optional) or `r,g,b[,a]`.
        fn from_str(s: &str) -> Result<Self> {
            let invalid = || SlicerError::InvalidColor(s.to_string());
            let text = s.trim();

            if text.contains(',') {
                let channels = text
                    .split(',')
                    .map(|part| part.trim().parse::<Channel>())
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(|_| invalid())?;
                return match *channels.as_slice() {
                    [r, g, b] => Ok(Self::rgb(r, g, b)),
                    [r, g, b, a] => Ok(Self::rgba(r, g, b, a)),
                    _ => Err(invalid()),
                };
            }

            let hex = text.strip_prefix('#').unwrap_or(text);
            if !hex.is_ascii() || (hex.len() != 6 && hex.len() != 8) {
                return Err(invalid());
            }
            let channel = |i: usize| {
                Channel::from_str_radix(&hex[i * 2..i * 2 + 2], 16).map_err(|_| invalid())
            };
            let (r, g, b) = (channel(0)?, channel(1)?, channel(2)?);
            let a = if hex.len() == 8 { channel(3)? } else { OPAQUE };
            Ok(Self::rgba(r, g, b, a))
        }
    }

    /// Read-only access to a decoded RGBA raster.
    pub trait PixelSource {
        fn width(&self) -> u32;
        fn height(&self) -> u32;
        /// Reads the pixel at `(x, y)`. Panics when the position is out of bounds.
        fn pixel(&self, x: u32, y: u32) -> Pixel;
    }

    impl PixelSource for image::RgbaImage {
        fn width(&self) -> u32 {
            image::RgbaImage::width(self)
        }

        fn height(&self) -> u32 {
            image::RgbaImage::height(self)
        }

        fn pixel(&self, x: u32, y: u32) -> Pixel {
            Pixel::from(self.get_pixel(x, y).0)
        }
    }

    /// A borrowed, tightly packed RGBA8 buffer, row-major.
    #[derive(Debug, Clone, Copy)]
    pub struct RgbaBuffer<'a> {
        width: u32,
        height: u32,
        data: &'a [Byte],
    }

    impl<'a> RgbaBuffer<'a> {
        pub fn new(width: u32, height: u32, data: &'a [Byte]) -> Result<Self> {
            let expected = width as usize * height as usize * CHANNELS;
            if data.len() != expected {
                return Err(SlicerError::BufferSize {
                    expected,
                    actual: data.len(),
                });
            }
            Ok(Self {
                width,
                height,
                data,
            })
        }
    }

    impl PixelSource for RgbaBuffer<'_> {
        fn width(&self) -> u32 {
            self.width
        }

        fn height(&self) -> u32 {
            self.height
        }

        fn pixel(&self, x: u32, y: u32) -> Pixel {
            assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
            let index = (y as usize * self.width as usize + x as usize) * CHANNELS;
            Pixel::from(&self.data[index..index + CHANNELS])
        }
    }
}
