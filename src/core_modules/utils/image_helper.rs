pub mod image_helper {
    use crate::core_modules::bounding_box::BoundingBox;
    use crate::error::Result;
    use image::{ImageEncoder, Rgba, RgbaImage};
    use std::path::Path;

    /// Outline color used by the preview when the caller does not pick one.
    pub const PREVIEW_RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    // 3x5 digit glyphs, row-major.
    const DIGITS: [[u8; 15]; 10] = [
        [1, 1, 1, 1, 0, 1, 1, 0, 1, 1, 0, 1, 1, 1, 1], // 0
        [0, 1, 0, 1, 1, 0, 0, 1, 0, 0, 1, 0, 1, 1, 1], // 1
        [1, 1, 1, 0, 0, 1, 1, 1, 1, 1, 0, 0, 1, 1, 1], // 2
        [1, 1, 1, 0, 0, 1, 1, 1, 1, 0, 0, 1, 1, 1, 1], // 3
        [1, 0, 1, 1, 0, 1, 1, 1, 1, 0, 0, 1, 0, 0, 1], // 4
        [1, 1, 1, 1, 0, 0, 1, 1, 1, 0, 0, 1, 1, 1, 1], // 5
        [1, 1, 1, 1, 0, 0, 1, 1, 1, 1, 0, 1, 1, 1, 1], // 6
        [1, 1, 1, 0, 0, 1, 0, 0, 1, 0, 0, 1, 0, 0, 1], // 7
        [1, 1, 1, 1, 0, 1, 1, 1, 1, 1, 0, 1, 1, 1, 1], // 8
        [1, 1, 1, 1, 0, 1, 1, 1, 1, 0, 0, 1, 1, 1, 1], // 9
    ];
    const GLYPH_WIDTH: u32 = 3;
    const GLYPH_HEIGHT: u32 = 5;
    const GLYPH_ADVANCE: u32 = GLYPH_WIDTH + 1;
    // Gap between the label and the box's right and bottom edges.
    const LABEL_INSET: u32 = 2;

    /// Returns a copy of `image` with a 1px outline drawn just inside every box
    /// and its 1-based order number in the bottom-right corner.
    pub fn draw_boxes(image: &RgbaImage, boxes: &[BoundingBox], color: Rgba<u8>) -> RgbaImage {
        let mut canvas = image.clone();
        let (width, height) = canvas.dimensions();

        for (i, b) in boxes.iter().enumerate() {
            let right = b.right().min(width);
            let bottom = b.bottom().min(height);
            if b.x >= right || b.y >= bottom {
                continue;
            }
            for x in b.x..right {
                canvas.put_pixel(x, b.y, color);
                canvas.put_pixel(x, bottom - 1, color);
            }
            for y in b.y..bottom {
                canvas.put_pixel(b.x, y, color);
                canvas.put_pixel(right - 1, y, color);
            }
            draw_order_number(&mut canvas, b, i + 1, color);
        }

        canvas
    }

    /// Draws `number` right- and bottom-aligned inside `b`, the way the export
    /// numbers it. Skipped when the digits would not fit inside the outline.
    pub fn draw_order_number(
        canvas: &mut RgbaImage,
        b: &BoundingBox,
        number: usize,
        color: Rgba<u8>,
    ) {
        let digits: Vec<usize> = number
            .to_string()
            .bytes()
            .map(|d| usize::from(d - b'0'))
            .collect();
        let label_width = digits.len() as u32 * GLYPH_ADVANCE - 1;

        // The outline takes one pixel on the left and top.
        if b.width < label_width + LABEL_INSET + 1 || b.height < GLYPH_HEIGHT + LABEL_INSET + 1 {
            return;
        }
        let right = b.right().min(canvas.width());
        let bottom = b.bottom().min(canvas.height());
        let Some(left) = right.checked_sub(LABEL_INSET + label_width) else {
            return;
        };
        let Some(top) = bottom.checked_sub(LABEL_INSET + GLYPH_HEIGHT) else {
            return;
        };

        for (slot, &digit) in digits.iter().enumerate() {
            let origin_x = left + slot as u32 * GLYPH_ADVANCE;
            for row in 0..GLYPH_HEIGHT {
                for col in 0..GLYPH_WIDTH {
                    if DIGITS[digit][(row * GLYPH_WIDTH + col) as usize] == 1 {
                        canvas.put_pixel(origin_x + col, top + row, color);
                    }
                }
            }
        }
    }

    /// Writes an RGBA buffer as PNG.
    pub fn save(path: &Path, width: u32, height: u32, buffer: &[u8]) -> Result<()> {
        let output = std::fs::File::create(path).map_err(image::ImageError::IoError)?;
        let encoder = image::codecs::png::PngEncoder::new(std::io::BufWriter::new(output));

        encoder.write_image(buffer, width, height, image::ExtendedColorType::Rgba8)?;

        Ok(())
    }

    /// Draws `boxes` onto `image` and saves the result as PNG at `path`.
    pub fn save_preview(path: &Path, image: &RgbaImage, boxes: &[BoundingBox]) -> Result<()> {
        let preview = draw_boxes(image, boxes, PREVIEW_RED);
        save(path, preview.width(), preview.height(), preview.as_raw())
    }
}
