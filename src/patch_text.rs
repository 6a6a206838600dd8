// THEORY:
// The exported text is what a user actually keeps: one `Sprite` block per box in
// reading order, each holding a single `Patch` that places the sheet at the
// negated box offset so only the sprite shows through. The sprite tag comes from
// the user-chosen name plus a 1-based index; the patch refers to the sheet by
// its file name without extension.

use crate::core_modules::bounding_box::BoundingBox;
use std::fmt::Write;
use std::path::Path;

pub const DEFAULT_SPRITE_NAME: &str = "SPRT";
pub const DEFAULT_PATCH_NAME: &str = "FILENAME";

/// Names used when rendering patch text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportConfig {
    /// Prefix of every `Sprite` tag. Empty falls back to `SPRT`.
    pub sprite_name: String,
    /// The sheet name each `Patch` line refers to.
    pub patch_name: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            sprite_name: DEFAULT_SPRITE_NAME.to_string(),
            patch_name: DEFAULT_PATCH_NAME.to_string(),
        }
    }
}

impl ExportConfig {
    /// Uses the file name of `path`, minus its extension, as the patch name.
    pub fn for_image_path(path: &Path) -> Self {
        Self {
            patch_name: patch_name_from_path(path),
            ..Self::default()
        }
    }

    pub fn with_sprite_name(mut self, name: impl Into<String>) -> Self {
        self.sprite_name = name.into();
        self
    }

    fn effective_sprite_name(&self) -> &str {
        if self.sprite_name.is_empty() {
            DEFAULT_SPRITE_NAME
        } else {
            &self.sprite_name
        }
    }
}

/// Strips the directory and the last extension from `path`.
///
/// An extension is a final `.` followed by at least one character, so
/// `".png"` becomes `""` while `"sprite."` is kept whole.
pub fn patch_name_from_path(path: &Path) -> String {
    let Some(file_name) = path.file_name() else {
        return DEFAULT_PATCH_NAME.to_string();
    };
    let file_name = file_name.to_string_lossy();
    match file_name.rsplit_once('.') {
        Some((stem, extension)) if !extension.is_empty() => stem.to_string(),
        _ => file_name.into_owned(),
    }
}

/// Renders one `Sprite` block per box, numbered from 1 in list order.
pub fn render_patches(boxes: &[BoundingBox], config: &ExportConfig) -> String {
    let sprite_name = config.effective_sprite_name();
    let mut out = String::new();

    for (i, b) in boxes.iter().enumerate() {
        // Writing into a String cannot fail.
        let _ = write!(
            out,
            "Sprite \"{}{}\", {}, {}\n{{\n\tPatch \"{}\", -{}, -{}\n}}\n\n",
            sprite_name,
            i + 1,
            b.width,
            b.height,
            config.patch_name,
            b.x,
            b.y
        );
    }

    out
}
