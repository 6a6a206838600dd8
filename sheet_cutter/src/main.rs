use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use sprite_slicer::core_modules::box_merger::{DEFAULT_MERGE_PASSES, DEFAULT_TOLERANCE};
use sprite_slicer::core_modules::box_orderer::DEFAULT_ROW_HEIGHT;
use sprite_slicer::core_modules::utils::image_helper::image_helper;
use sprite_slicer::patch_text::DEFAULT_SPRITE_NAME;
use sprite_slicer::{
    BackgroundColor, ExportConfig, MergeStrategy, SlicerConfig, SpriteSlicer, render_patches,
};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Finds the sprites on a sprite sheet and prints a patch definition for each.
#[derive(Parser, Debug)]
#[command(name = "sheet_cutter")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The sprite sheet to scan.
    image: PathBuf,

    /// Background color: #RRGGBB, #RRGGBBAA or r,g,b[,a].
    #[arg(short, long, conflicts_with = "pick")]
    background: Option<BackgroundColor>,

    /// Take the background from the pixel at X,Y.
    #[arg(short, long, value_name = "X,Y", value_parser = parse_position)]
    pick: Option<(u32, u32)>,

    /// Gap, in pixels, that still joins two pieces into one sprite.
    #[arg(short, long, default_value_t = DEFAULT_TOLERANCE)]
    tolerance: u32,

    /// Number of merge passes.
    #[arg(long, default_value_t = DEFAULT_MERGE_PASSES, conflicts_with = "fixpoint")]
    passes: u32,

    /// Merge until no boxes overlap.
    #[arg(long)]
    fixpoint: bool,

    /// Height of one reading-order row, in pixels.
    #[arg(long, default_value_t = DEFAULT_ROW_HEIGHT)]
    row_height: u32,

    /// Prefix for the sprite names.
    #[arg(short, long, default_value = DEFAULT_SPRITE_NAME)]
    name: String,

    /// Write the patch text here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Save a PNG of the sheet with every detected box outlined and numbered.
    #[arg(long)]
    preview: Option<PathBuf>,

    /// More logging (-v, -vv). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn slicer_config(&self) -> SlicerConfig {
        SlicerConfig {
            tolerance: self.tolerance,
            merge: if self.fixpoint {
                MergeStrategy::Fixpoint
            } else {
                MergeStrategy::Passes(self.passes)
            },
            row_height: self.row_height,
        }
    }
}

fn parse_position(text: &str) -> Result<(u32, u32), String> {
    let (x, y) = text
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got `{text}`"))?;
    let coordinate = |part: &str| {
        part.trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid coordinate `{part}`: {e}"))
    };
    Ok((coordinate(x)?, coordinate(y)?))
}

fn init_tracing(verbose: u8) {
    let base_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(base_level));

    // stdout carries the patch text, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    // --- 1. Argument Parsing & Setup ---
    let args = Args::parse();
    init_tracing(args.verbose);

    // --- 2. Image Loading ---
    let sheet = image::open(&args.image)
        .with_context(|| format!("failed to open {}", args.image.display()))?
        .to_rgba8();
    info!(path = %args.image.display(), width = sheet.width(), height = sheet.height(), "sheet loaded");

    // --- 3. Background Selection ---
    let background = match (args.background, args.pick) {
        (Some(color), _) => Some(color),
        (None, Some((x, y))) => Some(BackgroundColor::sample(&sheet, x, y)?),
        (None, None) => None,
    };

    // --- 4. Detection ---
    let boxes = SpriteSlicer::new(args.slicer_config())
        .detect(&sheet, background)
        .context("pass --background COLOR or --pick X,Y")?;
    if boxes.is_empty() {
        warn!(path = %args.image.display(), "no sprites found");
    }

    // --- 5. Output ---
    if let Some(path) = &args.preview {
        image_helper::save_preview(path, &sheet, &boxes)
            .with_context(|| format!("failed to write preview {}", path.display()))?;
        info!(path = %path.display(), "preview written");
    }

    let export = ExportConfig::for_image_path(&args.image).with_sprite_name(args.name);
    let text = render_patches(&boxes, &export);
    match &args.output {
        Some(path) => std::fs::write(path, text)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => print!("{text}"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_parses_with_spaces() {
        assert_eq!(parse_position("3, 4"), Ok((3, 4)));
        assert!(parse_position("3").is_err());
        assert!(parse_position("3,-1").is_err());
    }

    #[test]
    fn arguments_map_onto_config() {
        let args = Args::try_parse_from([
            "sheet_cutter",
            "sheet.png",
            "--background",
            "#FF00FF",
            "--fixpoint",
            "-t",
            "3",
        ])
        .unwrap();
        assert_eq!(args.background, Some(BackgroundColor::rgb(255, 0, 255)));
        assert!(args.fixpoint);
        assert_eq!(args.tolerance, 3);
        assert_eq!(args.row_height, 20);
        assert_eq!(args.name, "SPRT");
        assert_eq!(args.slicer_config().merge, MergeStrategy::Fixpoint);
    }

    #[test]
    fn omitted_flags_match_library_defaults() {
        let args = Args::try_parse_from(["sheet_cutter", "sheet.png"]).unwrap();
        assert_eq!(args.slicer_config(), SlicerConfig::default());
        assert_eq!(args.name, ExportConfig::default().sprite_name);
    }

    #[test]
    fn background_and_pick_conflict() {
        let result = Args::try_parse_from([
            "sheet_cutter",
            "sheet.png",
            "--background",
            "0,0,0",
            "--pick",
            "1,1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn args_definition_is_consistent() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
