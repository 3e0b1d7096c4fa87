use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};

use snapstudio::{
    encode_png, export_file_name, presets::PresetStore, process, resample, watermark::Color,
    Anchor, EnhanceSettings, ExportPurpose, RasterImage, ScaleFactor, WatermarkRenderer,
    ENHANCE_PRESETS,
};

#[derive(Parser)]
#[command(
    name = "snapstudio",
    about = "Selfie2Snap pixel pipeline: enhance, upscale, and watermark snaps",
    version,
    after_help = "Simple usage: snapstudio enhance photo.png --preset auto\n\n\
                  Enhancement always runs against the pristine decoded source,\n\
                  so repeated runs with the same settings are reproducible."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply color grading and sharpening to an image (or a directory of images)
    Enhance(EnhanceArgs),
    /// Upscale an image with smooth interpolation and post-sharpening
    Upscale(UpscaleArgs),
    /// Composite a text watermark onto an image
    Watermark(WatermarkArgs),
    /// List or delete saved watermark presets
    Presets(PresetsArgs),
}

#[derive(Args)]
struct EnhanceArgs {
    /// Input image file or directory
    input: PathBuf,

    /// Output file or directory (default: {app}-enhanced-{timestamp}.png next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Apply a built-in preset (auto, portrait, landscape, night, hdr, vivid, cinematic, bright)
    #[arg(short, long)]
    preset: Option<String>,

    /// Brightness [-50, 50]
    #[arg(long, default_value_t = 0.0)]
    brightness: f32,

    /// Contrast [-50, 50]
    #[arg(long, default_value_t = 0.0)]
    contrast: f32,

    /// Saturation [-50, 50]
    #[arg(long, default_value_t = 0.0)]
    saturation: f32,

    /// Sharpness [0, 100]
    #[arg(long, default_value_t = 0.0)]
    sharpness: f32,

    /// Warmth [-30, 30]
    #[arg(long, default_value_t = 0.0)]
    warmth: f32,

    /// Vibrance [-50, 50]
    #[arg(long, default_value_t = 0.0)]
    vibrance: f32,
}

#[derive(Args)]
struct UpscaleArgs {
    /// Input image file
    input: PathBuf,

    /// Output file (default: {app}-upscaled-{scale}-{timestamp}.png next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Scale factor: 1.5, 2, 3 or 4
    #[arg(short, long, default_value = "2")]
    scale: ScaleFactor,
}

#[derive(Args)]
struct WatermarkArgs {
    /// Input image file
    input: PathBuf,

    /// Output file (default: {app}-watermarked-{timestamp}.png next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TTF/OTF font file used to render the text
    #[arg(short, long)]
    font: PathBuf,

    /// Watermark text (default: last-used preferences, then "Selfie2Snap")
    #[arg(short, long)]
    text: Option<String>,

    /// Anchor: top-left, top-right, bottom-left, bottom-right, center
    #[arg(short, long)]
    anchor: Option<Anchor>,

    /// Font size in pixels
    #[arg(long)]
    size: Option<f32>,

    /// Opacity percentage [0, 100]
    #[arg(long)]
    opacity: Option<u8>,

    /// Text color as #rrggbb
    #[arg(long)]
    color: Option<Color>,

    /// Start from a saved or built-in watermark preset id
    #[arg(short, long)]
    preset: Option<String>,

    /// Save the resulting watermark as a named preset
    #[arg(long, value_name = "NAME")]
    save_preset: Option<String>,

    /// Remember these settings as the last-used preferences
    #[arg(long)]
    remember: bool,

    /// Preset store file
    #[arg(long, default_value = "watermark-presets.json")]
    store: PathBuf,
}

#[derive(Args)]
struct PresetsArgs {
    /// Delete the preset with this id instead of listing
    #[arg(long, value_name = "ID")]
    delete: Option<String>,

    /// Preset store file
    #[arg(long, default_value = "watermark-presets.json")]
    store: PathBuf,
}

fn main() {
    let cli = Cli::parse();
    let code = match cli.command {
        Command::Enhance(args) => run_enhance(&args),
        Command::Upscale(args) => run_upscale(&args),
        Command::Watermark(args) => run_watermark(&args),
        Command::Presets(args) => run_presets(&args),
    };
    process::exit(code);
}

fn run_enhance(args: &EnhanceArgs) -> i32 {
    let settings = match enhance_settings(args) {
        Ok(s) => s,
        Err(msg) => {
            eprintln!("Error: {msg}");
            return 1;
        }
    };

    if args.input.is_dir() {
        let Some(output_dir) = args.output.clone() else {
            eprintln!("Error: Output directory is required for batch enhancement");
            eprintln!("Usage: snapstudio enhance <input_dir> -o <output_dir>");
            return 1;
        };
        return run_enhance_directory(&args.input, &output_dir, &settings);
    }

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| sibling_path(&args.input, ExportPurpose::Enhanced, None));
    match enhance_file(&args.input, &output, &settings) {
        Ok(()) => {
            eprintln!("[OK] {}", output.display());
            0
        }
        Err(e) => {
            eprintln!("[FAIL] {}: {e}", args.input.display());
            1
        }
    }
}

fn run_enhance_directory(input_dir: &Path, output_dir: &Path, settings: &EnhanceSettings) -> i32 {
    use rayon::prelude::*;

    let entries: Vec<PathBuf> = match std::fs::read_dir(input_dir) {
        Ok(rd) => rd
            .filter_map(std::result::Result::ok)
            .map(|e| e.path())
            .filter(|p| p.is_file() && is_supported_image(p))
            .collect(),
        Err(e) => {
            eprintln!("[FAIL] {}: failed to read directory: {e}", input_dir.display());
            return 1;
        }
    };

    if let Err(e) = std::fs::create_dir_all(output_dir) {
        eprintln!(
            "[FAIL] {}: failed to create output directory: {e}",
            output_dir.display()
        );
        return 1;
    }

    let results: Vec<(PathBuf, snapstudio::Result<()>)> = entries
        .par_iter()
        .map(|input| {
            let name = input.file_name().map(PathBuf::from).unwrap_or_default();
            let output = output_dir.join(name);
            (input.clone(), enhance_file(input, &output, settings))
        })
        .collect();

    let mut failed = 0u32;
    for (path, result) in &results {
        match result {
            Ok(()) => eprintln!("[OK] {}", path.display()),
            Err(e) => {
                eprintln!("[FAIL] {}: {e}", path.display());
                failed += 1;
            }
        }
    }
    eprintln!(
        "[Summary] Processed: {}, Failed: {failed} (Total: {})",
        results.len() as u32 - failed,
        results.len()
    );
    i32::from(failed > 0)
}

fn enhance_settings(args: &EnhanceArgs) -> Result<EnhanceSettings, String> {
    if let Some(id) = &args.preset {
        let preset = ENHANCE_PRESETS
            .iter()
            .find(|p| p.id == id.as_str())
            .ok_or_else(|| {
                let known: Vec<&str> = ENHANCE_PRESETS.iter().map(|p| p.id).collect();
                format!("unknown preset {id:?} (available: {})", known.join(", "))
            })?;
        return Ok(preset.settings);
    }
    Ok(EnhanceSettings {
        brightness: args.brightness,
        contrast: args.contrast,
        saturation: args.saturation,
        sharpness: args.sharpness,
        warmth: args.warmth,
        vibrance: args.vibrance,
    }
    .clamped())
}

fn enhance_file(input: &Path, output: &Path, settings: &EnhanceSettings) -> snapstudio::Result<()> {
    let source = RasterImage::open(input)?;
    let buffer = process(&source, settings);
    let png = encode_png(&buffer)?;
    std::fs::write(output, png)?;
    Ok(())
}

fn run_upscale(args: &UpscaleArgs) -> i32 {
    let result = RasterImage::open(&args.input)
        .and_then(|source| resample::upscale(&source, args.scale))
        .and_then(|buffer| {
            let output = args.output.clone().unwrap_or_else(|| {
                sibling_path(&args.input, ExportPurpose::Upscaled, Some(args.scale))
            });
            let png = encode_png(&buffer)?;
            std::fs::write(&output, png)?;
            Ok((output, buffer.width(), buffer.height()))
        });

    match result {
        Ok((output, w, h)) => {
            eprintln!("[OK] {} ({w}x{h})", output.display());
            0
        }
        Err(e) => {
            eprintln!("[FAIL] {}: {e}", args.input.display());
            1
        }
    }
}

fn run_watermark(args: &WatermarkArgs) -> i32 {
    match watermark_file(args) {
        Ok(output) => {
            eprintln!("[OK] {}", output.display());
            0
        }
        Err(e) => {
            eprintln!("[FAIL] {}: {e}", args.input.display());
            1
        }
    }
}

fn watermark_file(args: &WatermarkArgs) -> snapstudio::Result<PathBuf> {
    let store = PresetStore::new(&args.store);
    let state = store.load();

    // preset (saved, then built-in), else last-used preferences
    let mut spec = match &args.preset {
        Some(id) => {
            let builtins = snapstudio::presets::builtin_presets();
            state
                .presets
                .iter()
                .chain(builtins.iter())
                .find(|p| &p.id == id)
                .map(|p| p.spec.clone())
                .ok_or_else(|| snapstudio::Error::UnknownPreset(id.clone()))?
        }
        None => state.preferences,
    };
    if let Some(text) = &args.text {
        spec.text.clone_from(text);
    }
    if let Some(anchor) = args.anchor {
        spec.anchor = anchor;
    }
    if let Some(size) = args.size {
        spec.font_size = size;
    }
    if let Some(opacity) = args.opacity {
        spec.opacity = opacity.min(100);
    }
    if let Some(color) = args.color {
        spec.color = color;
    }

    let font_bytes = std::fs::read(&args.font)?;
    let renderer = WatermarkRenderer::new(&font_bytes)?;

    let source = RasterImage::open(&args.input)?;
    let mut buffer = source.to_buffer();
    renderer.apply(&mut buffer, &spec);

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| sibling_path(&args.input, ExportPurpose::Watermarked, None));
    let png = encode_png(&buffer)?;
    std::fs::write(&output, png)?;

    if let Some(name) = &args.save_preset {
        let preset = store.save_preset(name, &spec)?;
        eprintln!("[OK] saved preset {} ({})", preset.name, preset.id);
    }
    if args.remember {
        store.save_preferences(&spec)?;
    }

    Ok(output)
}

fn run_presets(args: &PresetsArgs) -> i32 {
    let store = PresetStore::new(&args.store);

    if let Some(id) = &args.delete {
        return match store.delete_preset(id) {
            Ok(true) => {
                eprintln!("[OK] deleted {id}");
                0
            }
            Ok(false) => {
                eprintln!("[FAIL] no preset with id {id:?}");
                1
            }
            Err(e) => {
                eprintln!("[FAIL] {e}");
                1
            }
        };
    }

    eprintln!("Built-in:");
    for preset in snapstudio::presets::builtin_presets() {
        eprintln!("  {:<12} {} ({:?})", preset.id, preset.name, preset.kind);
    }
    let state = store.load();
    if state.presets.is_empty() {
        eprintln!("No saved presets in {}", args.store.display());
    } else {
        eprintln!("Saved:");
        for preset in &state.presets {
            eprintln!("  {:<12} {} \"{}\"", preset.id, preset.name, preset.spec.text);
        }
    }
    0
}

/// Default output path next to the input, using the export filename pattern.
fn sibling_path(input: &Path, purpose: ExportPurpose, scale: Option<ScaleFactor>) -> PathBuf {
    let parent = input.parent().unwrap_or(Path::new("."));
    parent.join(export_file_name(purpose, scale))
}

fn is_supported_image(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => matches!(
            ext.to_lowercase().as_str(),
            "jpg" | "jpeg" | "png" | "webp" | "bmp"
        ),
        None => false,
    }
}
