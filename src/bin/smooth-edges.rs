use std::path::PathBuf;
use std::process;

use clap::Parser;
use image::Rgba;
use log::LevelFilter;

use smooth_edges::{parse_color, ProcessOptions, SmoothingEngine};

#[derive(Parser)]
#[command(
    name = "smooth-edges",
    about = "Key out a magenta (#FF00FF) background and anti-alias the cutout edge",
    version,
    after_help = "Example: smooth-edges sprite.png sprite_cut.png --tolerance 80 --upscale 2 --blur 2\n\n\
                  Without --bg the output keeps transparency and must be PNG, WebP, TIFF, TGA, QOI or BMP.\n\
                  With an opaque --bg, JPEG output is allowed as well.",
    allow_negative_numbers = true
)]
struct Cli {
    /// Input image with a magenta background
    input: PathBuf,

    /// Output image path (format from extension)
    output: PathBuf,

    /// How close a pixel must be to magenta to count as background (0-442)
    #[arg(long, default_value_t = 80)]
    tolerance: i32,

    /// Upscale factor before blurring (1 or less = no upscale)
    #[arg(long, default_value_t = 2)]
    upscale: i32,

    /// Gaussian blur radius applied to the alpha mask
    #[arg(long, default_value_t = 2.0)]
    blur: f32,

    /// Background color, e.g. "#ffffff" or "white" (default: transparent)
    #[arg(long, value_parser = parse_background)]
    bg: Option<Rgba<u8>>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn parse_background(s: &str) -> Result<Rgba<u8>, String> {
    parse_color(s).map_err(|e| e.to_string())
}

fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        LevelFilter::Debug
    } else if cli.quiet {
        LevelFilter::Error
    } else {
        LevelFilter::Warn
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    let opts = ProcessOptions {
        // Only the squared tolerance is compared, so the sign is irrelevant.
        tolerance: cli.tolerance.unsigned_abs(),
        upscale: u32::try_from(cli.upscale).unwrap_or(0),
        blur: cli.blur,
        background: cli.bg,
    };

    if opts.tolerance >= 442 {
        log::warn!(
            "tolerance {} exceeds the maximum RGB distance; every pixel will be keyed out",
            opts.tolerance
        );
    }

    let engine = SmoothingEngine::new();
    match engine.process_file(&cli.input, &cli.output, &opts) {
        Ok(result) => {
            log::debug!(
                "{}x{} image, {} background pixels, transparent={}",
                result.width,
                result.height,
                result.background_pixels,
                result.transparent
            );
            if !cli.quiet {
                println!("Saved {}", result.output.display());
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
