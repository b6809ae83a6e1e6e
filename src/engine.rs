//! Pipeline wiring: load, key out, smooth, composite, save.

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

use crate::blending;
use crate::error::{Error, Result};
use crate::mask;
use crate::smoothing::{Blurrer, GaussianBlurrer, LanczosResizer, Resizer, Smoother};

/// Options controlling keying and edge smoothing.
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// Maximum RGB distance to magenta that still counts as background (0-442).
    pub tolerance: u32,
    /// Supersampling factor for the blur; 0 and 1 disable resampling.
    pub upscale: u32,
    /// Gaussian blur radius applied to the mask; values below 0.25 disable it.
    pub blur: f32,
    /// Solid color to composite onto, or `None` for a transparent result.
    pub background: Option<Rgba<u8>>,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            tolerance: 80,
            upscale: 2,
            blur: 2.0,
            background: None,
        }
    }
}

impl ProcessOptions {
    /// Reject values no stage can work with.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Argument`] if `blur` is NaN or infinite.
    pub fn validate(&self) -> Result<()> {
        if self.blur.is_finite() {
            Ok(())
        } else {
            Err(Error::Argument(format!(
                "blur radius must be finite, got {}",
                self.blur
            )))
        }
    }

    /// Whether the result can contain non-opaque pixels.
    #[must_use]
    pub fn is_transparent(&self) -> bool {
        self.background.is_none_or(|bg| bg[3] < 255)
    }
}

/// In-memory result of the pipeline.
#[derive(Debug, Clone)]
pub struct Cutout {
    /// Output pixels, alpha taken from the smoothed mask.
    pub image: RgbaImage,
    /// Pixels classified as background before smoothing.
    pub background_pixels: usize,
}

/// Summary of a processed file.
#[derive(Debug, Clone)]
pub struct ProcessResult {
    /// Path the image was read from.
    pub input: PathBuf,
    /// Path the result was written to.
    pub output: PathBuf,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Pixels classified as background before smoothing.
    pub background_pixels: usize,
    /// Whether the output keeps per-pixel transparency.
    pub transparent: bool,
}

/// The chroma-key pipeline.
///
/// Holds the smoothing backends; create once and reuse for any number of
/// images.
#[derive(Debug, Clone, Default)]
pub struct SmoothingEngine<R = LanczosResizer, B = GaussianBlurrer> {
    smoother: Smoother<R, B>,
}

impl SmoothingEngine {
    /// Engine with Lanczos resampling and Gaussian blur.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R: Resizer, B: Blurrer> SmoothingEngine<R, B> {
    /// Engine with custom resampling and blur backends.
    #[must_use]
    pub fn with_backends(resizer: R, blurrer: B) -> Self {
        Self {
            smoother: Smoother::with_backends(resizer, blurrer),
        }
    }

    /// Run the pipeline on a decoded image.
    ///
    /// The input's own alpha channel is ignored; the output alpha comes from
    /// the smoothed chroma-key mask, or is opaque when a background is set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Argument`] if `opts.blur` is not finite or
    /// `opts.upscale` overflows the image size.
    pub fn process(&self, image: RgbaImage, opts: &ProcessOptions) -> Result<Cutout> {
        let rgb = DynamicImage::ImageRgba8(image).into_rgb8();
        let (width, height) = rgb.dimensions();

        let key_mask = mask::build_mask(&rgb, opts.tolerance);
        let background_pixels = mask::background_pixel_count(&key_mask);
        log::info!(
            "keyed out {background_pixels} of {} pixels (tolerance {})",
            u64::from(width) * u64::from(height),
            opts.tolerance
        );

        let (rgb, key_mask) = self
            .smoother
            .smooth(rgb, key_mask, opts.upscale, opts.blur)?;

        let cutout = blending::apply_mask(&rgb, &key_mask)?;
        let image = match opts.background {
            Some(bg) => {
                log::debug!("compositing over {bg:?}");
                blending::composite_over(&cutout, bg)
            }
            None => cutout,
        };

        Ok(Cutout {
            image,
            background_pixels,
        })
    }

    /// Process a single image file: load, key, smooth, save.
    ///
    /// The output format is checked before the input is read, so an
    /// unusable output path fails fast. No output file is created on error.
    ///
    /// # Errors
    ///
    /// - [`Error::Argument`] if the options are invalid (checked before any I/O).
    /// - [`Error::UnsupportedFormat`] if the output format is unknown or
    ///   cannot hold the (transparent) result.
    /// - [`Error::Decode`] if the input cannot be read or decoded.
    /// - [`Error::Encode`] / [`Error::Write`] if saving fails.
    pub fn process_file(
        &self,
        input: &Path,
        output: &Path,
        opts: &ProcessOptions,
    ) -> Result<ProcessResult> {
        opts.validate()?;
        let transparent = opts.is_transparent();
        output_format(output, transparent)?;

        let image = load_image(input)?;
        let (width, height) = image.dimensions();
        log::debug!("loaded {} ({width}x{height})", input.display());

        let cutout = self.process(image, opts)?;
        save_image(&cutout.image, output, transparent)?;

        Ok(ProcessResult {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            width,
            height,
            background_pixels: cutout.background_pixels,
            transparent,
        })
    }
}

/// Decode an image file into RGBA with every pixel fully opaque.
///
/// # Errors
///
/// Returns [`Error::Decode`] if the file is missing, unreadable, or not a
/// supported image format.
pub fn load_image(path: &Path) -> Result<RgbaImage> {
    let mut image = image::open(path)
        .map_err(|source| Error::Decode {
            path: path.to_path_buf(),
            source,
        })?
        .into_rgba8();

    for px in image.pixels_mut() {
        px[3] = 255;
    }
    Ok(image)
}

/// Resolve the output format from the path extension.
///
/// Formats without an alpha channel are only accepted for opaque results.
///
/// # Errors
///
/// Returns [`Error::UnsupportedFormat`] if the extension is unknown, or names
/// an opaque-only format while `transparent` is set.
pub fn output_format(path: &Path, transparent: bool) -> Result<ImageFormat> {
    let format =
        ImageFormat::from_path(path).map_err(|e| Error::UnsupportedFormat(e.to_string()))?;

    match format {
        ImageFormat::Png
        | ImageFormat::WebP
        | ImageFormat::Tiff
        | ImageFormat::Tga
        | ImageFormat::Qoi
        | ImageFormat::Bmp => Ok(format),
        ImageFormat::Jpeg if !transparent => Ok(format),
        ImageFormat::Jpeg => Err(Error::UnsupportedFormat(
            "JPEG cannot store transparency; pass a background color or use PNG".to_string(),
        )),
        _ => Err(Error::UnsupportedFormat(format!("{format:?}"))),
    }
}

/// Encode and atomically write an RGBA image.
///
/// The image is encoded in memory, written to a temporary file next to
/// `path` and renamed into place, so a failed save leaves nothing behind.
/// JPEG output drops the alpha channel and uses quality 100.
///
/// # Errors
///
/// Returns [`Error::UnsupportedFormat`] (see [`output_format`]),
/// [`Error::Encode`] if encoding fails, or [`Error::Write`] if the target
/// directory is missing or not writable.
pub fn save_image(image: &RgbaImage, path: &Path, transparent: bool) -> Result<()> {
    let format = output_format(path, transparent)?;
    let encode_err = |source| Error::Encode {
        path: path.to_path_buf(),
        source,
    };

    let mut bytes = Cursor::new(Vec::new());
    if format == ImageFormat::Jpeg {
        let rgb = DynamicImage::ImageRgba8(image.clone()).into_rgb8();
        let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut bytes, 100);
        encoder.encode_image(&rgb).map_err(encode_err)?;
    } else {
        image.write_to(&mut bytes, format).map_err(encode_err)?;
    }

    write_atomic(path, bytes.get_ref())
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let write_err = |source| Error::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut builder = tempfile::Builder::new();
    builder.prefix(".smooth-edges-").suffix(".tmp");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o644));
    }

    let mut tmp = builder.tempfile_in(dir).map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
