//! Edge anti-aliasing: supersample, blur the mask, downsample.
//!
//! A binary mask blurred at native resolution gives blocky transitions. The
//! [`Smoother`] optionally upscales image and mask, blurs the mask only, and
//! scales both back so the soft edge is computed on a finer grid.

use image::imageops::{self, FilterType};
use image::{GrayImage, RgbImage};

use crate::error::{Error, Result};

/// Resampling backend used by the [`Smoother`].
///
/// Color image and mask are resized independently; implementations must use
/// the same filter for both so their pixel grids stay aligned.
pub trait Resizer {
    /// Resize the color channels to `width x height`.
    fn resize_color(&self, image: &RgbImage, width: u32, height: u32) -> RgbImage;

    /// Resize the single-channel mask to `width x height`.
    fn resize_mask(&self, mask: &GrayImage, width: u32, height: u32) -> GrayImage;
}

/// Radii below this leave a Gaussian's neighbour taps under half a level
/// out of 255, so the blur is treated as an identity.
pub const MIN_BLUR_RADIUS: f32 = 0.25;

/// Blur backend applied to the mask only.
pub trait Blurrer {
    /// Blur `mask` with the given radius. [`Smoother`] only calls this with
    /// a finite radius of at least [`MIN_BLUR_RADIUS`].
    fn blur(&self, mask: &GrayImage, radius: f32) -> GrayImage;
}

/// Lanczos (a = 3) resampling via [`image::imageops::resize`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LanczosResizer;

impl Resizer for LanczosResizer {
    fn resize_color(&self, image: &RgbImage, width: u32, height: u32) -> RgbImage {
        imageops::resize(image, width, height, FilterType::Lanczos3)
    }

    fn resize_mask(&self, mask: &GrayImage, width: u32, height: u32) -> GrayImage {
        imageops::resize(mask, width, height, FilterType::Lanczos3)
    }
}

/// Gaussian blur via [`image::imageops::blur`], radius used as sigma.
///
/// Radii the kernel cannot represent (below [`MIN_BLUR_RADIUS`], non-finite,
/// or an empty mask) return the mask unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct GaussianBlurrer;

impl Blurrer for GaussianBlurrer {
    fn blur(&self, mask: &GrayImage, radius: f32) -> GrayImage {
        if !(radius.is_finite() && radius >= MIN_BLUR_RADIUS) || mask.is_empty() {
            return mask.clone();
        }
        imageops::blur(mask, radius)
    }
}

/// Mask smoothing stage, generic over its resampling and blur backends.
#[derive(Debug, Clone, Default)]
pub struct Smoother<R = LanczosResizer, B = GaussianBlurrer> {
    resizer: R,
    blurrer: B,
}

impl Smoother {
    /// Smoother with Lanczos resampling and Gaussian blur.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R: Resizer, B: Blurrer> Smoother<R, B> {
    /// Smoother with custom backends.
    #[must_use]
    pub fn with_backends(resizer: R, blurrer: B) -> Self {
        Self { resizer, blurrer }
    }

    /// Anti-alias the mask edges.
    ///
    /// Returns an image and mask with the original dimensions. With
    /// `upscale <= 1` no resampling happens; with `blur` below
    /// [`MIN_BLUR_RADIUS`] (zero and negative included) the mask is not
    /// blurred. Both disabled is an exact pass-through, as is an empty image.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Argument`] if `blur` is NaN or infinite, if image and
    /// mask sizes differ, or if the upscaled size does not fit in `u32`.
    pub fn smooth(
        &self,
        image: RgbImage,
        mask: GrayImage,
        upscale: u32,
        blur: f32,
    ) -> Result<(RgbImage, GrayImage)> {
        if !blur.is_finite() {
            return Err(Error::Argument(format!("blur radius must be finite, got {blur}")));
        }

        let (width, height) = image.dimensions();
        if mask.dimensions() != (width, height) {
            return Err(Error::Argument(format!(
                "mask is {}x{} but image is {width}x{height}",
                mask.width(),
                mask.height()
            )));
        }

        if width == 0 || height == 0 {
            return Ok((image, mask));
        }

        let supersample = upscale > 1;
        let (mut image, mut mask) = (image, mask);

        if supersample {
            let (up_w, up_h) = width
                .checked_mul(upscale)
                .zip(height.checked_mul(upscale))
                .ok_or_else(|| {
                    Error::Argument(format!(
                        "upscale {upscale} overflows a {width}x{height} image"
                    ))
                })?;
            log::debug!("upscaling {width}x{height} -> {up_w}x{up_h}");
            image = self.resizer.resize_color(&image, up_w, up_h);
            mask = self.resizer.resize_mask(&mask, up_w, up_h);
        }

        if blur >= MIN_BLUR_RADIUS {
            log::debug!("blurring mask with radius {blur}");
            mask = self.blurrer.blur(&mask, blur);
        }

        if supersample {
            image = self.resizer.resize_color(&image, width, height);
            mask = self.resizer.resize_mask(&mask, width, height);
        }

        Ok((image, mask))
    }
}
