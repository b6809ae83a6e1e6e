//! Alpha attachment and "over" compositing.
//!
//! The smoothed mask becomes the alpha channel of the image as-is. Optional
//! compositing onto a solid color uses Porter-Duff "over":
//! `out_a = src_a + dst_a * (1 - src_a)` and
//! `out = (src * src_a + dst * dst_a * (1 - src_a)) / out_a`,
//! which for an opaque background reduces to `src * src_a + dst * (1 - src_a)`.

use image::{GrayImage, Rgba, RgbImage, RgbaImage};

use crate::error::{Error, Result};

/// Attach `mask` as the alpha channel of `image`.
///
/// Alpha is assigned directly, not blended with any existing opacity.
///
/// # Errors
///
/// Returns [`Error::Argument`] if `mask` and `image` have different
/// dimensions.
pub fn apply_mask(image: &RgbImage, mask: &GrayImage) -> Result<RgbaImage> {
    if image.dimensions() != mask.dimensions() {
        return Err(Error::Argument(format!(
            "mask is {}x{} but image is {}x{}",
            mask.width(),
            mask.height(),
            image.width(),
            image.height()
        )));
    }

    let mut out = RgbaImage::new(image.width(), image.height());
    for ((dst, src), m) in out.pixels_mut().zip(image.pixels()).zip(mask.pixels()) {
        *dst = Rgba([src[0], src[1], src[2], m[0]]);
    }
    Ok(out)
}

/// Composite a single pixel over another.
#[must_use]
pub fn blend_over(src: Rgba<u8>, dst: Rgba<u8>) -> Rgba<u8> {
    let src_a = f32::from(src[3]) / 255.0;
    let dst_a = f32::from(dst[3]) / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);

    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let mut out = [0u8; 4];
    for ch in 0..3 {
        let s = f32::from(src[ch]);
        let d = f32::from(dst[ch]);
        out[ch] = to_u8((s * src_a + d * dst_a * (1.0 - src_a)) / out_a);
    }
    out[3] = to_u8(out_a * 255.0);
    Rgba(out)
}

/// Composite `image` over a solid `background` of the same size.
///
/// With an opaque background every output pixel is opaque.
#[must_use]
pub fn composite_over(image: &RgbaImage, background: Rgba<u8>) -> RgbaImage {
    let mut out = RgbaImage::from_pixel(image.width(), image.height(), background);
    for (dst, src) in out.pixels_mut().zip(image.pixels()) {
        *dst = blend_over(*src, *dst);
    }
    out
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}
