//! Binary background mask from color distance to the chroma key.
//!
//! Every pixel is classified on its own: a pixel whose squared RGB distance
//! to [`CHROMA_KEY`] is at most `tolerance²` is background (0), anything else
//! is foreground (255). No partial transparency is produced here; soft edges
//! come from [`crate::smoothing`].

use image::{GrayImage, Rgb, RgbImage};

use crate::color::CHROMA_KEY;

/// Mask value for keyed-out pixels.
pub const BACKGROUND: u8 = 0;
/// Mask value for kept pixels.
pub const FOREGROUND: u8 = 255;

/// Squared Euclidean distance between a pixel and the chroma key.
#[must_use]
pub fn key_distance_sq(px: Rgb<u8>) -> u32 {
    px.0.iter()
        .zip(CHROMA_KEY.0.iter())
        .map(|(&c, &k)| {
            let d = u32::from(c.abs_diff(k));
            d * d
        })
        .sum()
}

/// Whether a pixel is close enough to the chroma key to be background.
///
/// Compares squared distances, so `tolerance` is a linear RGB distance
/// (0 matches exact magenta only, 442 and above matches every color).
#[must_use]
pub fn is_background(px: Rgb<u8>, tolerance: u32) -> bool {
    let tol = u64::from(tolerance);
    u64::from(key_distance_sq(px)) <= tol * tol
}

#[inline]
fn classify(rgb: &[u8], tolerance: u32) -> u8 {
    if is_background(Rgb([rgb[0], rgb[1], rgb[2]]), tolerance) {
        BACKGROUND
    } else {
        FOREGROUND
    }
}

/// Build the opacity mask for an image.
///
/// The result has the same dimensions as `image`. Pixels are classified in
/// parallel when the `parallel` feature is enabled; output is identical
/// either way.
#[must_use]
pub fn build_mask(image: &RgbImage, tolerance: u32) -> GrayImage {
    let (width, height) = image.dimensions();
    let raw = image.as_raw();

    #[cfg(feature = "parallel")]
    let values: Vec<u8> = {
        use rayon::prelude::*;
        raw.par_chunks_exact(3)
            .map(|rgb| classify(rgb, tolerance))
            .collect()
    };

    #[cfg(not(feature = "parallel"))]
    let values: Vec<u8> = raw
        .chunks_exact(3)
        .map(|rgb| classify(rgb, tolerance))
        .collect();

    GrayImage::from_raw(width, height, values)
        .unwrap_or_else(|| unreachable!("one mask byte per pixel"))
}

/// Number of background pixels in a mask.
#[must_use]
pub fn background_pixel_count(mask: &GrayImage) -> usize {
    mask.as_raw().iter().filter(|&&v| v == BACKGROUND).count()
}
