//! Key out a magenta (`#FF00FF`) background and anti-alias the cutout edge.
//!
//! The pipeline classifies every pixel by its RGB distance to magenta,
//! softens the resulting binary mask by blurring it on a supersampled grid,
//! then uses the mask as alpha. The cutout is left transparent or composited
//! over a solid color.
//!
//! # Quick Start
//!
//! ```no_run
//! use smooth_edges::{ProcessOptions, SmoothingEngine};
//!
//! let engine = SmoothingEngine::new();
//! let opts = ProcessOptions::default();
//! engine
//!     .process_file("sprite.png".as_ref(), "sprite_cut.png".as_ref(), &opts)
//!     .expect("failed to process image");
//! ```
//!
//! # In-memory use
//!
//! ```
//! use image::{Rgba, RgbaImage};
//! use smooth_edges::{ProcessOptions, SmoothingEngine};
//!
//! let img = RgbaImage::from_pixel(4, 4, Rgba([255, 0, 255, 255]));
//! let cutout = SmoothingEngine::new()
//!     .process(img, &ProcessOptions::default())
//!     .unwrap();
//! assert!(cutout.image.pixels().all(|p| p[3] == 0));
//! ```

#![deny(missing_docs)]

pub mod blending;
pub mod color;
mod engine;
pub mod error;
pub mod mask;
pub mod smoothing;

pub use color::{parse_color, CHROMA_KEY};
pub use engine::{
    load_image, output_format, save_image, Cutout, ProcessOptions, ProcessResult,
    SmoothingEngine,
};
pub use error::{Error, Result};
pub use smoothing::{Blurrer, GaussianBlurrer, LanczosResizer, Resizer, Smoother};
