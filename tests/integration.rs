use std::path::Path;

use image::{Rgba, RgbaImage};
use smooth_edges::{load_image, Error, ProcessOptions, SmoothingEngine};
use tempfile::TempDir;

const MAGENTA: Rgba<u8> = Rgba([255, 0, 255, 255]);
const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

fn write_png(dir: &Path, name: &str, img: &RgbaImage) -> std::path::PathBuf {
    let path = dir.join(name);
    img.save(&path).unwrap();
    path
}

/// Left half magenta, right half red.
fn half_and_half() -> RgbaImage {
    RgbaImage::from_fn(4, 4, |x, _| if x < 2 { MAGENTA } else { RED })
}

#[test]
fn all_magenta_with_defaults_is_fully_transparent() {
    let dir = TempDir::new().unwrap();
    let input = write_png(dir.path(), "in.png", &RgbaImage::from_pixel(4, 4, MAGENTA));
    let output = dir.path().join("out.png");

    let result = SmoothingEngine::new()
        .process_file(&input, &output, &ProcessOptions::default())
        .unwrap();
    assert_eq!((result.width, result.height), (4, 4));
    assert_eq!(result.background_pixels, 16);
    assert!(result.transparent);

    let saved = image::open(&output).unwrap().to_rgba8();
    assert_eq!(saved.dimensions(), (4, 4));
    assert!(saved.pixels().all(|p| p[3] == 0));
}

#[test]
fn hard_edges_over_white_background() {
    let dir = TempDir::new().unwrap();
    let input = write_png(dir.path(), "in.png", &half_and_half());
    let output = dir.path().join("out.png");
    let opts = ProcessOptions {
        tolerance: 10,
        upscale: 1,
        blur: 0.0,
        background: Some(Rgba([255, 255, 255, 255])),
    };

    let result = SmoothingEngine::new()
        .process_file(&input, &output, &opts)
        .unwrap();
    assert!(!result.transparent);

    let saved = image::open(&output).unwrap().to_rgba8();
    for (x, _, px) in saved.enumerate_pixels() {
        let expected = if x < 2 { [255, 255, 255, 255] } else { RED.0 };
        assert_eq!(px.0, expected, "pixel at x={x}");
    }
}

#[test]
fn opaque_background_allows_jpeg_output() {
    let dir = TempDir::new().unwrap();
    let input = write_png(dir.path(), "in.png", &half_and_half());
    let output = dir.path().join("out.jpg");
    let opts = ProcessOptions {
        background: Some(Rgba([0, 0, 0, 255])),
        ..ProcessOptions::default()
    };

    SmoothingEngine::new()
        .process_file(&input, &output, &opts)
        .unwrap();
    let saved = image::open(&output).unwrap();
    assert_eq!((saved.width(), saved.height()), (4, 4));
}

#[test]
fn transparent_jpeg_output_is_rejected_without_writing() {
    let dir = TempDir::new().unwrap();
    let input = write_png(dir.path(), "in.png", &half_and_half());
    let output = dir.path().join("out.jpg");

    let err = SmoothingEngine::new()
        .process_file(&input, &output, &ProcessOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedFormat(_)));
    assert!(!output.exists());
}

#[test]
fn missing_input_is_a_decode_error_and_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("does-not-exist.png");
    let output = dir.path().join("out.png");

    let err = SmoothingEngine::new()
        .process_file(&input, &output, &ProcessOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
    assert!(!output.exists());
}

#[test]
fn undecodable_input_is_a_decode_error() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("garbage.png");
    std::fs::write(&input, b"definitely not a png").unwrap();

    let err = load_image(&input).unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
}

#[test]
fn missing_output_directory_is_a_write_error() {
    let dir = TempDir::new().unwrap();
    let input = write_png(dir.path(), "in.png", &half_and_half());
    let output = dir.path().join("no/such/dir/out.png");

    let err = SmoothingEngine::new()
        .process_file(&input, &output, &ProcessOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::Write { .. }));
    assert!(!output.exists());
}

#[test]
fn failed_save_leaves_no_temporary_files() {
    let dir = TempDir::new().unwrap();
    let input = write_png(dir.path(), "in.png", &half_and_half());
    // A directory in the way makes the final rename fail.
    let output = dir.path().join("taken.png");
    std::fs::create_dir(&output).unwrap();
    std::fs::write(output.join("keep"), b"x").unwrap();

    let result = SmoothingEngine::new().process_file(&input, &output, &ProcessOptions::default());
    assert!(matches!(result, Err(Error::Write { .. })));

    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "temporary file left behind");
}

#[test]
fn loader_forces_opaque_alpha() {
    let dir = TempDir::new().unwrap();
    let translucent = RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 40]));
    let input = write_png(dir.path(), "in.png", &translucent);

    let loaded = load_image(&input).unwrap();
    assert_eq!(loaded.dimensions(), (3, 2));
    assert!(loaded.pixels().all(|p| p.0 == [10, 20, 30, 255]));
}

#[test]
fn output_keeps_input_dimensions_for_any_upscale() {
    let dir = TempDir::new().unwrap();
    let img = RgbaImage::from_fn(13, 7, |x, y| if (x + y) % 3 == 0 { MAGENTA } else { RED });
    let input = write_png(dir.path(), "in.png", &img);

    for upscale in [1, 2, 3, 5] {
        let output = dir.path().join(format!("out_{upscale}.png"));
        let opts = ProcessOptions {
            upscale,
            ..ProcessOptions::default()
        };
        SmoothingEngine::new()
            .process_file(&input, &output, &opts)
            .unwrap();
        let saved = image::open(&output).unwrap();
        assert_eq!((saved.width(), saved.height()), (13, 7));
    }
}

#[test]
fn smoothing_produces_partial_alpha_at_the_edge() {
    let img = RgbaImage::from_fn(32, 8, |x, _| if x < 16 { MAGENTA } else { RED });
    let cutout = SmoothingEngine::new()
        .process(img, &ProcessOptions::default())
        .unwrap();

    assert!(cutout.image.get_pixel(2, 4)[3] < 5);
    assert!(cutout.image.get_pixel(24, 4)[3] > 250);
    let partial = (13..19).any(|x| {
        let a = cutout.image.get_pixel(x, 4)[3];
        a > 0 && a < 255
    });
    assert!(partial, "expected soft alpha around the edge");
}

#[test]
fn non_finite_blur_fails_before_reading_input() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.png");
    let opts = ProcessOptions {
        blur: f32::NAN,
        ..ProcessOptions::default()
    };

    // The input does not exist; the option check must win over the decode error.
    let err = SmoothingEngine::new()
        .process_file(&dir.path().join("missing.png"), &output, &opts)
        .unwrap_err();
    assert!(matches!(err, Error::Argument(_)));
    assert!(!output.exists());
}
