// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image I/O — loading scans and encoding extracted photographs with the
// `image` crate.

use std::io::Cursor;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, RgbaImage};
use scancutter_core::OutputFormat;
use scancutter_core::error::{CutterError, Result};
use tracing::{debug, info, instrument};

// -- Loading ------------------------------------------------------------------

/// Load an image from a file path.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load(path: impl AsRef<Path>) -> Result<DynamicImage> {
    let path = path.as_ref();
    let img = image::open(path).map_err(|err| CutterError::ImageLoad {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    info!(width = img.width(), height = img.height(), "Image loaded");
    Ok(img)
}

// -- Output -------------------------------------------------------------------

/// Encode an extracted photograph in the requested format.
pub fn encode(image: &RgbaImage, format: OutputFormat) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    match format {
        OutputFormat::Png => {
            DynamicImage::ImageRgba8(image.clone())
                .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
                .map_err(|err| encode_error(format, err))?;
        }
        OutputFormat::Jpeg { quality } => {
            let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
            flatten_on_white(image)
                .write_with_encoder(encoder)
                .map_err(|err| encode_error(format, err))?;
        }
    }
    Ok(buffer)
}

/// Encode and write `image` to `path`.
#[instrument(skip(image), fields(path = %path.display(), width = image.width(), height = image.height()))]
pub fn save(image: &RgbaImage, path: &Path, format: OutputFormat) -> Result<()> {
    let bytes = encode(image, format).map_err(|err| CutterError::ImageSave {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    std::fs::write(path, &bytes).map_err(|err| CutterError::ImageSave {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    debug!(bytes = bytes.len(), "Image written");
    Ok(())
}

/// Composite onto an opaque white background; JPEG has no alpha channel.
pub fn flatten_on_white(image: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0;
        let alpha = u32::from(a);
        let blend = |channel: u8| -> u8 {
            ((u32::from(channel) * alpha + 255 * (255 - alpha) + 127) / 255) as u8
        };
        Rgb([blend(r), blend(g), blend(b)])
    })
}

fn encode_error(format: OutputFormat, err: image::ImageError) -> CutterError {
    CutterError::ImageSave {
        path: format!("<{}>", format.extension()).into(),
        reason: format!("encoding failed: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use image::Rgba;

    use super::*;

    #[test]
    fn png_keeps_transparency() {
        let mut img = RgbaImage::from_pixel(4, 3, Rgba([10, 20, 30, 255]));
        img.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        let bytes = encode(&img, OutputFormat::Png).expect("encode");
        let decoded = image::load_from_memory(&bytes).expect("decode").to_rgba8();
        assert_eq!(decoded.dimensions(), (4, 3));
        assert_eq!(decoded.get_pixel(0, 0).0[3], 0);
        assert_eq!(*decoded.get_pixel(1, 1), Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn jpeg_flattens_on_white() {
        let img = RgbaImage::from_pixel(16, 16, Rgba([0, 0, 0, 0]));
        let bytes = encode(&img, OutputFormat::Jpeg { quality: 90 }).expect("encode");
        let decoded = image::load_from_memory(&bytes).expect("decode").to_rgb8();
        assert!(decoded.pixels().all(|p| p.0.iter().all(|&c| c > 245)));
    }

    #[test]
    fn flatten_blends_partial_alpha() {
        let img = RgbaImage::from_pixel(1, 1, Rgba([0, 100, 255, 128]));
        let flat = flatten_on_white(&img);
        let [r, g, b] = flat.get_pixel(0, 0).0;
        assert_eq!(r, 127);
        assert!((177..=178).contains(&g));
        assert_eq!(b, 255);
    }

    #[test]
    fn load_reports_the_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not an image").expect("write");
        match load(&path) {
            Err(CutterError::ImageLoad { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected ImageLoad, got {other:?}"),
        }
    }

    #[test]
    fn save_writes_a_readable_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.png");
        let img = RgbaImage::from_pixel(5, 7, Rgba([1, 2, 3, 255]));
        save(&img, &path, OutputFormat::Png).expect("save");
        let loaded = load(&path).expect("load");
        assert_eq!((loaded.width(), loaded.height()), (5, 7));
    }

    #[test]
    fn save_into_missing_directory_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("missing").join("out.png");
        let img = RgbaImage::new(2, 2);
        assert!(matches!(
            save(&img, &path, OutputFormat::Png),
            Err(CutterError::ImageSave { .. })
        ));
    }
}
