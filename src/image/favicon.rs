//! Base favicon set generation.
//!
//! From one or more source images produce:
//! - `favicon.ico` with one PNG-compressed frame per `ico_sizes` entry
//! - `favicon-{N}x{N}.png` per `sizes` entry
//! - `manifest.json` listing the PNG icons
//!
//! Every target size is rendered from the smallest source that is at least
//! that large, falling back to the largest source.

use anyhow::{Context, Result, bail};
use image::codecs::ico::{IcoEncoder, IcoFrame};
use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbaImage};
use serde::Serialize;

use crate::config::FaviconsConfig;
use crate::utils::mime;

pub const ICO_NAME: &str = "favicon.ico";
pub const MANIFEST_NAME: &str = "manifest.json";

/// One generated file.
#[derive(Debug, Clone)]
pub struct GeneratedIcon {
    pub name: String,
    pub content: Vec<u8>,
}

#[derive(Debug, Serialize)]
struct Manifest<'a> {
    name: &'a str,
    short_name: &'a str,
    background_color: &'a str,
    theme_color: &'a str,
    icons: Vec<ManifestIcon>,
}

#[derive(Debug, Serialize)]
struct ManifestIcon {
    src: String,
    sizes: String,
    #[serde(rename = "type")]
    mime: &'static str,
}

pub fn png_name(size: u32) -> String {
    format!("favicon-{size}x{size}.png")
}

/// Generate the favicon set from encoded source images.
pub fn generate(sources: &[Vec<u8>], config: &FaviconsConfig) -> Result<Vec<GeneratedIcon>> {
    let images = sources
        .iter()
        .map(|bytes| image::load_from_memory(bytes).context("failed to decode favicon source"))
        .collect::<Result<Vec<_>>>()?;
    if images.is_empty() {
        bail!("no favicon sources");
    }

    let mut icons = Vec::with_capacity(config.sizes.len() + 2);

    let frames = config
        .ico_sizes
        .iter()
        .map(|&size| {
            let square = render(pick_source(&images, size), size);
            let png = encode_png(&square)?;
            IcoFrame::with_encoded(png, size, size, ExtendedColorType::Rgba8)
                .context("failed to build ico frame")
        })
        .collect::<Result<Vec<_>>>()?;
    let mut ico = Vec::new();
    IcoEncoder::new(&mut ico)
        .encode_images(&frames)
        .context("failed to encode favicon.ico")?;
    icons.push(GeneratedIcon {
        name: ICO_NAME.to_string(),
        content: ico,
    });

    for &size in &config.sizes {
        let square = render(pick_source(&images, size), size);
        icons.push(GeneratedIcon {
            name: png_name(size),
            content: encode_png(&square)?,
        });
    }

    icons.push(GeneratedIcon {
        name: MANIFEST_NAME.to_string(),
        content: manifest(config)?,
    });
    Ok(icons)
}

/// Smallest source covering `size`, else the largest one.
fn pick_source(images: &[DynamicImage], size: u32) -> &DynamicImage {
    let edge = |img: &DynamicImage| img.width().min(img.height());
    images
        .iter()
        .filter(|img| edge(img) >= size)
        .min_by_key(|img| edge(img))
        .or_else(|| images.iter().max_by_key(|img| edge(img)))
        .unwrap_or(&images[0])
}

/// Fit the source into a transparent `size`×`size` square, centred.
fn render(source: &DynamicImage, size: u32) -> RgbaImage {
    let scaled = source.resize(size, size, FilterType::Lanczos3).to_rgba8();
    let mut canvas = RgbaImage::new(size, size);
    let x = i64::from((size - scaled.width().min(size)) / 2);
    let y = i64::from((size - scaled.height().min(size)) / 2);
    imageops::overlay(&mut canvas, &scaled, x, y);
    canvas
}

fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(image.as_raw(), image.width(), image.height(), ExtendedColorType::Rgba8)
        .context("failed to encode png")?;
    Ok(out)
}

fn manifest(config: &FaviconsConfig) -> Result<Vec<u8>> {
    let manifest = Manifest {
        name: &config.name,
        short_name: &config.name,
        background_color: &config.background,
        theme_color: &config.theme,
        icons: config
            .sizes
            .iter()
            .map(|&size| ManifestIcon {
                src: png_name(size),
                sizes: format!("{size}x{size}"),
                mime: mime::types::PNG,
            })
            .collect(),
    };
    Ok(serde_json::to_vec_pretty(&manifest)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba};
    use std::io::Cursor;

    fn source(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba(color));
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_generates_base_set() {
        let icons = generate(&[source(64, 64, [255, 0, 0, 255])], &FaviconsConfig::default()).unwrap();
        let names: Vec<_> = icons.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "favicon.ico",
                "favicon-16x16.png",
                "favicon-32x32.png",
                "favicon-48x48.png",
                "manifest.json"
            ]
        );

        let png32 = image::load_from_memory(&icons[2].content).unwrap();
        assert_eq!((png32.width(), png32.height()), (32, 32));

        let ico = image::load_from_memory_with_format(&icons[0].content, ImageFormat::Ico).unwrap();
        assert_eq!(ico.width(), 64);
    }

    #[test]
    fn test_manifest_lists_pngs() {
        let icons = generate(&[source(32, 32, [0, 0, 0, 255])], &FaviconsConfig::default()).unwrap();
        let manifest: serde_json::Value = serde_json::from_slice(&icons[4].content).unwrap();
        assert_eq!(manifest["name"], "app");
        assert_eq!(manifest["theme_color"], "#fff");
        let icons = manifest["icons"].as_array().unwrap();
        assert_eq!(icons.len(), 3);
        assert_eq!(icons[0]["src"], "favicon-16x16.png");
        assert_eq!(icons[0]["sizes"], "16x16");
        assert_eq!(icons[0]["type"], "image/png");
    }

    #[test]
    fn test_pick_source() {
        let small = DynamicImage::new_rgba8(16, 16);
        let medium = DynamicImage::new_rgba8(48, 48);
        let large = DynamicImage::new_rgba8(256, 256);
        let images = vec![large, small, medium];

        assert_eq!(pick_source(&images, 16).width(), 16);
        assert_eq!(pick_source(&images, 32).width(), 48);
        assert_eq!(pick_source(&images, 64).width(), 256);
        assert_eq!(pick_source(&images, 512).width(), 256);
    }

    #[test]
    fn test_non_square_is_centred() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(32, 16, Rgba([0, 0, 255, 255])));
        let square = render(&img, 16);
        assert_eq!(square.dimensions(), (16, 16));
        assert_eq!(square.get_pixel(0, 0)[3], 0);
        assert_eq!(square.get_pixel(8, 8)[3], 255);
    }

    #[test]
    fn test_no_sources() {
        assert!(generate(&[], &FaviconsConfig::default()).is_err());
    }
}
