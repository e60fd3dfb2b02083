//! Raster re-encoding for build mode.
//!
//! | Format | Strategy |
//! |---|---|
//! | JPEG | decode, light blur (`smooth`), re-encode at `quality` |
//! | GIF | frame-by-frame re-encode through the `gif` crate, interlaced |
//! | PNG | median-cut quantisation to an indexed PNG, ancillary chunks dropped |

use std::io::Cursor;

use anyhow::{Context, Result, bail};
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageFormat, imageops};

use super::quantize::{QuantizeOptions, quantize};
use crate::config::{GifConfig, ImagesConfig, JpegConfig, PngConfig};

/// Raster formats handled by [`optimize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterKind {
    Jpeg,
    Png,
    Gif,
}

impl RasterKind {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "gif" => Some(Self::Gif),
            _ => None,
        }
    }
}

/// Re-encode one raster image according to its kind.
pub fn optimize(content: &[u8], kind: RasterKind, config: &ImagesConfig) -> Result<Vec<u8>> {
    match kind {
        RasterKind::Jpeg => optimize_jpeg(content, &config.jpeg),
        RasterKind::Png => optimize_png(content, &config.png),
        RasterKind::Gif => optimize_gif(content, &config.gif),
    }
}

/// Re-encode a JPEG. `smooth` maps 1..=100 onto a blur sigma of 0.05..=5.
pub fn optimize_jpeg(content: &[u8], config: &JpegConfig) -> Result<Vec<u8>> {
    let img = image::load_from_memory_with_format(content, ImageFormat::Jpeg)
        .context("failed to decode jpeg")?;
    let mut rgb = img.to_rgb8();
    if config.smooth > 0 {
        rgb = imageops::blur(&rgb, f32::from(config.smooth) / 20.0);
    }

    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, config.quality)
        .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
        .context("failed to encode jpeg")?;
    Ok(out)
}

/// Re-encode every GIF frame, keeping palettes, delays and disposal.
pub fn optimize_gif(content: &[u8], config: &GifConfig) -> Result<Vec<u8>> {
    let mut options = gif::DecodeOptions::new();
    options.set_color_output(gif::ColorOutput::Indexed);
    let mut decoder = options
        .read_info(Cursor::new(content))
        .context("failed to decode gif")?;

    let (width, height) = (decoder.width(), decoder.height());
    let palette = decoder.global_palette().unwrap_or_default().to_vec();

    let mut frames = Vec::new();
    // Decoded pixels are always in display order; the encoder writes
    // rows as given, so interlacing means reordering them here.
    while let Some(frame) = decoder.read_next_frame().context("failed to read gif frame")? {
        let mut frame = frame.clone();
        if config.interlaced {
            let rows = interlace_rows(&frame.buffer, usize::from(frame.width), usize::from(frame.height));
            frame.buffer = rows.into();
        }
        frame.interlaced = config.interlaced;
        frames.push(frame);
    }
    if frames.is_empty() {
        bail!("gif has no frames");
    }

    let mut out = Vec::new();
    {
        let mut encoder = gif::Encoder::new(&mut out, width, height, &palette)
            .context("failed to start gif encoder")?;
        if frames.len() > 1 {
            encoder.set_repeat(gif::Repeat::Infinite)?;
        }
        for frame in &frames {
            encoder.write_frame(frame).context("failed to write gif frame")?;
        }
    }
    Ok(out)
}

/// Rows in GIF interlace order: every 8th from 0, every 8th from 4, every
/// 4th from 2, then every odd row.
fn interlace_rows(pixels: &[u8], width: usize, height: usize) -> Vec<u8> {
    const PASSES: [(usize, usize); 4] = [(0, 8), (4, 8), (2, 4), (1, 2)];
    if pixels.len() < width * height {
        return pixels.to_vec();
    }
    let mut out = Vec::with_capacity(pixels.len());
    for (start, step) in PASSES {
        for row in (start..height).step_by(step) {
            out.extend_from_slice(&pixels[row * width..(row + 1) * width]);
        }
    }
    out
}

/// Quantise a PNG to an indexed palette.
///
/// The palette size follows the upper quality bound (100 keeps 256 colours).
/// If the estimated quality falls below the lower bound the source is kept.
pub fn optimize_png(content: &[u8], config: &PngConfig) -> Result<Vec<u8>> {
    let img = image::load_from_memory_with_format(content, ImageFormat::Png)
        .context("failed to decode png")?;
    let rgba = img.to_rgba8();
    let [min_quality, max_quality] = config.quality;

    let options = QuantizeOptions {
        max_colors: (256 * usize::from(max_quality)).div_ceil(100),
        dithering: config.dithering,
        refine_passes: refine_passes(config.speed),
    };
    let quantized = quantize(&rgba, &options);
    if quantized.quality < min_quality {
        crate::debug!("images"; "png quality {} below {}, kept source", quantized.quality, min_quality);
        return Ok(content.to_vec());
    }

    let mut palette = Vec::with_capacity(quantized.palette.len() * 3);
    let mut trns = Vec::with_capacity(quantized.palette.len());
    for c in &quantized.palette {
        palette.extend_from_slice(&[c.r, c.g, c.b]);
        trns.push(c.a);
    }
    while trns.last() == Some(&255) {
        trns.pop();
    }

    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, rgba.width(), rgba.height());
        encoder.set_color(png::ColorType::Indexed);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(png::Compression::Best);
        encoder.set_palette(palette);
        if !trns.is_empty() {
            encoder.set_trns(trns);
        }
        let mut writer = encoder.write_header().context("failed to write png header")?;
        writer
            .write_image_data(&quantized.indices)
            .context("failed to write png data")?;
        writer.finish().context("failed to finish png")?;
    }
    Ok(out)
}

/// Slower speeds refine the palette more.
fn refine_passes(speed: u8) -> usize {
    match speed {
        0..=1 => 4,
        2..=3 => 3,
        4..=6 => 2,
        7..=9 => 1,
        _ => 0,
    }
}
