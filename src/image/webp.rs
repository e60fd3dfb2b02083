//! WebP conversion.

use anyhow::{Context, Result, bail};
use image::codecs::webp::WebPEncoder;
use image::ExtendedColorType;

use crate::config::WebpConfig;

/// Encode any decodable raster as WebP. Animated GIFs keep their first frame.
pub fn to_webp(content: &[u8], config: &WebpConfig) -> Result<Vec<u8>> {
    if !config.lossless {
        bail!("lossy webp encoding is not supported, set images.webp.lossless = true");
    }
    let img = image::load_from_memory(content).context("failed to decode image")?;
    let rgba = img.to_rgba8();

    let mut out = Vec::new();
    WebPEncoder::new_lossless(&mut out)
        .encode(rgba.as_raw(), rgba.width(), rgba.height(), ExtendedColorType::Rgba8)
        .context("failed to encode webp")?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    #[test]
    fn test_png_to_lossless_webp() {
        let img = RgbaImage::from_fn(16, 8, |x, y| Rgba([x as u8 * 10, y as u8 * 20, 50, 255]));
        let mut png = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img.clone())
            .write_to(&mut png, ImageFormat::Png)
            .unwrap();

        let out = to_webp(&png.into_inner(), &WebpConfig::default()).unwrap();
        assert_eq!(&out[..4], b"RIFF");
        assert_eq!(&out[8..12], b"WEBP");

        let decoded = image::load_from_memory_with_format(&out, ImageFormat::WebP)
            .unwrap()
            .to_rgba8();
        assert_eq!(decoded, img);
    }

    #[test]
    fn test_lossy_rejected() {
        let config = WebpConfig { lossless: false };
        assert!(to_webp(b"", &config).is_err());
    }
}
