//! `[images]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [images.jpeg]
//! quality = 70
//! smooth = 10
//!
//! [images.png]
//! quality = [0, 100]
//! dithering = 0.4
//! speed = 1
//!
//! [images.gif]
//! interlaced = true
//!
//! [images.webp]
//! lossless = true
//!
//! [images.svg]
//! precision = 0
//! plugins = ["remove_comments", "collapse_groups"]
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// Image optimisation settings (build mode only).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    pub jpeg: JpegConfig,
    pub png: PngConfig,
    pub gif: GifConfig,
    pub webp: WebpConfig,
    pub svg: SvgConfig,
}

impl ImagesConfig {
    /// Validate image settings.
    ///
    /// # Checks
    /// - quality values are within 0..=100
    /// - png quality range is ordered
    /// - dithering is within 0..=1
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if !(1..=100).contains(&self.jpeg.quality) {
            diag.error(FieldPath::new("images.jpeg.quality"), "must be within 1..=100");
        }
        let [min, max] = self.png.quality;
        if max > 100 || min > max {
            diag.error_with_hint(
                FieldPath::new("images.png.quality"),
                format!("invalid range [{min}, {max}]"),
                "use [min, max] with 0 <= min <= max <= 100",
            );
        }
        if !(0.0..=1.0).contains(&self.png.dithering) {
            diag.error(FieldPath::new("images.png.dithering"), "must be within 0..=1");
        }
        if !(1..=11).contains(&self.png.speed) {
            diag.error(FieldPath::new("images.png.speed"), "must be within 1..=11");
        }
    }
}

/// JPEG re-encoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JpegConfig {
    /// Encoder quality (1-100).
    pub quality: u8,
    /// Smoothing strength (0 disables).
    pub smooth: u8,
}

impl Default for JpegConfig {
    fn default() -> Self {
        Self {
            quality: 70,
            smooth: 10,
        }
    }
}

/// PNG palette quantisation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PngConfig {
    /// Accepted quality range; the palette grows until `max` is reached.
    pub quality: [u8; 2],
    /// Floyd-Steinberg dithering level (0 disables).
    pub dithering: f32,
    /// 1 = slowest and best; higher values refine the palette less.
    pub speed: u8,
}

impl Default for PngConfig {
    fn default() -> Self {
        Self {
            quality: [0, 100],
            dithering: 0.4,
            speed: 1,
        }
    }
}

/// GIF re-encoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GifConfig {
    pub interlaced: bool,
}

impl Default for GifConfig {
    fn default() -> Self {
        Self { interlaced: true }
    }
}

/// WebP conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebpConfig {
    /// Only lossless encoding is available; `false` is rejected at encode time.
    pub lossless: bool,
}

impl Default for WebpConfig {
    fn default() -> Self {
        Self { lossless: true }
    }
}

/// SVG cleanup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SvgConfig {
    /// Decimal places kept by numeric cleanup.
    pub precision: u8,
    /// Enabled cleanup passes; they always run in a fixed order.
    pub plugins: Vec<SvgPlugin>,
}

impl Default for SvgConfig {
    fn default() -> Self {
        Self {
            precision: 0,
            plugins: SvgPlugin::DEFAULT.to_vec(),
        }
    }
}

/// SVG cleanup passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SvgPlugin {
    CleanupAttrs,
    CleanupNumericValues,
    CollapseGroups,
    ConvertEllipseToCircle,
    ConvertShapeToPath,
    MergePaths,
    MinifyStyles,
    RemoveComments,
    RemoveDesc,
    RemoveDoctype,
    RemoveEditorsNsData,
    RemoveEmptyAttrs,
    RemoveEmptyContainers,
    RemoveEmptyText,
    RemoveHiddenElems,
    RemoveMetadata,
    RemoveTitle,
    RemoveXmlProcInst,
}

impl SvgPlugin {
    /// Default pass list.
    pub const DEFAULT: [Self; 18] = [
        Self::CleanupAttrs,
        Self::CleanupNumericValues,
        Self::CollapseGroups,
        Self::ConvertEllipseToCircle,
        Self::ConvertShapeToPath,
        Self::MergePaths,
        Self::MinifyStyles,
        Self::RemoveComments,
        Self::RemoveDesc,
        Self::RemoveDoctype,
        Self::RemoveEditorsNsData,
        Self::RemoveEmptyAttrs,
        Self::RemoveEmptyContainers,
        Self::RemoveEmptyText,
        Self::RemoveHiddenElems,
        Self::RemoveMetadata,
        Self::RemoveTitle,
        Self::RemoveXmlProcInst,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_images_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.images.jpeg.quality, 70);
        assert_eq!(config.images.jpeg.smooth, 10);
        assert_eq!(config.images.png.quality, [0, 100]);
        assert!((config.images.png.dithering - 0.4).abs() < f32::EPSILON);
        assert!(config.images.gif.interlaced);
        assert!(config.images.webp.lossless);
        assert_eq!(config.images.svg.plugins.len(), 18);
    }

    #[test]
    fn test_svg_plugin_names() {
        let config = test_parse_config(
            "[images.svg]\nplugins = [\"remove_comments\", \"remove_xml_proc_inst\", \"remove_editors_ns_data\"]",
        );
        assert_eq!(
            config.images.svg.plugins,
            vec![
                SvgPlugin::RemoveComments,
                SvgPlugin::RemoveXmlProcInst,
                SvgPlugin::RemoveEditorsNsData
            ]
        );
    }

    #[test]
    fn test_quality_range_validation() {
        let config = test_parse_config("[images.png]\nquality = [80, 20]\ndithering = 2.0");
        let mut diag = ConfigDiagnostics::new();
        config.images.validate(&mut diag);
        assert_eq!(diag.len(), 2);
    }
}
