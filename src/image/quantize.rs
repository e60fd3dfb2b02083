//! Palette quantisation using median cut.
//!
//! Colours are split into boxes along their widest channel until the palette
//! size is reached, optionally refined with a few k-means passes, then the
//! image is mapped onto the palette with Floyd-Steinberg error diffusion.

use image::RgbaImage;
use rustc_hash::FxHashMap;

/// An RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    fn from_slice(px: &[u8]) -> Self {
        Self {
            r: px[0],
            g: px[1],
            b: px[2],
            a: px[3],
        }
    }

    const fn key(self) -> u32 {
        u32::from_be_bytes([self.r, self.g, self.b, self.a])
    }

    fn distance(self, other: [f32; 4]) -> f32 {
        let dr = f32::from(self.r) - other[0];
        let dg = f32::from(self.g) - other[1];
        let db = f32::from(self.b) - other[2];
        let da = f32::from(self.a) - other[3];
        dr * dr + dg * dg + db * db + da * da
    }
}

/// Quantisation parameters.
#[derive(Debug, Clone, Copy)]
pub struct QuantizeOptions {
    /// Maximum palette size (2..=256).
    pub max_colors: usize,
    /// Error diffusion strength (0 disables dithering).
    pub dithering: f32,
    /// k-means refinement passes run after median cut.
    pub refine_passes: usize,
}

/// A quantised image: palette plus one palette index per pixel.
#[derive(Debug, Clone)]
pub struct Quantized {
    pub palette: Vec<Color>,
    pub indices: Vec<u8>,
    /// Estimated quality (0-100), derived from the mean squared error.
    pub quality: u8,
}

#[derive(Debug, Clone)]
struct ColorBox {
    colors: Vec<(Color, u32)>,
}

#[derive(Debug, Clone, Copy)]
enum Channel {
    Red,
    Green,
    Blue,
    Alpha,
}

impl ColorBox {
    fn channel_range(&self, channel: Channel) -> u8 {
        let values = self.colors.iter().map(|(c, _)| channel_value(*c, channel));
        let (min, max) = values.fold((u8::MAX, u8::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)));
        max.saturating_sub(min)
    }

    fn widest_channel(&self) -> (Channel, u8) {
        [Channel::Red, Channel::Green, Channel::Blue, Channel::Alpha]
            .into_iter()
            .map(|ch| (ch, self.channel_range(ch)))
            .fold((Channel::Red, 0), |best, cur| if cur.1 > best.1 { cur } else { best })
    }

    fn pixel_count(&self) -> u64 {
        self.colors.iter().map(|(_, n)| u64::from(*n)).sum()
    }

    /// Split along the widest channel at the pixel-weighted median.
    fn split(mut self) -> (ColorBox, ColorBox) {
        let (channel, _) = self.widest_channel();
        self.colors.sort_by_key(|(c, _)| channel_value(*c, channel));

        let total = self.pixel_count();
        let mut running = 0u64;
        let mut split_idx = self.colors.len() / 2;
        for (i, (_, count)) in self.colors.iter().enumerate() {
            running += u64::from(*count);
            if running >= total / 2 {
                split_idx = i + 1;
                break;
            }
        }
        let split_idx = split_idx.clamp(1, self.colors.len() - 1);

        let right = self.colors.split_off(split_idx);
        (self, ColorBox { colors: right })
    }

    fn average(&self) -> Color {
        let total = self.pixel_count().max(1);
        let mut sum = [0u64; 4];
        for (c, n) in &self.colors {
            let n = u64::from(*n);
            sum[0] += u64::from(c.r) * n;
            sum[1] += u64::from(c.g) * n;
            sum[2] += u64::from(c.b) * n;
            sum[3] += u64::from(c.a) * n;
        }
        #[allow(clippy::cast_possible_truncation)]
        let [r, g, b, a] = sum.map(|v| (v / total) as u8);
        Color { r, g, b, a }
    }
}

const fn channel_value(c: Color, channel: Channel) -> u8 {
    match channel {
        Channel::Red => c.r,
        Channel::Green => c.g,
        Channel::Blue => c.b,
        Channel::Alpha => c.a,
    }
}

const TRANSPARENT: Color = Color { r: 0, g: 0, b: 0, a: 0 };

/// Count distinct visible colours and report whether any pixel is fully transparent.
fn histogram(image: &RgbaImage) -> (FxHashMap<Color, u32>, bool) {
    let mut counts = FxHashMap::default();
    let mut transparent = false;
    for px in image.as_raw().chunks_exact(4) {
        let color = Color::from_slice(px);
        if color.a == 0 {
            transparent = true;
        } else {
            *counts.entry(color).or_insert(0) += 1;
        }
    }
    (counts, transparent)
}

/// Build a palette of at most `max_colors` entries.
fn median_cut(counts: &FxHashMap<Color, u32>, max_colors: usize) -> Vec<Color> {
    let mut colors: Vec<(Color, u32)> = counts.iter().map(|(c, n)| (*c, *n)).collect();
    if colors.len() <= max_colors {
        colors.sort_by_key(|(c, _)| c.key());
        return colors.into_iter().map(|(c, _)| c).collect();
    }

    let mut boxes = vec![ColorBox { colors }];
    while boxes.len() < max_colors {
        // Split the most populated box that still has a spread.
        let Some(idx) = boxes
            .iter()
            .enumerate()
            .filter(|(_, b)| b.colors.len() > 1 && b.widest_channel().1 > 0)
            .max_by_key(|(_, b)| b.pixel_count())
            .map(|(i, _)| i)
        else {
            break;
        };
        let (left, right) = boxes.swap_remove(idx).split();
        boxes.push(left);
        boxes.push(right);
    }

    boxes.iter().map(ColorBox::average).collect()
}

fn nearest(palette: &[Color], target: [f32; 4]) -> usize {
    let mut best = 0;
    let mut best_dist = f32::MAX;
    for (i, c) in palette.iter().enumerate() {
        let d = c.distance(target);
        if d < best_dist {
            best_dist = d;
            best = i;
        }
    }
    best
}

/// Move each palette entry to the mean of the colours mapped to it.
fn refine(palette: &mut [Color], counts: &FxHashMap<Color, u32>) {
    let mut sums = vec![[0u64; 5]; palette.len()];
    for (color, count) in counts {
        let idx = nearest(palette, to_f32(*color));
        let n = u64::from(*count);
        let s = &mut sums[idx];
        s[0] += u64::from(color.r) * n;
        s[1] += u64::from(color.g) * n;
        s[2] += u64::from(color.b) * n;
        s[3] += u64::from(color.a) * n;
        s[4] += n;
    }
    for (entry, s) in palette.iter_mut().zip(sums) {
        if s[4] > 0 {
            #[allow(clippy::cast_possible_truncation)]
            let avg = |v: u64| (v / s[4]) as u8;
            *entry = Color {
                r: avg(s[0]),
                g: avg(s[1]),
                b: avg(s[2]),
                a: avg(s[3]),
            };
        }
    }
}

fn to_f32(c: Color) -> [f32; 4] {
    [c.r as f32, c.g as f32, c.b as f32, c.a as f32]
}

/// Quantise an RGBA image.
pub fn quantize(image: &RgbaImage, options: &QuantizeOptions) -> Quantized {
    let (counts, transparent) = histogram(image);
    let max_colors = options.max_colors.clamp(2, 256);
    // Fully transparent pixels get a reserved slot at index 0.
    let mut palette = median_cut(&counts, max_colors - usize::from(transparent));
    let exact = palette.len() == counts.len();

    if !exact {
        for _ in 0..options.refine_passes {
            refine(&mut palette, &counts);
        }
    }
    if transparent {
        palette.insert(0, TRANSPARENT);
    }

    let (indices, mse) = if exact {
        map_exact(image, &palette)
    } else {
        map_dithered(image, &palette, options.dithering)
    };

    Quantized {
        palette,
        indices,
        quality: quality_from_mse(mse),
    }
}

fn map_exact(image: &RgbaImage, palette: &[Color]) -> (Vec<u8>, f64) {
    let lookup: FxHashMap<Color, u8> = palette
        .iter()
        .enumerate()
        .map(|(i, c)| (*c, u8::try_from(i).unwrap_or(u8::MAX)))
        .collect();
    let indices = image
        .as_raw()
        .chunks_exact(4)
        .map(|px| {
            let color = Color::from_slice(px);
            if color.a == 0 {
                return 0;
            }
            lookup.get(&color).copied().unwrap_or(0)
        })
        .collect();
    (indices, 0.0)
}

/// Floyd-Steinberg error diffusion scaled by `strength`.
fn map_dithered(image: &RgbaImage, palette: &[Color], strength: f32) -> (Vec<u8>, f64) {
    let (width, height) = (image.width() as usize, image.height() as usize);
    let mut errors = vec![[0f32; 4]; width * height];
    let mut indices = Vec::with_capacity(width * height);
    let mut cache: FxHashMap<u32, u8> = FxHashMap::default();
    let mut squared_error = 0f64;

    let transparent_slot = palette.first() == Some(&TRANSPARENT);

    for (i, px) in image.as_raw().chunks_exact(4).enumerate() {
        let original = Color::from_slice(px);
        if original.a == 0 && transparent_slot {
            indices.push(0);
            continue;
        }
        let err = errors[i];
        let target = [
            (f32::from(original.r) + err[0]).clamp(0.0, 255.0),
            (f32::from(original.g) + err[1]).clamp(0.0, 255.0),
            (f32::from(original.b) + err[2]).clamp(0.0, 255.0),
            (f32::from(original.a) + err[3]).clamp(0.0, 255.0),
        ];

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let key = Color {
            r: target[0].round() as u8,
            g: target[1].round() as u8,
            b: target[2].round() as u8,
            a: target[3].round() as u8,
        }
        .key();
        let idx = *cache
            .entry(key)
            .or_insert_with(|| u8::try_from(nearest(palette, target)).unwrap_or(u8::MAX));
        indices.push(idx);

        let chosen = palette[usize::from(idx)];
        squared_error += f64::from(original.distance(to_f32(chosen))) / 4.0;

        if strength <= 0.0 {
            continue;
        }
        let chosen = to_f32(chosen);
        let diff: [f32; 4] = std::array::from_fn(|c| (target[c] - chosen[c]) * strength);

        let (x, y) = (i % width, i / width);
        let mut spread = |dx: isize, dy: usize, weight: f32| {
            let nx = x.checked_add_signed(dx);
            if let Some(nx) = nx
                && nx < width
                && y + dy < height
            {
                let slot = &mut errors[(y + dy) * width + nx];
                for c in 0..4 {
                    slot[c] += diff[c] * weight;
                }
            }
        };
        spread(1, 0, 7.0 / 16.0);
        spread(-1, 1, 3.0 / 16.0);
        spread(0, 1, 5.0 / 16.0);
        spread(1, 1, 1.0 / 16.0);
    }

    let pixels = (width * height).max(1) as f64;
    (indices, squared_error / pixels)
}

/// Map mean squared error per channel onto a 0-100 scale.
fn quality_from_mse(mse: f64) -> u8 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let q = (100.0 - mse.sqrt() * 100.0 / 32.0).clamp(0.0, 100.0).round() as u8;
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn options(max_colors: usize) -> QuantizeOptions {
        QuantizeOptions {
            max_colors,
            dithering: 0.4,
            refine_passes: 2,
        }
    }

    fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            #[allow(clippy::cast_possible_truncation)]
            Rgba([(x * 4) as u8, (y * 4) as u8, ((x + y) * 2) as u8, 255])
        })
    }

    #[test]
    fn test_few_colors_are_exact() {
        let img = RgbaImage::from_fn(4, 4, |x, _| {
            if x < 2 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        });
        let q = quantize(&img, &options(256));
        assert_eq!(q.palette.len(), 2);
        assert_eq!(q.indices.len(), 16);
        assert_eq!(q.quality, 100);
        assert_eq!(q.palette[usize::from(q.indices[0])], Color { r: 255, g: 0, b: 0, a: 255 });
    }

    #[test]
    fn test_palette_limited() {
        let img = gradient(64, 64);
        let q = quantize(&img, &options(16));
        assert!(q.palette.len() <= 16);
        assert_eq!(q.indices.len(), 64 * 64);
        assert!(q.indices.iter().all(|i| usize::from(*i) < q.palette.len()));
        assert!(q.quality < 100);
    }

    #[test]
    fn test_transparent_pixels_collapse() {
        let img = RgbaImage::from_fn(2, 1, |x, _| Rgba([x as u8 * 200, 10, 10, 0]));
        let q = quantize(&img, &options(256));
        assert_eq!(q.palette.len(), 1);
        assert_eq!(q.palette[0].a, 0);
    }

    #[test]
    fn test_split_keeps_both_halves() {
        let colors = vec![
            (Color { r: 0, g: 0, b: 0, a: 255 }, 10),
            (Color { r: 255, g: 0, b: 0, a: 255 }, 1),
        ];
        let (left, right) = ColorBox { colors }.split();
        assert_eq!(left.colors.len(), 1);
        assert_eq!(right.colors.len(), 1);
    }

    #[test]
    fn test_quality_scale() {
        assert_eq!(quality_from_mse(0.0), 100);
        assert_eq!(quality_from_mse(32.0 * 32.0), 0);
    }
}
