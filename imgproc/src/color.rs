//! Colour analysis used to tell objects from their environment: CIE L*a*b*
//! conversion, median-cut palette reduction and a small colour-name table.

use image::Rgb;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// CIE L*a*b* colour (D65 white point).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lab {
    pub l: f32,
    pub a: f32,
    pub b: f32,
}

const D65_WHITE: [f32; 3] = [0.950_47, 1.0, 1.088_83];

fn srgb_to_linear(c: u8) -> f32 {
    let c = c as f32 / 255.0;
    if c <= 0.040_45 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn lab_f(t: f32) -> f32 {
    const DELTA: f32 = 6.0 / 29.0;
    if t > DELTA * DELTA * DELTA {
        t.cbrt()
    } else {
        t / (3.0 * DELTA * DELTA) + 4.0 / 29.0
    }
}

pub fn rgb_to_lab(rgb: Rgb<u8>) -> Lab {
    let r = srgb_to_linear(rgb[0]);
    let g = srgb_to_linear(rgb[1]);
    let b = srgb_to_linear(rgb[2]);

    let x = 0.412_456_4 * r + 0.357_576_1 * g + 0.180_437_5 * b;
    let y = 0.212_672_9 * r + 0.715_152_2 * g + 0.072_175_0 * b;
    let z = 0.019_333_9 * r + 0.119_192_0 * g + 0.950_304_1 * b;

    let fx = lab_f(x / D65_WHITE[0]);
    let fy = lab_f(y / D65_WHITE[1]);
    let fz = lab_f(z / D65_WHITE[2]);

    Lab {
        l: 116.0 * fy - 16.0,
        a: 500.0 * (fx - fy),
        b: 200.0 * (fy - fz),
    }
}

/// CIE76 colour difference.
pub fn lab_distance(a: Lab, b: Lab) -> f32 {
    let dl = a.l - b.l;
    let da = a.a - b.a;
    let db = a.b - b.b;
    (dl * dl + da * da + db * db).sqrt()
}

/// One representative colour of a median-cut palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteEntry {
    pub color: Rgb<u8>,
    /// Number of input colours represented by this entry.
    pub population: usize,
}

fn mean_color(colors: &[Rgb<u8>]) -> Rgb<u8> {
    let n = colors.len() as u64;
    let mut sum = [0u64; 3];
    for c in colors {
        for ch in 0..3 {
            sum[ch] += c[ch] as u64;
        }
    }
    Rgb([
        ((sum[0] + n / 2) / n) as u8,
        ((sum[1] + n / 2) / n) as u8,
        ((sum[2] + n / 2) / n) as u8,
    ])
}

fn widest_channel(colors: &[Rgb<u8>]) -> usize {
    let mut best = 0;
    let mut best_range = 0u8;
    for ch in 0..3 {
        let (lo, hi) = colors
            .iter()
            .fold((u8::MAX, u8::MIN), |(lo, hi), c| (lo.min(c[ch]), hi.max(c[ch])));
        let range = hi.saturating_sub(lo);
        if range > best_range {
            best_range = range;
            best = ch;
        }
    }
    best
}

fn cut(bucket: &mut [Rgb<u8>], depth: u32, fallback: Rgb<u8>, out: &mut Vec<PaletteEntry>) {
    if bucket.is_empty() {
        for _ in 0..(1usize << depth) {
            out.push(PaletteEntry {
                color: fallback,
                population: 0,
            });
        }
        return;
    }

    let mean = mean_color(bucket);
    if depth == 0 {
        out.push(PaletteEntry {
            color: mean,
            population: bucket.len(),
        });
        return;
    }

    let ch = widest_channel(bucket);
    bucket.sort_by_key(|c| c[ch]);
    let mid = bucket.len() / 2;
    let (low, high) = bucket.split_at_mut(mid);
    cut(low, depth - 1, mean, out);
    cut(high, depth - 1, mean, out);
}

/// Reduce `colors` to `k` representative colours by median cut.
///
/// `k` is rounded up to a power of two. Buckets that run out of colours
/// repeat their parent's mean with zero population, so non-empty input
/// always yields exactly `k` entries. Empty input yields an empty palette.
pub fn median_cut(colors: &[Rgb<u8>], k: usize) -> Vec<PaletteEntry> {
    if colors.is_empty() || k == 0 {
        return Vec::new();
    }
    let k = k.next_power_of_two();
    let depth = k.trailing_zeros();
    let mut bucket = colors.to_vec();
    let mut out = Vec::with_capacity(k);
    let fallback = mean_color(&bucket);
    cut(&mut bucket, depth, fallback, &mut out);
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamedColor {
    pub name: &'static str,
    pub rgb: [u8; 3],
}

pub const COLOR_MAP_9: [NamedColor; 9] = [
    NamedColor { name: "black", rgb: [0, 0, 0] },
    NamedColor { name: "white", rgb: [255, 255, 255] },
    NamedColor { name: "gray", rgb: [128, 128, 128] },
    NamedColor { name: "red", rgb: [255, 0, 0] },
    NamedColor { name: "orange", rgb: [255, 165, 0] },
    NamedColor { name: "yellow", rgb: [255, 255, 0] },
    NamedColor { name: "green", rgb: [0, 128, 0] },
    NamedColor { name: "blue", rgb: [0, 0, 255] },
    NamedColor { name: "purple", rgb: [128, 0, 128] },
];

/// Name of the table entry closest to `color` in L*a*b*.
pub fn nearest_color_name(color: Rgb<u8>, table: &[NamedColor]) -> Option<&'static str> {
    let lab = rgb_to_lab(color);
    table
        .iter()
        .map(|nc| (nc.name, lab_distance(lab, rgb_to_lab(Rgb(nc.rgb)))))
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(name, _)| name)
}

/// Map each palette entry to its nearest colour name. The strength of a
/// name is the share of the palette population it received.
pub fn color_names(palette: &[PaletteEntry], table: &[NamedColor]) -> BTreeMap<String, f32> {
    let total: usize = palette.iter().map(|e| e.population).sum();
    let mut names = BTreeMap::new();
    if total == 0 {
        return names;
    }
    for entry in palette.iter().filter(|e| e.population > 0) {
        if let Some(name) = nearest_color_name(entry.color, table) {
            *names.entry(name.to_string()).or_insert(0.0) += entry.population as f32 / total as f32;
        }
    }
    names
}
