use crate::config::EnvironmentConfig;
use image::Rgb;
use objectness_core::OrganizedCloud;
use objectness_imgproc::{color_names, lab_distance, median_cut, rgb_to_lab, PaletteEntry, COLOR_MAP_9};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub enum ColorVerdict {
    /// The palette matches the environment colour.
    Environment { palette: Vec<PaletteEntry> },
    /// Colour names with their share of the palette population.
    Object { colors: BTreeMap<String, f32> },
}

/// Colours of the cells among `indices` that carry a finite position.
pub fn gather_colors(cloud: &OrganizedCloud, indices: &[usize]) -> Vec<Rgb<u8>> {
    indices
        .iter()
        .filter(|&&i| cloud.is_valid(i))
        .map(|&i| cloud.colors[i])
        .collect()
}

/// Compare the median-cut palette of `colors` against the environment
/// colour. At least `expected_matches` palette entries within
/// `max_lab_distance` make the colours environment.
///
/// Padding entries of an undersized palette repeat a real colour and
/// count towards the matches, like any other entry.
pub fn classify_colors(
    colors: &[Rgb<u8>],
    environment: Rgb<u8>,
    config: &EnvironmentConfig,
) -> ColorVerdict {
    let palette = median_cut(colors, config.quantize_colors);
    let reference = rgb_to_lab(environment);
    let matches = palette
        .iter()
        .filter(|entry| lab_distance(rgb_to_lab(entry.color), reference) < config.max_lab_distance)
        .count();

    if !palette.is_empty() && matches >= config.expected_matches {
        ColorVerdict::Environment { palette }
    } else {
        ColorVerdict::Object {
            colors: color_names(&palette, &COLOR_MAP_9),
        }
    }
}
