//! Tunable thresholds of the segmentation pipeline.
//!
//! Every section uses `#[serde(default)]`, so a JSON document only needs
//! the fields it overrides.

use crate::{Result, SegmentationError};
use objectness_point_cloud::{NormalConfig, RegionGrowingConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    pub normals: NormalConfig,
    pub region_growing: RegionGrowingConfig,
    pub plausibility: PlausibilityConfig,
    pub residual: ResidualConfig,
    pub edge_split: EdgeSplitConfig,
    pub environment: EnvironmentConfig,
}

/// Reachable-workspace filter for surface clusters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlausibilityConfig {
    /// Clusters whose centroid lies farther than this from the sensor
    /// origin (metres) are returned to the unassigned pool.
    pub max_centroid_distance: f32,
}

impl Default for PlausibilityConfig {
    fn default() -> Self {
        Self {
            max_centroid_distance: 1.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResidualConfig {
    /// Regions whose bounding box covers fewer cells are noise.
    pub noise_area: u64,
}

impl Default for ResidualConfig {
    fn default() -> Self {
        Self { noise_area: 50 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeSplitConfig {
    /// Thickness of the background polyline drawn over every contour.
    pub suppress_margin: u32,
    /// Components whose bounding box covers fewer cells are dropped.
    pub lower_noise_area: u64,
    /// Components in the upper half larger than this (in cells) are
    /// treated as background bleed.
    pub upper_noise_area: u32,
}

impl Default for EdgeSplitConfig {
    fn default() -> Self {
        Self {
            suppress_margin: 6,
            lower_noise_area: 30,
            upper_noise_area: 300,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Palette size of the median-cut reduction, a power of two.
    pub quantize_colors: usize,
    /// Lab (CIE76) distance under which a palette colour matches the
    /// environment colour.
    pub max_lab_distance: f32,
    /// Matching palette colours needed to call a cluster environment.
    pub expected_matches: usize,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            quantize_colors: 4,
            max_lab_distance: 20.0,
            expected_matches: 3,
        }
    }
}

impl SegmentationConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        self.normals
            .validate()
            .map_err(|e| SegmentationError::InvalidConfig(e.to_string()))?;
        self.region_growing
            .validate()
            .map_err(|e| SegmentationError::InvalidConfig(e.to_string()))?;

        let max_distance = self.plausibility.max_centroid_distance;
        if !(max_distance.is_finite() && max_distance > 0.0) {
            return Err(SegmentationError::InvalidConfig(format!(
                "max_centroid_distance must be positive, got {}",
                max_distance
            )));
        }
        if self.edge_split.suppress_margin == 0 {
            return Err(SegmentationError::InvalidConfig(
                "suppress_margin must be at least 1".into(),
            ));
        }

        let env = &self.environment;
        if env.quantize_colors == 0 || !env.quantize_colors.is_power_of_two() {
            return Err(SegmentationError::InvalidConfig(format!(
                "quantize_colors must be a power of two, got {}",
                env.quantize_colors
            )));
        }
        if !(env.max_lab_distance.is_finite() && env.max_lab_distance >= 0.0) {
            return Err(SegmentationError::InvalidConfig(format!(
                "max_lab_distance must be non-negative, got {}",
                env.max_lab_distance
            )));
        }
        if env.expected_matches == 0 || env.expected_matches > env.quantize_colors {
            return Err(SegmentationError::InvalidConfig(format!(
                "expected_matches must be in [1, {}], got {}",
                env.quantize_colors, env.expected_matches
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = SegmentationConfig::default();
        config.validate().unwrap();
        assert_eq!(config.plausibility.max_centroid_distance, 1.2);
        assert_eq!(config.residual.noise_area, 50);
        assert_eq!(config.edge_split.suppress_margin, 6);
        assert_eq!(config.environment.quantize_colors, 4);
        assert_eq!(config.region_growing.num_neighbours, 30);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = SegmentationConfig::from_json_str(
            r#"{ "plausibility": { "max_centroid_distance": 2.5 }, "environment": { "expected_matches": 2 } }"#,
        )
        .unwrap();
        assert_eq!(config.plausibility.max_centroid_distance, 2.5);
        assert_eq!(config.environment.expected_matches, 2);
        assert_eq!(config.environment.quantize_colors, 4);
        assert_eq!(config.edge_split, EdgeSplitConfig::default());
    }

    #[test]
    fn rejects_bad_values() {
        let mut config = SegmentationConfig::default();
        config.environment.quantize_colors = 3;
        assert!(matches!(
            config.validate(),
            Err(SegmentationError::InvalidConfig(_))
        ));

        let mut config = SegmentationConfig::default();
        config.region_growing.min_cluster_size = 10;
        config.region_growing.max_cluster_size = 5;
        assert!(matches!(
            config.validate(),
            Err(SegmentationError::InvalidConfig(_))
        ));

        let mut config = SegmentationConfig::default();
        config.plausibility.max_centroid_distance = f32::NAN;
        assert!(config.validate().is_err());

        assert!(matches!(
            SegmentationConfig::from_json_str("{ not json"),
            Err(SegmentationError::ConfigParse(_))
        ));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("segmentation.json");
        std::fs::write(&path, r#"{ "residual": { "noise_area": 80 } }"#).unwrap();

        let config = SegmentationConfig::from_json_file(&path).unwrap();
        assert_eq!(config.residual.noise_area, 80);

        let missing = SegmentationConfig::from_json_file(dir.path().join("missing.json"));
        assert!(matches!(missing, Err(SegmentationError::ConfigIo(_))));
    }
}
