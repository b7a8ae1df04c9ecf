//! Point cloud operations for surface clustering.
//!
//! # Module Organization
//!
//! - `search`: R-tree index over the valid cells of an organized cloud
//! - `normals`: radius-based normal and curvature estimation
//! - `region_growing`: smoothness/curvature bounded region growing
//! - `threads`: sizing of the global Rayon pool
//!
//! # Usage
//!
//! ```ignore
//! use objectness_point_cloud::*;
//!
//! let normals = estimate_normals_radius(&cloud, &NormalConfig::default())?;
//! let clusters = region_growing(&cloud, &normals, &RegionGrowingConfig::default())?;
//! ```

pub mod normals;
pub mod region_growing;
pub mod search;
pub mod threads;

pub use normals::*;
pub use region_growing::*;
pub use search::*;
pub use threads::init_thread_pool;

use serde::{Deserialize, Serialize};

pub type Result<T> = std::result::Result<T, PointCloudError>;

#[derive(Debug, thiserror::Error)]
pub enum PointCloudError {
    #[error("Empty cloud: no valid points to process")]
    EmptyCloud,

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalConfig {
    /// Neighbour search radius in metres.
    pub search_radius: f32,
}

impl Default for NormalConfig {
    fn default() -> Self {
        Self {
            search_radius: 0.03,
        }
    }
}

impl NormalConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.search_radius.is_finite() && self.search_radius > 0.0) {
            return Err(PointCloudError::InvalidParameter(format!(
                "search_radius must be positive, got {}",
                self.search_radius
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionGrowingConfig {
    pub min_cluster_size: usize,
    pub max_cluster_size: usize,
    pub num_neighbours: usize,
    /// Maximum angle between neighbouring normals, radians.
    pub smoothness_threshold: f32,
    /// Points above this curvature join a region but never seed growth.
    pub curvature_threshold: f32,
}

impl Default for RegionGrowingConfig {
    fn default() -> Self {
        Self {
            min_cluster_size: 50,
            max_cluster_size: 1_000_000,
            num_neighbours: 30,
            smoothness_threshold: 3.0_f32.to_radians(),
            curvature_threshold: 1.0,
        }
    }
}

impl RegionGrowingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_cluster_size == 0 || self.min_cluster_size > self.max_cluster_size {
            return Err(PointCloudError::InvalidParameter(format!(
                "cluster size bounds [{}, {}] are invalid",
                self.min_cluster_size, self.max_cluster_size
            )));
        }
        if self.num_neighbours == 0 {
            return Err(PointCloudError::InvalidParameter(
                "num_neighbours must be at least 1".into(),
            ));
        }
        if !(self.smoothness_threshold.is_finite() && self.smoothness_threshold >= 0.0) {
            return Err(PointCloudError::InvalidParameter(format!(
                "smoothness_threshold must be non-negative, got {}",
                self.smoothness_threshold
            )));
        }
        if !(self.curvature_threshold.is_finite() && self.curvature_threshold >= 0.0) {
            return Err(PointCloudError::InvalidParameter(format!(
                "curvature_threshold must be non-negative, got {}",
                self.curvature_threshold
            )));
        }
        Ok(())
    }
}
