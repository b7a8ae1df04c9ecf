//! Scene object segmentation.
//!
//! The detector fuses smooth-surface clusters from the organized point
//! cloud with connected-component analysis of the cells no surface claimed:
//!
//! 1. `surfaces`: cluster the cloud and drop clusters beyond reach
//! 2. `residual`: label the unassigned cells, emit interior regions and
//!    track the largest border-touching one
//! 3. `edge_split`: cut the border region along its contours and split it
//! 4. `environment`: drop clusters whose palette matches the environment
//! 5. `shape`: corners and physical extents of the remaining clusters
//!
//! Every geometric primitive is reached through the traits in
//! [`capabilities`], so the merging logic can run against fixed stubs.
//!
//! # Usage
//!
//! ```ignore
//! use objectness_segmentation::*;
//!
//! let detector = ObjectnessDetector::new(SegmentationConfig::default())?;
//! let detection = detector.detect(&frame, Rgb([200, 200, 200]), false)?;
//! for object in detection.surface_objects() {
//!     println!("{:?} {:?}", object.bounds2d, object.dominant_color());
//! }
//! ```

pub mod capabilities;
pub mod config;
pub mod debug;
pub mod edge_split;
pub mod engine;
pub mod environment;
pub mod residual;
pub mod shape;
pub mod surfaces;

pub use capabilities::*;
pub use config::*;
pub use debug::DebugViews;
pub use engine::{Detection, ObjectnessDetector};

pub use objectness_core::{ObjectArea, OrganizedCloud, Rect, Rgb, SensorFrame};

use objectness_core::Error as CoreError;
use objectness_imgproc::ImgprocError;
use objectness_point_cloud::PointCloudError;

pub type Result<T> = std::result::Result<T, SegmentationError>;

#[derive(Debug, thiserror::Error)]
pub enum SegmentationError {
    #[error("Invalid frame: {0}")]
    Frame(#[from] CoreError),

    #[error("Image processing failed: {0}")]
    Imgproc(#[from] ImgprocError),

    #[error("Surface clustering failed: {0}")]
    PointCloud(#[from] PointCloudError),

    #[error("Zero-size mask: {0}")]
    ZeroSizeMask(String),

    #[error("Capability returned invalid output: {0}")]
    Capability(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to read configuration: {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),
}
