//! Scene objectness segmentation from organized RGB point clouds.
//!
//! Re-exports the member crates under short names and gathers the types a
//! caller needs in [`prelude`].

pub use objectness_core as core;
pub use objectness_imgproc as imgproc;
pub use objectness_point_cloud as point_cloud;
pub use objectness_segmentation as segmentation;

pub mod prelude {
    pub use objectness_core::{ObjectArea, OrganizedCloud, Rect, Rgb, RgbImage, SensorFrame};
    pub use objectness_segmentation::{
        Capabilities, Detection, ObjectnessDetector, SegmentationConfig, SegmentationError,
    };
}

/// Initialize the global Rayon thread pool used by normal estimation.
///
/// Call this once at application startup, before the first detection.
/// Repeated calls are idempotent and return the first initialization
/// result.
///
/// Priority order:
/// 1. explicit `num_threads`
/// 2. `OBJECTNESS_CPU_THREADS` env var
/// 3. Rayon default
pub fn init_thread_pool(num_threads: Option<usize>) -> Result<usize, String> {
    objectness_point_cloud::init_thread_pool(num_threads).map_err(|e| e.to_string())
}
