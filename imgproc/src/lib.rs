//! Binary-mask and colour primitives for objectness segmentation.
//!
//! - `contours`: connected-component labeling, Moore boundary tracing and
//!   thick polyline rasterization
//! - `morph`: structuring elements and erosion
//! - `color`: CIE L*a*b*, median-cut palettes and colour naming

pub mod color;
pub mod contours;
pub mod morph;

pub use color::*;
pub use contours::*;
pub use morph::*;

pub type Result<T> = std::result::Result<T, ImgprocError>;

#[derive(Debug, thiserror::Error)]
pub enum ImgprocError {
    #[error("Algorithm error: {0}")]
    AlgorithmError(String),

    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),
}

/// Masks handed to the labelers must have at least one cell.
pub fn validate_image_size(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(ImgprocError::DimensionMismatch(format!(
            "mask must be non-empty, got {}x{}",
            width, height
        )));
    }
    Ok(())
}
