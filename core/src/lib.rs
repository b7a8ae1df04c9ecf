pub mod frames;
pub mod geometry;
pub mod object;
pub mod point_cloud;

pub use frames::*;
pub use geometry::*;
pub use object::*;
pub use point_cloud::*;

pub use image::{GrayImage, Rgb, RgbImage};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Empty cloud: organized cloud has no cells")]
    EmptyCloud,

    #[error("Scale mismatch: {0}")]
    ScaleMismatch(String),
}
