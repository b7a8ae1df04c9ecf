use crate::geometry::Rect;
use nalgebra::{Point2, Point3};
use std::collections::BTreeMap;

/// One candidate object extracted from a sensor frame.
///
/// Objects backed by a surface cluster (`visible3d == true`) carry the
/// 3-D centroid, corner points, physical extents and colour names. Objects
/// recovered from the 2-D residual path only have indices and bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectArea {
    /// Row-major cloud-grid cell indices, never empty.
    pub indices: Vec<usize>,
    pub visible3d: bool,
    /// Bounds in image resolution.
    pub bounds2d: Rect,
    /// Top-left, top-right, bottom-right, bottom-left in image resolution.
    pub corners2d: Option<[Point2<f32>; 4]>,
    pub center3d: Option<Point3<f32>>,
    /// Metres.
    pub width3d: Option<f32>,
    /// Metres.
    pub height3d: Option<f32>,
    /// Colour name to share of the object's colour support.
    pub colors: BTreeMap<String, f32>,
}

impl ObjectArea {
    /// An object recovered purely from 2-D residual analysis.
    pub fn residual(indices: Vec<usize>, bounds2d: Rect) -> Self {
        Self {
            indices,
            visible3d: false,
            bounds2d,
            corners2d: None,
            center3d: None,
            width3d: None,
            height3d: None,
            colors: BTreeMap::new(),
        }
    }

    /// Dominant colour name, if any colour support was found.
    pub fn dominant_color(&self) -> Option<(&str, f32)> {
        self.colors
            .iter()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(name, &s)| (name.as_str(), s))
    }
}
