use crate::capabilities::{mask_from_indices, CornerFinder};
use crate::{Result, SegmentationError};
use nalgebra::{Point2, Point3};
use objectness_core::{OrganizedCloud, Rect};

/// 2-D outline and physical extents of one surface cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeDescriptor {
    /// Bounds in image resolution.
    pub bounds2d: Rect,
    /// Top-left, top-right, bottom-right, bottom-left in image resolution.
    pub corners2d: [Point2<f32>; 4],
    pub width3d: f32,
    pub height3d: f32,
}

/// Measure a cluster: grid bounding box, the four mask corners and the 3-D
/// distances between the top corners and between the bottom corners.
///
/// An empty cluster is an error. A corner that lands on a cell without a
/// finite position yields `Ok(None)` and the caller drops the object.
pub fn describe_shape(
    cloud: &OrganizedCloud,
    indices: &[usize],
    corner_finder: &dyn CornerFinder,
    scale: (u32, u32),
) -> Result<Option<ShapeDescriptor>> {
    let bounds = Rect::enclosing(indices.iter().map(|&i| cloud.coords(i))).ok_or_else(|| {
        SegmentationError::ZeroSizeMask("surface cluster has no cells".into())
    })?;
    let mask = mask_from_indices(cloud.width, cloud.height, indices);
    let corners = corner_finder.find_corners(&mask, bounds)?;

    let mut points = [Point3::origin(); 4];
    for (slot, &(x, y)) in points.iter_mut().zip(corners.iter()) {
        match cloud.point(x, y) {
            Some(p) => *slot = p,
            None => {
                tracing::warn!("corner ({}, {}) of {:?} has no valid 3-D point", x, y, bounds);
                return Ok(None);
            }
        }
    }
    let [tl, tr, br, bl] = points;
    let width3d = (tr - tl).norm();
    let height3d = (br - bl).norm();

    let (sx, sy) = scale;
    let corners2d = corners.map(|(x, y)| Point2::new((x * sx) as f32, (y * sy) as f32));

    Ok(Some(ShapeDescriptor {
        bounds2d: bounds.scale(sx, sy),
        corners2d,
        width3d,
        height3d,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::ExtremeCornerFinder;
    use image::Rgb;

    /// Plane at z = 1 with 1 cm cells.
    fn plane(width: u32, height: u32) -> OrganizedCloud {
        OrganizedCloud::from_fn(width, height, |x, y| {
            (
                Point3::new(x as f32 * 0.01, y as f32 * 0.01, 1.0),
                Rgb([0, 0, 0]),
            )
        })
    }

    fn block(cloud: &OrganizedCloud, rect: Rect) -> Vec<usize> {
        (0..cloud.len())
            .filter(|&i| {
                let (x, y) = cloud.coords(i);
                rect.contains(x, y)
            })
            .collect()
    }

    #[test]
    fn measures_rectangular_cluster() {
        let cloud = plane(40, 30);
        let indices = block(&cloud, Rect::new(5, 4, 21, 11));
        let shape = describe_shape(&cloud, &indices, &ExtremeCornerFinder, (2, 2))
            .unwrap()
            .unwrap();

        assert_eq!(shape.bounds2d, Rect::new(10, 8, 42, 22));
        assert_eq!(shape.corners2d[0], Point2::new(10.0, 8.0));
        assert_eq!(shape.corners2d[2], Point2::new(50.0, 28.0));
        assert!((shape.width3d - 0.20).abs() < 1e-5);
        assert!((shape.height3d - 0.20).abs() < 1e-5);
    }

    #[test]
    fn invalid_corner_drops_the_object() {
        let mut cloud = plane(20, 20);
        let corner = cloud.index(2, 2);
        cloud.points[corner] = Point3::new(f32::NAN, f32::NAN, f32::NAN);
        let indices = block(&cloud, Rect::new(2, 2, 10, 10));
        assert_eq!(
            describe_shape(&cloud, &indices, &ExtremeCornerFinder, (1, 1)).unwrap(),
            None
        );
    }

    #[test]
    fn empty_cluster_is_an_error() {
        let cloud = plane(10, 10);
        assert!(matches!(
            describe_shape(&cloud, &[], &ExtremeCornerFinder, (1, 1)),
            Err(SegmentationError::ZeroSizeMask(_))
        ));
    }
}
