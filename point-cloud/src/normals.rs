use crate::search::CloudIndex;
use crate::{NormalConfig, PointCloudError, Result};
use nalgebra::{Matrix3, Point3, SymmetricEigen, Vector3};
use objectness_core::OrganizedCloud;
use rayon::prelude::*;

/// Per-cell surface normals and curvature. Cells without enough support
/// (missing position or fewer than three neighbours) hold NaN.
#[derive(Debug, Clone)]
pub struct SurfaceNormals {
    pub normals: Vec<Vector3<f32>>,
    pub curvature: Vec<f32>,
}

impl SurfaceNormals {
    pub fn len(&self) -> usize {
        self.normals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.normals.is_empty()
    }

    #[inline]
    pub fn is_valid(&self, index: usize) -> bool {
        self.curvature.get(index).map(|c| c.is_finite()).unwrap_or(false)
    }
}

fn nan_normal() -> (Vector3<f32>, f32) {
    (Vector3::new(f32::NAN, f32::NAN, f32::NAN), f32::NAN)
}

/// Normal and surface variation (smallest eigenvalue over eigenvalue sum)
/// of a neighbourhood, normal flipped towards the sensor origin.
fn fit_normal(cloud: &OrganizedCloud, center: &Point3<f32>, neighbours: &[usize]) -> (Vector3<f32>, f32) {
    if neighbours.len() < 3 {
        return nan_normal();
    }

    // Accumulate in f64; f32 covariances of flat patches lose the smallest axis.
    let mut centroid = Vector3::<f64>::zeros();
    for &n in neighbours {
        centroid += cloud.points[n].coords.cast::<f64>();
    }
    centroid /= neighbours.len() as f64;

    let mut cov = Matrix3::<f64>::zeros();
    for &n in neighbours {
        let d = cloud.points[n].coords.cast::<f64>() - centroid;
        cov += d * d.transpose();
    }
    cov /= neighbours.len() as f64;

    let eigen = SymmetricEigen::new(cov);
    let (min_idx, min_val) = eigen
        .eigenvalues
        .iter()
        .copied()
        .enumerate()
        .fold((0, f64::MAX), |best, (i, v)| if v < best.1 { (i, v) } else { best });

    let sum: f64 = eigen.eigenvalues.iter().sum();
    let curvature = if sum.abs() > f64::EPSILON {
        (min_val / sum).abs() as f32
    } else {
        0.0
    };

    let mut normal: Vector3<f32> = eigen.eigenvectors.column(min_idx).into_owned().cast::<f32>();
    if normal.dot(&(-center.coords)) < 0.0 {
        normal = -normal;
    }
    (normal, curvature)
}

/// Estimate normals with a fixed-radius neighbourhood around every valid
/// cell. Per-point fits run in parallel; output order is the grid order.
pub fn estimate_normals_radius(cloud: &OrganizedCloud, config: &NormalConfig) -> Result<SurfaceNormals> {
    config.validate()?;
    if cloud.is_empty() {
        return Err(PointCloudError::EmptyCloud);
    }

    let index = CloudIndex::build(cloud);
    estimate_normals_with_index(cloud, &index, config)
}

pub(crate) fn estimate_normals_with_index(
    cloud: &OrganizedCloud,
    index: &CloudIndex,
    config: &NormalConfig,
) -> Result<SurfaceNormals> {
    let fits: Vec<(Vector3<f32>, f32)> = (0..cloud.len())
        .into_par_iter()
        .map(|i| {
            if !cloud.is_valid(i) {
                return nan_normal();
            }
            let p = cloud.points[i];
            let neighbours = index.within_radius(&p, config.search_radius);
            fit_normal(cloud, &p, &neighbours)
        })
        .collect();

    let (normals, curvature) = fits.into_iter().unzip();
    Ok(SurfaceNormals { normals, curvature })
}
