use crate::normals::{estimate_normals_with_index, SurfaceNormals};
use crate::search::CloudIndex;
use crate::{NormalConfig, PointCloudError, RegionGrowingConfig, Result};
use objectness_core::OrganizedCloud;
use std::collections::VecDeque;

/// Partition the cloud into smooth-surface clusters.
///
/// Seeds are visited in ascending curvature order. A region absorbs each
/// of the `num_neighbours` nearest points of a seed whose normal deviates
/// from the seed's by less than the smoothness threshold; absorbed points
/// with curvature below the curvature threshold become seeds themselves.
/// Regions outside `[min_cluster_size, max_cluster_size]` are dropped and
/// their points stay unassigned. Each cluster lists grid indices in
/// ascending order; clusters are returned in seed order.
pub fn region_growing(
    cloud: &OrganizedCloud,
    normals: &SurfaceNormals,
    config: &RegionGrowingConfig,
) -> Result<Vec<Vec<usize>>> {
    let index = CloudIndex::build(cloud);
    region_growing_with_index(cloud, &index, normals, config)
}

/// Estimate normals and grow regions over a single shared spatial index.
pub fn segment_smooth_surfaces(
    cloud: &OrganizedCloud,
    normal_config: &NormalConfig,
    config: &RegionGrowingConfig,
) -> Result<Vec<Vec<usize>>> {
    normal_config.validate()?;
    if cloud.is_empty() {
        return Err(PointCloudError::EmptyCloud);
    }
    let index = CloudIndex::build(cloud);
    tracing::debug!("indexed {} of {} cells", index.len(), cloud.len());
    let normals = estimate_normals_with_index(cloud, &index, normal_config)?;
    region_growing_with_index(cloud, &index, &normals, config)
}

fn region_growing_with_index(
    cloud: &OrganizedCloud,
    index: &CloudIndex,
    normals: &SurfaceNormals,
    config: &RegionGrowingConfig,
) -> Result<Vec<Vec<usize>>> {
    config.validate()?;
    if normals.len() != cloud.len() {
        return Err(PointCloudError::DimensionMismatch(format!(
            "{} normals for {} points",
            normals.len(),
            cloud.len()
        )));
    }

    let usable = |i: usize| cloud.is_valid(i) && normals.is_valid(i);

    let mut order: Vec<usize> = (0..cloud.len()).filter(|&i| usable(i)).collect();
    order.sort_by(|&a, &b| {
        normals.curvature[a]
            .partial_cmp(&normals.curvature[b])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });

    let cos_threshold = config.smoothness_threshold.cos();
    let mut assigned = vec![false; cloud.len()];
    let mut clusters = Vec::new();
    let mut rejected = 0usize;

    for &seed in &order {
        if assigned[seed] {
            continue;
        }

        assigned[seed] = true;
        let mut members = vec![seed];
        let mut queue = VecDeque::from([seed]);

        while let Some(current) = queue.pop_front() {
            let n_cur = normals.normals[current];
            // The query point itself is always the closest result.
            for nb in index.nearest(&cloud.points[current], config.num_neighbours + 1) {
                if assigned[nb] || !usable(nb) {
                    continue;
                }
                if n_cur.dot(&normals.normals[nb]).abs() < cos_threshold {
                    continue;
                }
                assigned[nb] = true;
                members.push(nb);
                if normals.curvature[nb] < config.curvature_threshold {
                    queue.push_back(nb);
                }
            }
        }

        if members.len() >= config.min_cluster_size && members.len() <= config.max_cluster_size {
            members.sort_unstable();
            clusters.push(members);
        } else {
            rejected += 1;
        }
    }

    tracing::trace!(
        clusters = clusters.len(),
        rejected,
        "region growing finished"
    );
    Ok(clusters)
}
