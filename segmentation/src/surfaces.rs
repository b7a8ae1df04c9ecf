use crate::config::PlausibilityConfig;
use nalgebra::Point3;
use objectness_core::OrganizedCloud;

/// A surface cluster that passed the reachability check.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceCluster {
    pub indices: Vec<usize>,
    pub centroid: Point3<f32>,
}

/// Keep the clusters whose centroid lies within reach of the sensor.
///
/// The centroid is the mean of the member cells with finite coordinates.
/// Clusters without any such cell are rejected as well. Rejected clusters
/// simply drop out, so their cells stay unassigned for the residual path.
pub fn filter_plausible(
    cloud: &OrganizedCloud,
    clusters: Vec<Vec<usize>>,
    config: &PlausibilityConfig,
) -> Vec<SurfaceCluster> {
    clusters
        .into_iter()
        .filter_map(|indices| {
            let centroid = cloud.centroid(&indices)?;
            let distance = centroid.coords.norm();
            if distance > config.max_centroid_distance {
                tracing::trace!(
                    "rejecting cluster of {} cells at {:.3} m",
                    indices.len(),
                    distance
                );
                return None;
            }
            Some(SurfaceCluster { indices, centroid })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn depth_cloud() -> OrganizedCloud {
        // Left half at 0.8 m, right half at 2.0 m.
        OrganizedCloud::from_fn(10, 4, |x, _| {
            let z = if x < 5 { 0.8 } else { 2.0 };
            (Point3::new(0.0, 0.0, z), Rgb([0, 0, 0]))
        })
    }

    fn half(cloud: &OrganizedCloud, left: bool) -> Vec<usize> {
        (0..cloud.len())
            .filter(|&i| (cloud.coords(i).0 < 5) == left)
            .collect()
    }

    #[test]
    fn drops_far_clusters() {
        let cloud = depth_cloud();
        let clusters = vec![half(&cloud, false), half(&cloud, true)];
        let kept = filter_plausible(&cloud, clusters, &PlausibilityConfig::default());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].indices, half(&cloud, true));
        assert!((kept[0].centroid.z - 0.8).abs() < 1e-6);
    }

    #[test]
    fn threshold_is_configurable() {
        let cloud = depth_cloud();
        let clusters = vec![half(&cloud, true), half(&cloud, false)];
        let config = PlausibilityConfig {
            max_centroid_distance: 3.0,
        };
        assert_eq!(filter_plausible(&cloud, clusters, &config).len(), 2);
    }

    #[test]
    fn invalid_cells_do_not_count() {
        let cloud = OrganizedCloud::from_fn(4, 1, |x, _| {
            let p = if x == 0 {
                Point3::new(f32::NAN, 0.0, 0.0)
            } else {
                Point3::new(0.0, 0.0, 0.5)
            };
            (p, Rgb([0, 0, 0]))
        });
        let kept = filter_plausible(
            &cloud,
            vec![vec![0, 1, 2, 3], vec![0]],
            &PlausibilityConfig::default(),
        );
        assert_eq!(kept.len(), 1);
        assert!((kept[0].centroid.z - 0.5).abs() < 1e-6);
    }
}
