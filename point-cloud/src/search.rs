use nalgebra::Point3;
use objectness_core::OrganizedCloud;
use rstar::{PointDistance, RTree, RTreeObject, AABB};

// Wrapper for RTree: grid index plus position.
struct PointWrapper(usize, Point3<f32>);

impl RTreeObject for PointWrapper {
    type Envelope = AABB<[f32; 3]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.1.x, self.1.y, self.1.z])
    }
}

impl PointDistance for PointWrapper {
    fn distance_2(&self, point: &[f32; 3]) -> f32 {
        let dx = self.1.x - point[0];
        let dy = self.1.y - point[1];
        let dz = self.1.z - point[2];
        dx * dx + dy * dy + dz * dz
    }
}

/// Spatial index over the valid cells of an organized cloud. Missing
/// cells are never returned by queries.
pub struct CloudIndex {
    tree: RTree<PointWrapper>,
}

impl CloudIndex {
    pub fn build(cloud: &OrganizedCloud) -> Self {
        let wrappers: Vec<PointWrapper> = cloud
            .points
            .iter()
            .enumerate()
            .filter(|(i, _)| cloud.is_valid(*i))
            .map(|(i, p)| PointWrapper(i, *p))
            .collect();
        Self {
            tree: RTree::bulk_load(wrappers),
        }
    }

    /// Number of indexed (valid) cells.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Grid indices of all points within `radius` of `p`, sorted ascending.
    pub fn within_radius(&self, p: &Point3<f32>, radius: f32) -> Vec<usize> {
        let mut out: Vec<usize> = self
            .tree
            .locate_within_distance([p.x, p.y, p.z], radius * radius)
            .map(|w| w.0)
            .collect();
        out.sort_unstable();
        out
    }

    /// Grid indices of the `k` nearest points to `p`, closest first.
    pub fn nearest(&self, p: &Point3<f32>, k: usize) -> Vec<usize> {
        self.tree
            .nearest_neighbor_iter(&[p.x, p.y, p.z])
            .take(k)
            .map(|w| w.0)
            .collect()
    }
}
