//! Geometric primitives consumed by the detector.
//!
//! Each primitive sits behind a narrow trait so the merging logic can be
//! exercised against deterministic stubs. [`Capabilities::native`] wires
//! the implementations from the sibling crates.

use crate::{Result, SegmentationError};
use image::{GrayImage, Luma};
use objectness_core::{OrganizedCloud, Rect};
use objectness_imgproc::{
    cross_kernel, erode, label_components, Connectivity, Contour, Labeling,
};
use objectness_point_cloud::{segment_smooth_surfaces, NormalConfig, RegionGrowingConfig};
use std::collections::VecDeque;

/// Partitions an organized cloud into smooth-surface clusters of grid indices.
pub trait SurfaceClusterer: Send + Sync {
    fn cluster(
        &self,
        cloud: &OrganizedCloud,
        normals: &NormalConfig,
        growing: &RegionGrowingConfig,
    ) -> Result<Vec<Vec<usize>>>;
}

/// Connected-component labeling of a binary mask (non-zero is foreground).
pub trait ComponentLabeler: Send + Sync {
    fn label(&self, mask: &GrayImage, connectivity: Connectivity) -> Result<Labeling>;
}

pub trait ContourTracer: Send + Sync {
    /// Every contour of the mask, outer and hole boundaries alike.
    fn find_contours(&self, mask: &GrayImage) -> Result<Vec<Contour>>;

    /// Draw `contour` as a closed polyline.
    fn draw_polyline(&self, mask: &mut GrayImage, contour: &Contour, value: u8, thickness: u32);
}

/// Splits one blob into sub-blobs. The returned labeling has the blob's
/// dimensions; a single component means "no split".
pub trait BlobSubdivider: Send + Sync {
    fn subdivide(&self, blob: &GrayImage) -> Result<Labeling>;
}

/// Finds the four corners of the mask content inside `bounds`, in
/// absolute mask coordinates ordered top-left, top-right, bottom-right,
/// bottom-left.
pub trait CornerFinder: Send + Sync {
    fn find_corners(&self, mask: &GrayImage, bounds: Rect) -> Result<[(u32, u32); 4]>;
}

/// Radius normal estimation followed by smoothness region growing.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegionGrowingClusterer;

impl SurfaceClusterer for RegionGrowingClusterer {
    fn cluster(
        &self,
        cloud: &OrganizedCloud,
        normals: &NormalConfig,
        growing: &RegionGrowingConfig,
    ) -> Result<Vec<Vec<usize>>> {
        Ok(segment_smooth_surfaces(cloud, normals, growing)?)
    }
}

/// Breadth-first flood fill, labels assigned in raster order.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloodFillLabeler;

impl ComponentLabeler for FloodFillLabeler {
    fn label(&self, mask: &GrayImage, connectivity: Connectivity) -> Result<Labeling> {
        Ok(label_components(mask, connectivity)?)
    }
}

/// Moore-neighbour boundary tracing with a round polyline brush.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundaryTracer;

impl ContourTracer for BoundaryTracer {
    fn find_contours(&self, mask: &GrayImage) -> Result<Vec<Contour>> {
        Ok(objectness_imgproc::find_contours(mask))
    }

    fn draw_polyline(&self, mask: &mut GrayImage, contour: &Contour, value: u8, thickness: u32) {
        objectness_imgproc::draw_polyline(mask, contour, value, thickness);
    }
}

/// Never splits: the whole blob is one label.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSubdivision;

impl BlobSubdivider for NoSubdivision {
    fn subdivide(&self, blob: &GrayImage) -> Result<Labeling> {
        single_label(blob)
    }
}

/// Erodes the blob until it falls apart into several sizeable cores, then
/// grows the cores back over the original blob.
///
/// Erosion uses a 3x3 cross and treats pixels outside the blob image as
/// background. After each iteration the eroded blob is labeled with
/// 8-connectivity; once at least two cores of `min_area` pixels or more
/// exist, every blob pixel is assigned to its nearest core by a
/// 4-connected breadth-first search. Blobs that never split come back as
/// a single label.
#[derive(Debug, Clone, Copy)]
pub struct ErosionSubdivider {
    pub iterations: u32,
    pub min_area: u32,
}

impl Default for ErosionSubdivider {
    fn default() -> Self {
        Self {
            iterations: 3,
            min_area: 10,
        }
    }
}

impl BlobSubdivider for ErosionSubdivider {
    fn subdivide(&self, blob: &GrayImage) -> Result<Labeling> {
        let kernel = cross_kernel(3, 3);
        let mut eroded = blob.clone();
        for _ in 0..self.iterations {
            eroded = erode(&eroded, &kernel, 1);
            let cores = label_components(&eroded, Connectivity::Eight)?;
            if cores.component_count() == 0 {
                break;
            }
            let kept: Vec<u32> = cores
                .stats
                .iter()
                .filter(|s| s.area >= self.min_area)
                .map(|s| s.label)
                .collect();
            if kept.len() >= 2 {
                return grow_cores(blob, &cores, &kept);
            }
        }
        single_label(blob)
    }
}

fn single_label(blob: &GrayImage) -> Result<Labeling> {
    let labels: Vec<u32> = blob.as_raw().iter().map(|&v| u32::from(v > 0)).collect();
    let count = u32::from(labels.iter().any(|&l| l > 0));
    Ok(Labeling::from_labels(blob.width(), blob.height(), labels, count)?)
}

fn grow_cores(blob: &GrayImage, cores: &Labeling, kept: &[u32]) -> Result<Labeling> {
    let w = blob.width() as usize;
    let h = blob.height() as usize;
    let data = blob.as_raw();
    let mut labels = vec![0u32; w * h];
    let mut queue = VecDeque::new();

    for (new_label, &core) in kept.iter().enumerate() {
        for (i, &l) in cores.labels.iter().enumerate() {
            if l == core {
                labels[i] = new_label as u32 + 1;
                queue.push_back(i);
            }
        }
    }

    while let Some(i) = queue.pop_front() {
        let (x, y) = (i % w, i / w);
        let neighbours = [
            (x > 0).then(|| i - 1),
            (x + 1 < w).then(|| i + 1),
            (y > 0).then(|| i - w),
            (y + 1 < h).then(|| i + w),
        ];
        for n in neighbours.into_iter().flatten() {
            if data[n] > 0 && labels[n] == 0 {
                labels[n] = labels[i];
                queue.push_back(n);
            }
        }
    }

    Ok(Labeling::from_labels(
        blob.width(),
        blob.height(),
        labels,
        kept.len() as u32,
    )?)
}

/// Picks, for each corner of the bounding box, the closest mask pixel
/// inside the box. Ties go to the first pixel in raster order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtremeCornerFinder;

impl CornerFinder for ExtremeCornerFinder {
    fn find_corners(&self, mask: &GrayImage, bounds: Rect) -> Result<[(u32, u32); 4]> {
        if bounds.is_empty() || bounds.right() > mask.width() || bounds.bottom() > mask.height() {
            return Err(SegmentationError::ZeroSizeMask(format!(
                "corner search box {:?} does not fit a {}x{} mask",
                bounds,
                mask.width(),
                mask.height()
            )));
        }

        let (x0, y0) = (bounds.x, bounds.y);
        let (x1, y1) = (bounds.right() - 1, bounds.bottom() - 1);
        let targets = [(x0, y0), (x1, y0), (x1, y1), (x0, y1)];
        let mut best: [Option<((u32, u32), u64)>; 4] = [None; 4];

        for y in y0..=y1 {
            for x in x0..=x1 {
                if mask.get_pixel(x, y)[0] == 0 {
                    continue;
                }
                for (slot, &(tx, ty)) in best.iter_mut().zip(targets.iter()) {
                    let dx = x.abs_diff(tx) as u64;
                    let dy = y.abs_diff(ty) as u64;
                    let d = dx * dx + dy * dy;
                    if slot.map_or(true, |(_, bd)| d < bd) {
                        *slot = Some(((x, y), d));
                    }
                }
            }
        }

        match best {
            [Some(tl), Some(tr), Some(br), Some(bl)] => Ok([tl.0, tr.0, br.0, bl.0]),
            _ => Err(SegmentationError::ZeroSizeMask(format!(
                "no foreground inside {:?}",
                bounds
            ))),
        }
    }
}

/// The set of primitives a detector runs on.
pub struct Capabilities {
    pub clusterer: Box<dyn SurfaceClusterer>,
    pub labeler: Box<dyn ComponentLabeler>,
    pub tracer: Box<dyn ContourTracer>,
    pub subdivider: Box<dyn BlobSubdivider>,
    pub corner_finder: Box<dyn CornerFinder>,
}

impl Capabilities {
    pub fn native() -> Self {
        Self {
            clusterer: Box::new(RegionGrowingClusterer),
            labeler: Box::new(FloodFillLabeler),
            tracer: Box::new(BoundaryTracer),
            subdivider: Box::new(ErosionSubdivider::default()),
            corner_finder: Box::new(ExtremeCornerFinder),
        }
    }

    pub fn with_clusterer(mut self, clusterer: impl SurfaceClusterer + 'static) -> Self {
        self.clusterer = Box::new(clusterer);
        self
    }

    pub fn with_labeler(mut self, labeler: impl ComponentLabeler + 'static) -> Self {
        self.labeler = Box::new(labeler);
        self
    }

    pub fn with_tracer(mut self, tracer: impl ContourTracer + 'static) -> Self {
        self.tracer = Box::new(tracer);
        self
    }

    pub fn with_subdivider(mut self, subdivider: impl BlobSubdivider + 'static) -> Self {
        self.subdivider = Box::new(subdivider);
        self
    }

    pub fn with_corner_finder(mut self, corner_finder: impl CornerFinder + 'static) -> Self {
        self.corner_finder = Box::new(corner_finder);
        self
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::native()
    }
}

/// Reject a labeling returned by a capability unless it fits `mask`.
pub(crate) fn checked_labeling(labeling: Labeling, mask: &GrayImage, source: &str) -> Result<Labeling> {
    labeling
        .validate(mask.width(), mask.height())
        .map_err(|e| SegmentationError::Capability(format!("{} output: {}", source, e)))?;
    Ok(labeling)
}

/// Binary mask (255 foreground) of the given cells.
pub(crate) fn mask_from_indices(width: u32, height: u32, indices: &[usize]) -> GrayImage {
    let mut mask = GrayImage::new(width, height);
    for &i in indices {
        let (x, y) = ((i % width as usize) as u32, (i / width as usize) as u32);
        mask.put_pixel(x, y, Luma([255]));
    }
    mask
}
