use crate::capabilities::{checked_labeling, Capabilities};
use crate::config::EdgeSplitConfig;
use crate::Result;
use image::GrayImage;
use objectness_core::{ObjectArea, Rect};
use objectness_imgproc::Connectivity;

/// Objects recovered from the outmost region.
#[derive(Debug, Clone)]
pub struct EdgeSplit {
    pub objects: Vec<ObjectArea>,
    /// The outmost mask after contour suppression.
    pub suppressed: GrayImage,
    pub components: usize,
}

/// Cut the outmost region along its own contours and recover the objects
/// merged into it.
///
/// Every contour is redrawn in background with a `suppress_margin` thick
/// brush, which severs thin bridges. The result is relabeled with
/// 4-connectivity. Components with a bounding box under
/// `lower_noise_area` cells are dropped, and so are components larger
/// than `upper_noise_area` cells whose vertical center lies in the upper
/// half of the grid. Each survivor is handed to the blob subdivider and
/// emitted whole or as its sub-blobs.
pub fn split_outmost(
    outmost: &GrayImage,
    caps: &Capabilities,
    config: &EdgeSplitConfig,
    scale: (u32, u32),
) -> Result<EdgeSplit> {
    let contours = caps.tracer.find_contours(outmost)?;
    let mut suppressed = outmost.clone();
    for contour in &contours {
        caps.tracer
            .draw_polyline(&mut suppressed, contour, 0, config.suppress_margin);
    }

    let labeling = checked_labeling(
        caps.labeler.label(&suppressed, Connectivity::Four)?,
        &suppressed,
        "labeler",
    )?;
    let (grid_width, grid_height) = (outmost.width(), outmost.height());
    let upper_limit = 0.5 * grid_height as f64 + 1.0;

    let mut objects = Vec::new();
    for stats in &labeling.stats {
        let rect = stats.rect();
        if rect.area() < config.lower_noise_area {
            continue;
        }
        if rect.center_y() <= upper_limit && stats.area > config.upper_noise_area {
            tracing::trace!("dropping background bleed at {:?}", rect);
            continue;
        }

        let blob = labeling.crop_mask(stats.label, rect);
        let parts = checked_labeling(caps.subdivider.subdivide(&blob)?, &blob, "subdivider")?;

        if parts.component_count() <= 1 {
            let indices = labeling.indices_of(stats.label, rect);
            if !indices.is_empty() {
                objects.push(ObjectArea::residual(indices, rect.scale(scale.0, scale.1)));
            }
            continue;
        }

        for part in &parts.stats {
            let sub = part.rect();
            let indices = to_grid_indices(
                &parts.indices_of(part.label, sub),
                blob.width(),
                rect,
                grid_width,
            );
            if indices.is_empty() {
                continue;
            }
            let bounds = sub.translate(rect.x, rect.y).scale(scale.0, scale.1);
            objects.push(ObjectArea::residual(indices, bounds));
        }
    }

    Ok(EdgeSplit {
        objects,
        suppressed,
        components: labeling.component_count(),
    })
}

/// Map blob-local row-major indices to grid indices.
fn to_grid_indices(local: &[usize], blob_width: u32, origin: Rect, grid_width: u32) -> Vec<usize> {
    let bw = blob_width as usize;
    let gw = grid_width as usize;
    let mut indices: Vec<usize> = local
        .iter()
        .map(|&i| {
            let (x, y) = (i % bw, i / bw);
            (origin.y as usize + y) * gw + origin.x as usize + x
        })
        .collect();
    indices.sort_unstable();
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{BlobSubdivider, NoSubdivision};
    use image::Luma;
    use objectness_imgproc::Labeling;

    /// Splits every blob into its left and right halves.
    struct HalvesSubdivider;

    impl BlobSubdivider for HalvesSubdivider {
        fn subdivide(&self, blob: &GrayImage) -> Result<Labeling> {
            let half = blob.width() / 2;
            let labels = blob
                .enumerate_pixels()
                .map(|(x, _, p)| match (p[0] > 0, x < half) {
                    (false, _) => 0,
                    (true, true) => 1,
                    (true, false) => 2,
                })
                .collect();
            Ok(Labeling::from_labels(blob.width(), blob.height(), labels, 2)?)
        }
    }

    fn fill(mask: &mut GrayImage, rect: Rect) {
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
    }

    fn no_split() -> Capabilities {
        Capabilities::native().with_subdivider(NoSubdivision)
    }

    #[test]
    fn suppression_severs_thin_bridge() {
        let mut mask = GrayImage::new(60, 40);
        fill(&mut mask, Rect::new(10, 20, 16, 16));
        fill(&mut mask, Rect::new(34, 20, 16, 16));
        fill(&mut mask, Rect::new(26, 27, 8, 2));

        let split = split_outmost(&mask, &no_split(), &EdgeSplitConfig::default(), (1, 1)).unwrap();
        assert_eq!(split.components, 2);
        assert_eq!(split.objects.len(), 2);
        assert_eq!(split.suppressed.get_pixel(30, 27)[0], 0);
        // The cells beside each bridge end sit sqrt(10) from the nearest
        // contour point and survive the radius 3 brush.
        assert_eq!(split.objects[0].bounds2d, Rect::new(14, 24, 9, 8));
        assert_eq!(split.objects[1].bounds2d, Rect::new(37, 24, 9, 8));
        assert_eq!(split.suppressed.get_pixel(22, 27)[0], 255);
        assert_eq!(split.suppressed.get_pixel(22, 26)[0], 0);
        assert_eq!(split.objects[0].indices.len(), 8 * 8 + 2);
        assert_eq!(split.objects[1].indices.len(), 8 * 8 + 2);
        assert!(split.objects.iter().all(|o| !o.visible3d));
    }

    #[test]
    fn large_upper_component_is_background() {
        let mut upper = GrayImage::new(60, 40);
        fill(&mut upper, Rect::new(10, 0, 40, 24));
        let split =
            split_outmost(&upper, &no_split(), &EdgeSplitConfig::default(), (1, 1)).unwrap();
        assert_eq!(split.components, 1);
        assert!(split.objects.is_empty());

        let mut lower = GrayImage::new(60, 40);
        fill(&mut lower, Rect::new(10, 16, 40, 24));
        let split =
            split_outmost(&lower, &no_split(), &EdgeSplitConfig::default(), (2, 2)).unwrap();
        assert_eq!(split.objects.len(), 1);
        assert_eq!(split.objects[0].bounds2d, Rect::new(28, 40, 64, 32));
        assert_eq!(split.objects[0].indices.len(), 32 * 16);
    }

    #[test]
    fn small_components_are_noise() {
        let mut mask = GrayImage::new(60, 40);
        fill(&mut mask, Rect::new(20, 20, 10, 10));
        let split = split_outmost(&mask, &no_split(), &EdgeSplitConfig::default(), (1, 1)).unwrap();
        assert_eq!(split.components, 1);
        assert!(split.objects.is_empty());
    }

    #[test]
    fn subdivided_parts_are_offset_by_the_component_origin() {
        let mut mask = GrayImage::new(60, 40);
        fill(&mut mask, Rect::new(10, 16, 40, 24));
        let caps = Capabilities::native().with_subdivider(HalvesSubdivider);

        let split = split_outmost(&mask, &caps, &EdgeSplitConfig::default(), (1, 1)).unwrap();
        assert_eq!(split.objects.len(), 2);
        assert_eq!(split.objects[0].bounds2d, Rect::new(14, 20, 16, 16));
        assert_eq!(split.objects[1].bounds2d, Rect::new(30, 20, 16, 16));
        assert_eq!(split.objects[0].indices.len(), 256);
        assert_eq!(split.objects[0].indices[0], 20 * 60 + 14);
        assert_eq!(split.objects[1].indices[0], 20 * 60 + 30);
    }

    #[test]
    fn lower_noise_threshold_keeps_exact_area() {
        // 14x13 shrinks to 6x5 = 30 cells once the contour is suppressed.
        let mut mask = GrayImage::new(60, 40);
        fill(&mut mask, Rect::new(20, 20, 14, 13));
        let split = split_outmost(&mask, &no_split(), &EdgeSplitConfig::default(), (1, 1)).unwrap();
        assert_eq!(split.objects.len(), 1);
        assert_eq!(split.objects[0].bounds2d, Rect::new(24, 24, 6, 5));
    }

    #[test]
    fn upper_component_of_exact_limit_is_kept() {
        // 28x23 shrinks to 20x15 = 300 cells, centered well above mid-height.
        let mut mask = GrayImage::new(60, 40);
        fill(&mut mask, Rect::new(10, 0, 28, 23));
        let split = split_outmost(&mask, &no_split(), &EdgeSplitConfig::default(), (1, 1)).unwrap();
        assert_eq!(split.objects.len(), 1);
        assert_eq!(split.objects[0].bounds2d, Rect::new(14, 4, 20, 15));
        assert_eq!(split.objects[0].indices.len(), 300);
    }

    /// Returns labels for a grid one column narrower than the blob.
    struct NarrowSubdivider;

    impl BlobSubdivider for NarrowSubdivider {
        fn subdivide(&self, blob: &GrayImage) -> Result<Labeling> {
            let width = blob.width() - 1;
            let labels = vec![1; (width * blob.height()) as usize];
            Ok(Labeling::from_labels(width, blob.height(), labels, 1)?)
        }
    }

    #[test]
    fn mismatched_subdivision_is_a_capability_error() {
        let mut mask = GrayImage::new(60, 40);
        fill(&mut mask, Rect::new(10, 16, 40, 24));
        let caps = Capabilities::native().with_subdivider(NarrowSubdivider);
        let result = split_outmost(&mask, &caps, &EdgeSplitConfig::default(), (1, 1));
        assert!(matches!(result, Err(crate::SegmentationError::Capability(_))));
    }
}
