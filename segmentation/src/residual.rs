use crate::capabilities::{checked_labeling, ComponentLabeler};
use crate::config::ResidualConfig;
use crate::surfaces::SurfaceCluster;
use crate::Result;
use image::{GrayImage, Luma};
use objectness_core::ObjectArea;
use objectness_imgproc::Connectivity;

/// Outcome of labeling the cells no accepted surface claimed.
#[derive(Debug, Clone)]
pub struct ResidualAnalysis {
    /// Regions away from the grid border, in label order.
    pub interior: Vec<ObjectArea>,
    /// Mask of the largest border-touching region, if any.
    pub outmost: Option<GrayImage>,
    pub regions: usize,
}

/// Grid mask with 255 on every cell not covered by `clusters`.
pub fn unassigned_mask(width: u32, height: u32, clusters: &[SurfaceCluster]) -> GrayImage {
    let mut mask = GrayImage::from_pixel(width, height, Luma([255]));
    let w = width as usize;
    for cluster in clusters {
        for &i in &cluster.indices {
            mask.put_pixel((i % w) as u32, (i / w) as u32, Luma([0]));
        }
    }
    mask
}

/// Label the unassigned mask with 8-connectivity and sort its regions.
///
/// Regions whose bounding box covers fewer than `noise_area` cells are
/// noise. Regions reaching the first or last row or column are never
/// emitted; only the one with the most cells is kept as the outmost
/// region (first seen wins ties). Everything else becomes a 2-D object
/// with bounds scaled to image resolution.
pub fn analyze_residual(
    mask: &GrayImage,
    labeler: &dyn ComponentLabeler,
    config: &ResidualConfig,
    scale: (u32, u32),
) -> Result<ResidualAnalysis> {
    let labeling = checked_labeling(labeler.label(mask, Connectivity::Eight)?, mask, "labeler")?;
    let (w, h) = (mask.width(), mask.height());

    let mut interior = Vec::new();
    let mut outmost: Option<(u32, u32)> = None;

    for stats in &labeling.stats {
        let rect = stats.rect();
        if rect.area() < config.noise_area {
            continue;
        }
        if rect.touches_border(w, h) {
            if stats.area > outmost.map_or(0, |(_, area)| area) {
                outmost = Some((stats.label, stats.area));
            }
            continue;
        }
        let indices = labeling.indices_of(stats.label, rect);
        if indices.is_empty() {
            continue;
        }
        interior.push(ObjectArea::residual(indices, rect.scale(scale.0, scale.1)));
    }

    Ok(ResidualAnalysis {
        interior,
        outmost: outmost.map(|(label, _)| labeling.mask_of(label)),
        regions: labeling.component_count(),
    })
}
