use crate::capabilities::Capabilities;
use crate::config::SegmentationConfig;
use crate::debug::{annotate, DebugViews};
use crate::edge_split::split_outmost;
use crate::environment::{classify_colors, gather_colors, ColorVerdict};
use crate::residual::{analyze_residual, unassigned_mask};
use crate::shape::describe_shape;
use crate::surfaces::{filter_plausible, SurfaceCluster};
use crate::{Result, SegmentationError};
use image::Rgb;
use objectness_core::{ObjectArea, SensorFrame};
use std::collections::BTreeMap;
use std::time::Instant;

/// Objects found in one frame.
#[derive(Debug, Clone)]
pub struct Detection {
    /// Surface objects in cluster order, then the objects split from the
    /// outmost region, then interior residual regions.
    pub objects: Vec<ObjectArea>,
    pub debug: Option<DebugViews>,
}

impl Detection {
    pub fn surface_objects(&self) -> impl Iterator<Item = &ObjectArea> {
        self.objects.iter().filter(|o| o.visible3d)
    }

    pub fn residual_objects(&self) -> impl Iterator<Item = &ObjectArea> {
        self.objects.iter().filter(|o| !o.visible3d)
    }
}

/// Segments sensor frames into candidate objects.
///
/// The detector holds only its configuration and capabilities; every call
/// to [`detect`](Self::detect) allocates its own masks, so one detector
/// can serve several threads.
pub struct ObjectnessDetector {
    config: SegmentationConfig,
    capabilities: Capabilities,
}

impl ObjectnessDetector {
    pub fn new(config: SegmentationConfig) -> Result<Self> {
        Self::with_capabilities(config, Capabilities::native())
    }

    pub fn with_capabilities(config: SegmentationConfig, capabilities: Capabilities) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            capabilities,
        })
    }

    pub fn config(&self) -> &SegmentationConfig {
        &self.config
    }

    /// Run the full pipeline on one frame.
    ///
    /// `environment` is the colour of the scene background (table, floor)
    /// whose surfaces should not be reported. With `debug` set, the
    /// intermediate masks and an annotated image are returned alongside;
    /// the objects are the same either way.
    pub fn detect(&self, frame: &SensorFrame, environment: Rgb<u8>, debug: bool) -> Result<Detection> {
        let start = Instant::now();
        let scale = frame.scale_factors()?;
        let cloud = &frame.cloud;
        let caps = &self.capabilities;
        let config = &self.config;

        let clusters = caps
            .clusterer
            .cluster(cloud, &config.normals, &config.region_growing)?;
        if let Some(bad) = clusters.iter().flatten().find(|&&i| i >= cloud.len()) {
            return Err(SegmentationError::Capability(format!(
                "cluster index {} outside a cloud of {} cells",
                bad,
                cloud.len()
            )));
        }
        let found = clusters.len();
        let accepted = filter_plausible(cloud, clusters, &config.plausibility);
        tracing::debug!("{} surface clusters, {} within reach", found, accepted.len());

        let residual_mask = unassigned_mask(cloud.width, cloud.height, &accepted);
        let residual = analyze_residual(&residual_mask, caps.labeler.as_ref(), &config.residual, scale)?;
        tracing::debug!(
            "{} residual regions, {} interior objects, outmost region: {}",
            residual.regions,
            residual.interior.len(),
            residual.outmost.is_some()
        );

        let split = residual
            .outmost
            .as_ref()
            .map(|outmost| split_outmost(outmost, caps, &config.edge_split, scale))
            .transpose()?;
        if let Some(split) = &split {
            tracing::debug!(
                "outmost region split into {} components, {} objects",
                split.components,
                split.objects.len()
            );
        }

        let mut environment_palettes = Vec::new();
        let mut surface_objects = Vec::with_capacity(accepted.len());
        for cluster in accepted {
            let colors = gather_colors(cloud, &cluster.indices);
            match classify_colors(&colors, environment, &config.environment) {
                ColorVerdict::Environment { palette } => {
                    environment_palettes.push(palette);
                }
                ColorVerdict::Object { colors } => {
                    if let Some(object) = self.surface_object(frame, cluster, colors, scale)? {
                        surface_objects.push(object);
                    }
                }
            }
        }
        tracing::debug!(
            "{} surface objects, {} environment clusters dropped",
            surface_objects.len(),
            environment_palettes.len()
        );

        let (split_objects, suppressed_outmost) = match split {
            Some(split) => (split.objects, Some(split.suppressed)),
            None => (Vec::new(), None),
        };
        let mut objects = surface_objects;
        objects.extend(split_objects);
        objects.extend(residual.interior);

        let debug = debug.then(|| DebugViews {
            annotated: annotate(&frame.image, &objects),
            residual_mask,
            suppressed_outmost,
            environment_palettes,
        });

        tracing::debug!(
            "detection time: {:.2} ms, {} objects",
            start.elapsed().as_secs_f64() * 1000.0,
            objects.len()
        );
        Ok(Detection { objects, debug })
    }

    /// The output record of a surface cluster. Built straight from the
    /// cluster, so indices and centroid always belong to the same surface.
    fn surface_object(
        &self,
        frame: &SensorFrame,
        cluster: SurfaceCluster,
        colors: BTreeMap<String, f32>,
        scale: (u32, u32),
    ) -> Result<Option<ObjectArea>> {
        let shape = describe_shape(
            &frame.cloud,
            &cluster.indices,
            self.capabilities.corner_finder.as_ref(),
            scale,
        )?;
        let Some(shape) = shape else {
            return Ok(None);
        };
        Ok(Some(ObjectArea {
            indices: cluster.indices,
            visible3d: true,
            bounds2d: shape.bounds2d,
            corners2d: Some(shape.corners2d),
            center3d: Some(cluster.centroid),
            width3d: Some(shape.width3d),
            height3d: Some(shape.height3d),
            colors,
        }))
    }
}
