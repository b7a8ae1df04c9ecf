//! Benchmarks for the segmentation pipeline and its heavier primitives.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{GrayImage, Luma, Rgb, RgbImage};
use nalgebra::Point3;
use objectness::imgproc::{draw_polyline, find_contours, label_components, Connectivity};
use objectness::point_cloud::{segment_smooth_surfaces, NormalConfig, RegionGrowingConfig};
use objectness::prelude::*;
use std::time::Duration;

/// Table at 1 m with a grid of boxes in front of it, 1 cm cells scaled
/// to the requested resolution.
fn tabletop(width: u32, height: u32) -> SensorFrame {
    let pitch = 0.8 / width as f32;
    let cell = width / 8;
    let cloud = OrganizedCloud::from_fn(width, height, |x, y| {
        let (u, v) = (
            (x as f32 - width as f32 / 2.0) * pitch,
            (y as f32 - height as f32 / 2.0) * pitch,
        );
        let on_box = (x / cell) % 2 == 1 && (y / cell) % 2 == 1;
        if on_box {
            (Point3::new(u, v, 0.8), Rgb([200, 40, 40]))
        } else {
            (Point3::new(u, v, 1.0), Rgb([128, 128, 128]))
        }
    });
    SensorFrame::new(cloud, RgbImage::new(width * 2, height * 2))
}

fn blobs(width: u32, height: u32) -> GrayImage {
    let mut mask = GrayImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            if (x / 16 + y / 16) % 2 == 0 || y % 16 == 8 {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
    }
    mask
}

fn benchmark_detect(c: &mut Criterion) {
    let mut group = c.benchmark_group("detect");
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(10);

    let detector = ObjectnessDetector::new(SegmentationConfig::default()).unwrap();
    for (w, h) in [(80u32, 60u32), (160, 120)] {
        let frame = tabletop(w, h);
        group.bench_with_input(BenchmarkId::new("native", format!("{}x{}", w, h)), &frame, |b, f| {
            b.iter(|| detector.detect(black_box(f), Rgb([128, 128, 128]), false))
        });
    }
    group.finish();
}

fn benchmark_clustering(c: &mut Criterion) {
    let frame = tabletop(160, 120);
    let normals = NormalConfig {
        search_radius: 0.03,
    };
    let growing = RegionGrowingConfig::default();
    c.bench_function("region_growing_160x120", |b| {
        b.iter(|| segment_smooth_surfaces(black_box(&frame.cloud), &normals, &growing))
    });
}

fn benchmark_masks(c: &mut Criterion) {
    let mut group = c.benchmark_group("masks");
    for size in [128u32, 256, 512] {
        let mask = blobs(size, size);
        group.bench_with_input(BenchmarkId::new("label_8", size), &mask, |b, m| {
            b.iter(|| label_components(black_box(m), Connectivity::Eight))
        });
        group.bench_with_input(BenchmarkId::new("suppress_contours", size), &mask, |b, m| {
            b.iter(|| {
                let mut suppressed = m.clone();
                for contour in find_contours(black_box(m)) {
                    draw_polyline(&mut suppressed, &contour, 0, 6);
                }
                suppressed
            })
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_detect, benchmark_clustering, benchmark_masks);
criterion_main!(benches);
