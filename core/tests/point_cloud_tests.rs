use image::Rgb;
use nalgebra::Point3;
use objectness_core::{OrganizedCloud, Rect};

#[test]
fn test_organized_cloud_result_handling() {
    let points = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0)];

    // 1. Valid grid
    let colors = vec![Rgb([255, 0, 0]), Rgb([0, 255, 0])];
    let cloud = OrganizedCloud::new(2, 1, points.clone(), colors.clone());
    assert!(cloud.is_ok());

    // 2. Invalid colors (count mismatch)
    let bad_colors = vec![Rgb([255, 0, 0])];
    let cloud_bad_colors = OrganizedCloud::new(2, 1, points.clone(), bad_colors);
    assert!(cloud_bad_colors.is_err());
    assert!(cloud_bad_colors.unwrap_err().to_string().contains("Color count"));

    // 3. Invalid grid (point count mismatch)
    let cloud_bad_grid = OrganizedCloud::new(3, 1, points, colors);
    assert!(cloud_bad_grid.is_err());
    assert!(cloud_bad_grid.unwrap_err().to_string().contains("Point count"));
}

#[test]
fn test_missing_cells_are_not_valid() {
    let cloud = OrganizedCloud::from_fn(4, 4, |x, y| {
        let p = if (x + y) % 2 == 0 {
            Point3::new(x as f32, y as f32, 1.0)
        } else {
            Point3::new(f32::NAN, f32::NAN, f32::NAN)
        };
        (p, Rgb([10, 20, 30]))
    });
    assert_eq!(cloud.valid_count(), 8);
    assert!(cloud.point(0, 0).is_some());
    assert!(cloud.point(1, 0).is_none());
    assert!(cloud.point(9, 9).is_none());
}

#[test]
fn test_rect_json_round_trip() {
    let r = Rect::new(4, 8, 15, 16);
    let json = serde_json::to_string(&r).unwrap();
    let back: Rect = serde_json::from_str(&json).unwrap();
    assert_eq!(r, back);
}
