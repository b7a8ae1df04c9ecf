use ab_glyph::{FontRef, PxScale};
use image::{GrayImage, Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use objectness_core::{ObjectArea, Rect};
use objectness_imgproc::PaletteEntry;
use std::collections::BTreeMap;

const SURFACE_OUTLINE: Rgb<u8> = Rgb([0, 255, 0]);
const RESIDUAL_OUTLINE: Rgb<u8> = Rgb([0, 0, 255]);
const CAPTION_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const OUTLINE_THICKNESS: u32 = 2;
const CAPTION_SCALE: f32 = 13.0;
const FONT_BYTES: &[u8] = include_bytes!("../assets/DejaVuSansMono.ttf");

/// Intermediate images produced when a detection runs in debug mode.
#[derive(Debug, Clone)]
pub struct DebugViews {
    /// Cloud-grid mask of the cells no accepted surface claimed.
    pub residual_mask: GrayImage,
    /// The outmost region after contour suppression.
    pub suppressed_outmost: Option<GrayImage>,
    /// The input image with surface objects outlined in green and
    /// residual objects in blue. Surface objects carry their colour
    /// names and shares as a caption under the box.
    pub annotated: RgbImage,
    /// Palettes of the clusters dropped as environment.
    pub environment_palettes: Vec<Vec<PaletteEntry>>,
}

/// Caption text for a colour histogram, e.g. `"blue(0.35) red(0.65)"`.
pub fn color_caption(colors: &BTreeMap<String, f32>) -> String {
    colors
        .iter()
        .map(|(name, share)| format!("{}({:.2})", name, share))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn annotate(image: &RgbImage, objects: &[ObjectArea]) -> RgbImage {
    let mut canvas = image.clone();
    let font = FontRef::try_from_slice(FONT_BYTES)
        .map_err(|e| tracing::warn!("caption font unavailable: {}", e))
        .ok();

    for object in objects {
        let color = if object.visible3d {
            SURFACE_OUTLINE
        } else {
            RESIDUAL_OUTLINE
        };
        draw_rect_outline(&mut canvas, object.bounds2d, color, OUTLINE_THICKNESS);

        if let (Some(font), false) = (&font, object.colors.is_empty()) {
            let bounds = object.bounds2d;
            draw_text_mut(
                &mut canvas,
                CAPTION_COLOR,
                bounds.x as i32,
                bounds.bottom() as i32,
                PxScale::from(CAPTION_SCALE),
                font,
                &color_caption(&object.colors),
            );
        }
    }
    canvas
}

/// Nested one pixel outlines, clipped to the canvas.
fn draw_rect_outline(canvas: &mut RgbImage, rect: Rect, color: Rgb<u8>, thickness: u32) {
    for t in 0..thickness {
        let (w, h) = (rect.width.saturating_sub(2 * t), rect.height.saturating_sub(2 * t));
        if w == 0 || h == 0 {
            break;
        }
        let ring = imageproc::rect::Rect::at((rect.x + t) as i32, (rect.y + t) as i32).of_size(w, h);
        draw_hollow_rect_mut(canvas, ring, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outlines_by_origin() {
        let image = RgbImage::new(30, 30);
        let mut surface = ObjectArea::residual(vec![0], Rect::new(2, 2, 10, 10));
        surface.visible3d = true;
        let residual = ObjectArea::residual(vec![1], Rect::new(15, 15, 10, 10));

        let annotated = annotate(&image, &[surface, residual]);
        assert_eq!(*annotated.get_pixel(2, 2), SURFACE_OUTLINE);
        assert_eq!(*annotated.get_pixel(3, 6), SURFACE_OUTLINE);
        assert_eq!(*annotated.get_pixel(6, 6), Rgb([0, 0, 0]));
        assert_eq!(*annotated.get_pixel(24, 20), RESIDUAL_OUTLINE);
        assert_eq!(*annotated.get_pixel(20, 20), Rgb([0, 0, 0]));
    }

    #[test]
    fn clips_to_the_canvas() {
        let image = RgbImage::new(10, 10);
        let object = ObjectArea::residual(vec![0], Rect::new(6, 6, 10, 10));
        let annotated = annotate(&image, &[object]);
        assert_eq!(*annotated.get_pixel(9, 9), Rgb([0, 0, 0]));
        assert_eq!(*annotated.get_pixel(6, 9), RESIDUAL_OUTLINE);
    }

    #[test]
    fn caption_lists_colors_in_name_order() {
        let colors = BTreeMap::from([("red".to_string(), 0.65f32), ("blue".to_string(), 0.35)]);
        assert_eq!(color_caption(&colors), "blue(0.35) red(0.65)");
        assert_eq!(color_caption(&BTreeMap::new()), "");
    }

    #[test]
    fn surface_colors_are_written_under_the_box() {
        let image = RgbImage::new(120, 60);
        let mut surface = ObjectArea::residual(vec![0], Rect::new(4, 4, 30, 20));
        surface.visible3d = true;
        surface.colors.insert("red".to_string(), 1.0);

        let annotated = annotate(&image, &[surface]);
        let lit = (24..44)
            .flat_map(|y| (4..120).map(move |x| (x, y)))
            .filter(|&(x, y)| {
                let p = annotated.get_pixel(x, y);
                p[0] > 0 && p[0] == p[1] && p[1] == p[2]
            })
            .count();
        assert!(lit > 0);
        // Nothing above the caption row besides the outline.
        assert_eq!(*annotated.get_pixel(50, 10), Rgb([0, 0, 0]));
    }
}
