use crate::{validate_image_size, ImgprocError, Result};
use image::{GrayImage, Luma};
use objectness_core::Rect;
use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contour {
    pub points: Vec<(i32, i32)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectedComponentStats {
    pub label: u32,
    pub area: u32,
    pub bbox: (u32, u32, u32, u32), // x, y, width, height
    pub centroid: (f64, f64),
}

impl ConnectedComponentStats {
    pub fn rect(&self) -> Rect {
        Rect::from_bbox(self.bbox)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    Four,
    Eight,
}

/// Label image plus per-component statistics.
///
/// Label 0 is background; `stats[i]` describes label `i + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct Labeling {
    pub width: u32,
    pub height: u32,
    pub labels: Vec<u32>,
    pub stats: Vec<ConnectedComponentStats>,
}

impl Labeling {
    /// Builds a labeling from a raw label map whose foreground labels are
    /// `1..=num_components`, computing per-label statistics.
    pub fn from_labels(width: u32, height: u32, labels: Vec<u32>, num_components: u32) -> Result<Self> {
        if labels.len() != width as usize * height as usize {
            return Err(ImgprocError::DimensionMismatch(format!(
                "{} labels for a {}x{} image",
                labels.len(),
                width,
                height
            )));
        }

        let n = num_components as usize;
        let mut area = vec![0u32; n];
        let mut min = vec![(u32::MAX, u32::MAX); n];
        let mut max = vec![(0u32, 0u32); n];
        let mut sum = vec![(0f64, 0f64); n];
        for (i, &l) in labels.iter().enumerate() {
            if l == 0 {
                continue;
            }
            if l > num_components {
                return Err(ImgprocError::AlgorithmError(format!(
                    "label {} exceeds component count {}",
                    l, num_components
                )));
            }
            let k = l as usize - 1;
            let x = (i % width as usize) as u32;
            let y = (i / width as usize) as u32;
            area[k] += 1;
            min[k] = (min[k].0.min(x), min[k].1.min(y));
            max[k] = (max[k].0.max(x), max[k].1.max(y));
            sum[k] = (sum[k].0 + x as f64, sum[k].1 + y as f64);
        }

        let mut stats = Vec::with_capacity(n);
        for k in 0..n {
            if area[k] == 0 {
                return Err(ImgprocError::AlgorithmError(format!("label {} is empty", k + 1)));
            }
            stats.push(ConnectedComponentStats {
                label: k as u32 + 1,
                area: area[k],
                bbox: (
                    min[k].0,
                    min[k].1,
                    max[k].0 - min[k].0 + 1,
                    max[k].1 - min[k].1 + 1,
                ),
                centroid: (sum[k].0 / area[k] as f64, sum[k].1 / area[k] as f64),
            });
        }

        Ok(Self {
            width,
            height,
            labels,
            stats,
        })
    }

    /// Check that this labeling describes a `width` x `height` grid: matching
    /// dimensions and label buffer, and every component box non-empty and
    /// inside the grid.
    pub fn validate(&self, width: u32, height: u32) -> Result<()> {
        if self.width != width || self.height != height {
            return Err(ImgprocError::DimensionMismatch(format!(
                "labeling is {}x{}, expected {}x{}",
                self.width, self.height, width, height
            )));
        }
        if self.labels.len() != width as usize * height as usize {
            return Err(ImgprocError::DimensionMismatch(format!(
                "{} labels for a {}x{} grid",
                self.labels.len(),
                width,
                height
            )));
        }
        for stats in &self.stats {
            let (x, y, w, h) = stats.bbox;
            let inside = w > 0
                && h > 0
                && x.checked_add(w).is_some_and(|r| r <= width)
                && y.checked_add(h).is_some_and(|b| b <= height);
            if stats.label == 0 || !inside {
                return Err(ImgprocError::AlgorithmError(format!(
                    "component {} has box {:?} outside a {}x{} grid",
                    stats.label, stats.bbox, width, height
                )));
            }
        }
        Ok(())
    }

    pub fn component_count(&self) -> usize {
        self.stats.len()
    }

    pub fn label_at(&self, x: u32, y: u32) -> u32 {
        self.labels[y as usize * self.width as usize + x as usize]
    }

    /// Row-major indices of all cells carrying `label` inside `bounds`.
    pub fn indices_of(&self, label: u32, bounds: Rect) -> Vec<usize> {
        let w = self.width as usize;
        let mut out = Vec::new();
        for y in bounds.y..bounds.bottom().min(self.height) {
            for x in bounds.x..bounds.right().min(self.width) {
                let idx = y as usize * w + x as usize;
                if self.labels[idx] == label {
                    out.push(idx);
                }
            }
        }
        out
    }

    /// Full-size binary mask (255 foreground) of one label.
    pub fn mask_of(&self, label: u32) -> GrayImage {
        let data = self
            .labels
            .iter()
            .map(|&l| if l == label && label != 0 { 255u8 } else { 0u8 })
            .collect();
        // Dimensions come from the labeling itself, the buffer length always matches.
        GrayImage::from_raw(self.width, self.height, data)
            .unwrap_or_else(|| GrayImage::new(self.width, self.height))
    }

    /// Binary mask of one label cropped to `bounds`.
    pub fn crop_mask(&self, label: u32, bounds: Rect) -> GrayImage {
        let mut blob = GrayImage::new(bounds.width, bounds.height);
        for y in 0..bounds.height {
            for x in 0..bounds.width {
                let (gx, gy) = (bounds.x + x, bounds.y + y);
                if gx < self.width && gy < self.height && self.label_at(gx, gy) == label {
                    blob.put_pixel(x, y, Luma([255]));
                }
            }
        }
        blob
    }
}

const DIRS_8: [(i32, i32); 8] = [
    (1, 0),   // E
    (1, 1),   // SE
    (0, 1),   // S
    (-1, 1),  // SW
    (-1, 0),  // W
    (-1, -1), // NW
    (0, -1),  // N
    (1, -1),  // NE
];

fn in_bounds(x: i32, y: i32, w: i32, h: i32) -> bool {
    x >= 0 && y >= 0 && x < w && y < h
}

fn is_foreground(data: &[u8], w: i32, h: i32, x: i32, y: i32) -> bool {
    in_bounds(x, y, w, h) && data[(y * w + x) as usize] > 0
}

/// First 4-neighbour direction (index into `DIRS_8`) that is background,
/// `None` for pixels that are not on a boundary.
fn background_direction(data: &[u8], w: i32, h: i32, x: i32, y: i32) -> Option<usize> {
    if !is_foreground(data, w, h, x, y) {
        return None;
    }
    [0usize, 2, 4, 6].into_iter().find(|&k| {
        let (dx, dy) = DIRS_8[k];
        !is_foreground(data, w, h, x + dx, y + dy)
    })
}

fn direction_to(from: (i32, i32), to: (i32, i32)) -> Option<usize> {
    DIRS_8
        .iter()
        .position(|&(dx, dy)| from.0 + dx == to.0 && from.1 + dy == to.1)
}

/// Moore-neighbour tracing. The search around each pixel runs clockwise
/// starting after the background pixel we backtracked from; tracing stops
/// when the first move (pixel and backtrack) repeats.
fn trace_boundary(data: &[u8], w: i32, h: i32, start: (i32, i32), start_dir: usize) -> Vec<(i32, i32)> {
    let mut contour = vec![start];
    let mut current = start;
    let mut backtrack = (start.0 + DIRS_8[start_dir].0, start.1 + DIRS_8[start_dir].1);
    let mut first_move: Option<((i32, i32), (i32, i32))> = None;
    let max_steps = (w as usize * h as usize).saturating_mul(8).max(32);

    for _ in 0..max_steps {
        let Some(back_dir) = direction_to(current, backtrack) else { break };

        let mut found = None;
        for step in 1..8 {
            let k = (back_dir + step) % 8;
            let nx = current.0 + DIRS_8[k].0;
            let ny = current.1 + DIRS_8[k].1;
            if is_foreground(data, w, h, nx, ny) {
                // The neighbour checked just before k is background.
                let prev = (k + 7) % 8;
                found = Some(((nx, ny), (current.0 + DIRS_8[prev].0, current.1 + DIRS_8[prev].1)));
                break;
            }
        }

        // Isolated pixel.
        let Some((next, next_backtrack)) = found else { break };

        match first_move {
            Some(m) if m == (next, next_backtrack) => break,
            Some(_) => {}
            None => first_move = Some((next, next_backtrack)),
        }
        current = next;
        backtrack = next_backtrack;
        contour.push(current);
    }

    if contour.len() > 1 && contour.last() == Some(&start) {
        contour.pop();
    }
    contour
}

/// Find every contour of a binary image (non-zero pixels are foreground):
/// outer boundaries and hole boundaries alike, each as the full pixel chain.
pub fn find_contours(binary: &GrayImage) -> Vec<Contour> {
    let w = binary.width() as i32;
    let h = binary.height() as i32;
    let data = binary.as_raw();
    let mut visited_boundary = vec![false; (w * h) as usize];
    let mut contours = Vec::new();

    for y in 0..h {
        for x in 0..w {
            let idx = (y * w + x) as usize;
            if visited_boundary[idx] {
                continue;
            }
            let Some(dir) = background_direction(data, w, h, x, y) else {
                continue;
            };
            let points = trace_boundary(data, w, h, (x, y), dir);
            for &(px, py) in &points {
                visited_boundary[(py * w + px) as usize] = true;
            }
            visited_boundary[idx] = true;
            contours.push(Contour { points });
        }
    }

    contours
}

fn brush(thickness: u32) -> Vec<(i32, i32)> {
    let r = (thickness.max(1) as f32) / 2.0;
    let ri = r.floor() as i32;
    let mut offsets = Vec::new();
    for dy in -ri..=ri {
        for dx in -ri..=ri {
            if (dx * dx + dy * dy) as f32 <= r * r {
                offsets.push((dx, dy));
            }
        }
    }
    offsets
}

fn stamp(img: &mut GrayImage, x: i32, y: i32, brush: &[(i32, i32)], value: u8) {
    let (w, h) = (img.width() as i32, img.height() as i32);
    for &(dx, dy) in brush {
        let (px, py) = (x + dx, y + dy);
        if in_bounds(px, py, w, h) {
            img.put_pixel(px as u32, py as u32, Luma([value]));
        }
    }
}

fn draw_segment(img: &mut GrayImage, a: (i32, i32), b: (i32, i32), brush: &[(i32, i32)], value: u8) {
    let (mut x0, mut y0) = a;
    let (x1, y1) = b;
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        stamp(img, x0, y0, brush, value);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Rasterize `contour` as a closed polyline with a round brush of
/// `thickness` pixels.
pub fn draw_polyline(img: &mut GrayImage, contour: &Contour, value: u8, thickness: u32) {
    let pts = &contour.points;
    let brush = brush(thickness);
    match pts.len() {
        0 => {}
        1 => stamp(img, pts[0].0, pts[0].1, &brush, value),
        n => {
            for i in 0..n {
                draw_segment(img, pts[i], pts[(i + 1) % n], &brush, value);
            }
        }
    }
}

/// Connected components labeling with component statistics.
///
/// Returns `(labels, num_labels, stats)` where:
/// - `labels` is row-major label map (0 is background)
/// - `num_labels` includes background label 0
/// - `stats` only contains foreground components (labels 1..)
pub fn connected_components_with_stats(
    binary: &GrayImage,
    connectivity: Connectivity,
) -> (Vec<u32>, u32, Vec<ConnectedComponentStats>) {
    let w = binary.width() as i32;
    let h = binary.height() as i32;
    let data = binary.as_raw();
    let mut labels = vec![0u32; (w * h) as usize];
    let mut stats = Vec::new();
    let mut next_label = 1u32;

    let neigh_4: &[(i32, i32)] = &[(1, 0), (-1, 0), (0, 1), (0, -1)];
    let neigh_8: &[(i32, i32)] = &[
        (1, 0),
        (-1, 0),
        (0, 1),
        (0, -1),
        (1, 1),
        (1, -1),
        (-1, 1),
        (-1, -1),
    ];
    let neigh = match connectivity {
        Connectivity::Four => neigh_4,
        Connectivity::Eight => neigh_8,
    };

    for y in 0..h {
        for x in 0..w {
            let idx = (y * w + x) as usize;
            if data[idx] == 0 || labels[idx] != 0 {
                continue;
            }

            let label = next_label;
            next_label += 1;

            let mut q = VecDeque::new();
            q.push_back((x, y));
            labels[idx] = label;

            let mut area = 0u32;
            let mut min_x = x;
            let mut min_y = y;
            let mut max_x = x;
            let mut max_y = y;
            let mut sum_x = 0f64;
            let mut sum_y = 0f64;

            while let Some((cx, cy)) = q.pop_front() {
                area += 1;
                min_x = min_x.min(cx);
                min_y = min_y.min(cy);
                max_x = max_x.max(cx);
                max_y = max_y.max(cy);
                sum_x += cx as f64;
                sum_y += cy as f64;

                for &(dx, dy) in neigh {
                    let nx = cx + dx;
                    let ny = cy + dy;
                    if !in_bounds(nx, ny, w, h) {
                        continue;
                    }
                    let nidx = (ny * w + nx) as usize;
                    if data[nidx] == 0 || labels[nidx] != 0 {
                        continue;
                    }
                    labels[nidx] = label;
                    q.push_back((nx, ny));
                }
            }

            let centroid = (sum_x / area as f64, sum_y / area as f64);
            let bbox = (
                min_x as u32,
                min_y as u32,
                (max_x - min_x + 1) as u32,
                (max_y - min_y + 1) as u32,
            );
            stats.push(ConnectedComponentStats {
                label,
                area,
                bbox,
                centroid,
            });
        }
    }

    (labels, next_label, stats)
}

/// Label a binary mask and wrap the result in a [`Labeling`].
pub fn label_components(binary: &GrayImage, connectivity: Connectivity) -> Result<Labeling> {
    validate_image_size(binary.width(), binary.height())?;
    let (labels, num_labels, stats) = connected_components_with_stats(binary, connectivity);
    if num_labels as usize != stats.len() + 1 {
        return Err(ImgprocError::AlgorithmError(format!(
            "label count {} disagrees with {} component stats",
            num_labels,
            stats.len()
        )));
    }
    Ok(Labeling {
        width: binary.width(),
        height: binary.height(),
        labels,
        stats,
    })
}
