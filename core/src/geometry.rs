use serde::{Deserialize, Serialize};

/// Axis-aligned integer rectangle, `(x, y)` is the top-left cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds a rectangle from an `(x, y, width, height)` tuple as produced
    /// by connected component statistics.
    pub fn from_bbox(bbox: (u32, u32, u32, u32)) -> Self {
        Self::new(bbox.0, bbox.1, bbox.2, bbox.3)
    }

    /// Smallest rectangle enclosing all `(x, y)` cells, `None` if empty.
    pub fn enclosing<I>(cells: I) -> Option<Self>
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        let mut iter = cells.into_iter();
        let (fx, fy) = iter.next()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (fx, fy, fx, fy);
        for (x, y) in iter {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        Some(Self::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Vertical center in grid units.
    pub fn center_y(&self) -> f64 {
        self.y as f64 + 0.5 * self.height as f64
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// True if the rectangle reaches the first or last row/column of a
    /// `grid_width` x `grid_height` grid.
    pub fn touches_border(&self, grid_width: u32, grid_height: u32) -> bool {
        self.x == 0 || self.y == 0 || self.right() == grid_width || self.bottom() == grid_height
    }

    /// Maps a cloud-grid rectangle to image resolution.
    pub fn scale(&self, sx: u32, sy: u32) -> Self {
        Self::new(self.x * sx, self.y * sy, self.width * sx, self.height * sy)
    }

    pub fn translate(&self, dx: u32, dy: u32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaling_by_two_doubles_every_field() {
        let r = Rect::new(10, 10, 20, 20).scale(2, 2);
        assert_eq!(r, Rect::new(20, 20, 40, 40));
    }

    #[test]
    fn border_detection() {
        assert!(Rect::new(0, 5, 3, 3).touches_border(10, 10));
        assert!(Rect::new(5, 5, 5, 2).touches_border(10, 10));
        assert!(Rect::new(2, 7, 2, 3).touches_border(10, 10));
        assert!(!Rect::new(1, 1, 8, 8).touches_border(10, 10));
    }

    #[test]
    fn enclosing_rect() {
        let r = Rect::enclosing([(3, 4), (7, 2), (5, 9)]).unwrap();
        assert_eq!(r, Rect::new(3, 2, 5, 8));
        assert!(Rect::enclosing(std::iter::empty()).is_none());
    }
}
