use image::Rgb;
use nalgebra::Point3;

/// A point cloud laid out on a `width` x `height` grid aligned with a
/// camera image. Cells are stored row-major; a cell whose position has a
/// non-finite coordinate is treated as missing.
#[derive(Debug, Clone, Default)]
pub struct OrganizedCloud {
    pub width: u32,
    pub height: u32,
    pub points: Vec<Point3<f32>>,
    pub colors: Vec<Rgb<u8>>,
}

impl OrganizedCloud {
    pub fn new(
        width: u32,
        height: u32,
        points: Vec<Point3<f32>>,
        colors: Vec<Rgb<u8>>,
    ) -> crate::Result<Self> {
        let expected = width as usize * height as usize;
        if points.len() != expected {
            return Err(crate::Error::InvalidInput(format!(
                "Point count {} does not match grid {}x{}",
                points.len(),
                width,
                height
            )));
        }
        if colors.len() != expected {
            return Err(crate::Error::InvalidInput(format!(
                "Color count {} does not match point count {}",
                colors.len(),
                expected
            )));
        }
        Ok(Self {
            width,
            height,
            points,
            colors,
        })
    }

    /// Builds a cloud by evaluating `f(x, y)` for every grid cell.
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Self
    where
        F: FnMut(u32, u32) -> (Point3<f32>, Rgb<u8>),
    {
        let n = width as usize * height as usize;
        let mut points = Vec::with_capacity(n);
        let mut colors = Vec::with_capacity(n);
        for y in 0..height {
            for x in 0..width {
                let (p, c) = f(x, y);
                points.push(p);
                colors.push(c);
            }
        }
        Self {
            width,
            height,
            points,
            colors,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    #[inline]
    pub fn coords(&self, index: usize) -> (u32, u32) {
        let w = self.width as usize;
        ((index % w) as u32, (index / w) as u32)
    }

    pub fn point(&self, x: u32, y: u32) -> Option<Point3<f32>> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = self.index(x, y);
        if self.is_valid(idx) {
            Some(self.points[idx])
        } else {
            None
        }
    }

    #[inline]
    pub fn is_valid(&self, index: usize) -> bool {
        self.points
            .get(index)
            .map(|p| p.x.is_finite() && p.y.is_finite() && p.z.is_finite())
            .unwrap_or(false)
    }

    pub fn valid_count(&self) -> usize {
        (0..self.len()).filter(|&i| self.is_valid(i)).count()
    }

    /// Mean position of the valid cells among `indices`, or `None` when
    /// none of them carries a finite position.
    pub fn centroid(&self, indices: &[usize]) -> Option<Point3<f32>> {
        let mut sum = nalgebra::Vector3::zeros();
        let mut count = 0usize;
        for &i in indices {
            if self.is_valid(i) {
                sum += self.points[i].coords;
                count += 1;
            }
        }
        if count == 0 {
            None
        } else {
            Some(Point3::from(sum / count as f32))
        }
    }
}
