//! Sensor frame: an organized cloud paired with the colour image it was
//! registered against. The image resolution is an integer multiple of
//! the cloud grid in each axis.

use crate::point_cloud::OrganizedCloud;
use image::RgbImage;

#[derive(Debug, Clone)]
pub struct SensorFrame {
    pub cloud: OrganizedCloud,
    pub image: RgbImage,
}

impl SensorFrame {
    pub fn new(cloud: OrganizedCloud, image: RgbImage) -> Self {
        Self { cloud, image }
    }

    /// Integer factors `(sx, sy)` mapping cloud-grid coordinates to image
    /// coordinates.
    pub fn scale_factors(&self) -> crate::Result<(u32, u32)> {
        if self.cloud.is_empty() || self.cloud.width == 0 || self.cloud.height == 0 {
            return Err(crate::Error::EmptyCloud);
        }
        if self.cloud.len() != self.cloud.width as usize * self.cloud.height as usize {
            return Err(crate::Error::InvalidInput(format!(
                "Point count {} does not match grid {}x{}",
                self.cloud.len(),
                self.cloud.width,
                self.cloud.height
            )));
        }
        if self.cloud.colors.len() != self.cloud.len() {
            return Err(crate::Error::InvalidInput(format!(
                "Color count {} does not match point count {}",
                self.cloud.colors.len(),
                self.cloud.len()
            )));
        }

        let (iw, ih) = self.image.dimensions();
        let (cw, ch) = (self.cloud.width, self.cloud.height);
        if iw < cw || ih < ch || iw % cw != 0 || ih % ch != 0 {
            return Err(crate::Error::ScaleMismatch(format!(
                "image {}x{} is not an integer multiple of cloud {}x{}",
                iw, ih, cw, ch
            )));
        }
        Ok((iw / cw, ih / ch))
    }
}
